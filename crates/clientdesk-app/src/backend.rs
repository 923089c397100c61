// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{debug, warn};

use crate::{AuditEntry, Client, ClientId, EditTicket, FieldPatch, NewClient, SaveRequest};

/// Query parameters as produced by [`crate::build_query_params`].
pub type QueryParams = Vec<(&'static str, String)>;

/// Remote persistence for client records.
pub trait Backend: Send + Sync {
    fn list_clients(&self, params: &[(&'static str, String)]) -> Result<Vec<Client>>;
    fn client_audit(&self, id: &ClientId) -> Result<Vec<AuditEntry>>;
    fn update_client(&self, id: &ClientId, patch: &FieldPatch) -> Result<Client>;
    fn create_client(&self, input: &NewClient) -> Result<Client>;
    fn delete_client(&self, id: &ClientId) -> Result<()>;
}

/// Work the console hands to the runtime. Each variant carries whatever the
/// console needs to recognise its completion later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListClients { token: u64, params: QueryParams },
    LoadAudit { token: u64, id: ClientId },
    SaveField(SaveRequest),
    CreateClient { token: u64, input: NewClient },
    DeleteClient { id: ClientId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Clients {
        token: u64,
        result: Result<Vec<Client>, String>,
    },
    Audit {
        token: u64,
        id: ClientId,
        result: Result<Vec<AuditEntry>, String>,
    },
    Saved {
        ticket: EditTicket,
        id: ClientId,
        result: Result<Client, String>,
    },
    Created {
        token: u64,
        result: Result<Client, String>,
    },
    Deleted {
        id: ClientId,
        result: Result<(), String>,
    },
}

impl Request {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ListClients { .. } => "list clients",
            Self::LoadAudit { .. } => "load audit",
            Self::SaveField(_) => "save field",
            Self::CreateClient { .. } => "create client",
            Self::DeleteClient { .. } => "delete client",
        }
    }

    /// Runs the request to completion on the calling thread.
    pub fn execute(self, backend: &dyn Backend) -> Response {
        debug!(request = self.label(), "backend request");
        let response = match self {
            Self::ListClients { token, params } => Response::Clients {
                token,
                result: flatten(backend.list_clients(&params)),
            },
            Self::LoadAudit { token, id } => {
                let result = flatten(backend.client_audit(&id));
                Response::Audit { token, id, result }
            }
            Self::SaveField(request) => Response::Saved {
                ticket: request.ticket,
                result: flatten(backend.update_client(&request.id, &request.patch)),
                id: request.id,
            },
            Self::CreateClient { token, input } => Response::Created {
                token,
                result: flatten(backend.create_client(&input)),
            },
            Self::DeleteClient { id } => {
                let result = flatten(backend.delete_client(&id));
                Response::Deleted { id, result }
            }
        };
        if let Some(error) = response.error() {
            warn!(error, "backend request failed");
        }
        response
    }
}

impl Request {
    /// The completion for a request that never reached the backend, carrying
    /// the same correlation data a real completion would.
    pub fn failed(self, error: &anyhow::Error) -> Response {
        let message = format!("{error:#}");
        match self {
            Self::ListClients { token, .. } => Response::Clients {
                token,
                result: Err(message),
            },
            Self::LoadAudit { token, id } => Response::Audit {
                token,
                id,
                result: Err(message),
            },
            Self::SaveField(request) => Response::Saved {
                ticket: request.ticket,
                id: request.id,
                result: Err(message),
            },
            Self::CreateClient { token, .. } => Response::Created {
                token,
                result: Err(message),
            },
            Self::DeleteClient { id } => Response::Deleted {
                id,
                result: Err(message),
            },
        }
    }
}

impl Response {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Clients { result, .. } => result.as_ref().err(),
            Self::Audit { result, .. } => result.as_ref().err(),
            Self::Saved { result, .. } => result.as_ref().err(),
            Self::Created { result, .. } => result.as_ref().err(),
            Self::Deleted { result, .. } => result.as_ref().err(),
        }
        .map(String::as_str)
    }
}

fn flatten<T>(result: Result<T>) -> Result<T, String> {
    result.map_err(|error| format!("{error:#}"))
}

#[cfg(test)]
mod tests {
    use super::{Backend, Request, Response};
    use crate::{AuditEntry, Client, ClientId, FieldPatch, NewClient};
    use anyhow::{Context, Result, anyhow};

    struct Offline;

    impl Backend for Offline {
        fn list_clients(&self, _params: &[(&'static str, String)]) -> Result<Vec<Client>> {
            Err(anyhow!("connection refused")).context("cannot reach http://127.0.0.1:1")
        }

        fn client_audit(&self, _id: &ClientId) -> Result<Vec<AuditEntry>> {
            Ok(Vec::new())
        }

        fn update_client(&self, id: &ClientId, _patch: &FieldPatch) -> Result<Client> {
            Ok(Client::blank(id.clone(), "Echo"))
        }

        fn create_client(&self, _input: &NewClient) -> Result<Client> {
            Err(anyhow!("server error (422): bad input"))
        }

        fn delete_client(&self, _id: &ClientId) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn errors_flatten_with_their_context_chain() {
        let response = Request::ListClients {
            token: 3,
            params: Vec::new(),
        }
        .execute(&Offline);

        assert_eq!(
            response,
            Response::Clients {
                token: 3,
                result: Err("cannot reach http://127.0.0.1:1: connection refused".to_owned()),
            }
        );
    }

    #[test]
    fn completions_echo_their_correlation_data() {
        let response = Request::DeleteClient {
            id: ClientId::from("9"),
        }
        .execute(&Offline);
        assert_eq!(
            response,
            Response::Deleted {
                id: ClientId::from("9"),
                result: Ok(()),
            }
        );
        assert!(response.error().is_none());

        let created = Request::CreateClient {
            token: 1,
            input: NewClient {
                client_name: "x".to_owned(),
                tickers: Vec::new(),
                currencies: Vec::new(),
                region: None,
            },
        }
        .execute(&Offline);
        assert_eq!(created.error(), Some("server error (422): bad input"));
    }

    #[test]
    fn undispatched_requests_fail_with_their_correlation_data() {
        let error = anyhow!("thread limit reached").context("spawn backend worker");
        let deleted = Request::DeleteClient {
            id: ClientId::from("4"),
        }
        .failed(&error);
        assert_eq!(
            deleted,
            Response::Deleted {
                id: ClientId::from("4"),
                result: Err("spawn backend worker: thread limit reached".to_owned()),
            }
        );

        let audit = Request::LoadAudit {
            token: 2,
            id: ClientId::from("4"),
        }
        .failed(&error);
        assert_eq!(
            audit,
            Response::Audit {
                token: 2,
                id: ClientId::from("4"),
                result: Err("spawn backend worker: thread limit reached".to_owned()),
            }
        );
    }
}
