// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod memory;

pub use memory::MemoryBackend;

use anyhow::{Context, Result, anyhow, bail};
use clientdesk_app::{AuditEntry, Backend, Client, ClientId, FieldPatch, NewClient};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the registry's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("api.base_url {trimmed:?} is not a URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} must be an http(s) URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn health(&self) -> Result<()> {
        let url = self.endpoint(&["health"])?;
        let response = self.send(self.http.get(url))?;
        let parsed: HealthResponse = response.json().context("decode health response")?;
        if !parsed.ok {
            bail!("{} reported unhealthy", self.base_url());
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("api.base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "api response");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send(request)?
            .json()
            .with_context(|| format!("decode {what}"))
    }
}

impl Backend for HttpBackend {
    fn list_clients(&self, params: &[(&'static str, String)]) -> Result<Vec<Client>> {
        let mut url = self.endpoint(&["clients"])?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(name, value)| (*name, value.as_str())));
        }
        let parsed: Items<Client> = self.fetch_json(self.http.get(url), "client list")?;
        Ok(parsed.items)
    }

    fn client_audit(&self, id: &ClientId) -> Result<Vec<AuditEntry>> {
        let url = self.endpoint(&["clients", id.as_str(), "audit"])?;
        let parsed: Items<AuditEntry> = self.fetch_json(self.http.get(url), "audit history")?;
        Ok(parsed.items)
    }

    fn update_client(&self, id: &ClientId, patch: &FieldPatch) -> Result<Client> {
        let url = self.endpoint(&["clients", id.as_str()])?;
        self.fetch_json(self.http.patch(url).json(patch), "updated client")
    }

    fn create_client(&self, input: &NewClient) -> Result<Client> {
        let url = self.endpoint(&["clients"])?;
        self.fetch_json(self.http.post(url).json(input), "created client")
    }

    fn delete_client(&self, id: &ClientId) -> Result<()> {
        let url = self.endpoint(&["clients", id.as_str()])?;
        self.send(self.http.delete(url))?;
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- is the clientdesk API running? ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(detail) = parsed.detail.and_then(ErrorDetail::into_message)
    {
        return anyhow!("server error ({}): {}", status.as_u16(), detail);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<ErrorDetail>,
}

/// `detail` is a plain string for handled errors and a list of field
/// problems for request validation failures.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Problems(Vec<ValidationProblem>),
}

#[derive(Debug, Deserialize)]
struct ValidationProblem {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl ErrorDetail {
    fn into_message(self) -> Option<String> {
        let message = match self {
            Self::Message(message) => message,
            Self::Problems(problems) => problems
                .into_iter()
                .map(|problem| {
                    let field = problem
                        .loc
                        .last()
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_owned);
                    match field {
                        Some(field) => format!("{field}: {}", problem.msg),
                        None => problem.msg,
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!message.is_empty()).then_some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpBackend, clean_error_response};
    use anyhow::Result;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn new_rejects_empty_and_non_http_urls() {
        assert!(HttpBackend::new("  ", Duration::from_secs(1)).is_err());
        assert!(HttpBackend::new("ftp://example.com", Duration::from_secs(1)).is_err());
        assert!(HttpBackend::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn endpoints_keep_base_path_prefix() -> Result<()> {
        let backend = HttpBackend::new("http://127.0.0.1:8000/registry/", Duration::from_secs(1))?;
        assert_eq!(backend.base_url(), "http://127.0.0.1:8000/registry");
        assert_eq!(
            backend.endpoint(&["clients", "42", "audit"])?.as_str(),
            "http://127.0.0.1:8000/registry/clients/42/audit"
        );

        let bare = HttpBackend::new("http://127.0.0.1:8000", Duration::from_secs(1))?;
        assert_eq!(
            bare.endpoint(&["clients"])?.as_str(),
            "http://127.0.0.1:8000/clients"
        );
        Ok(())
    }

    #[test]
    fn ids_are_percent_encoded_as_one_segment() -> Result<()> {
        let backend = HttpBackend::new("http://127.0.0.1:8000", Duration::from_secs(1))?;
        assert_eq!(
            backend.endpoint(&["clients", "a/b c"])?.as_str(),
            "http://127.0.0.1:8000/clients/a%2Fb%20c"
        );
        Ok(())
    }

    #[test]
    fn detail_string_is_surfaced() {
        let error = clean_error_response(StatusCode::NOT_FOUND, r#"{"detail":"Client not found"}"#);
        assert_eq!(error.to_string(), "server error (404): Client not found");
    }

    #[test]
    fn validation_problems_are_joined() {
        let body = r#"{"detail":[{"loc":["body","client_name"],"msg":"Field required","type":"missing"}]}"#;
        let error = clean_error_response(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            error.to_string(),
            "server error (422): client_name: Field required"
        );
    }

    #[test]
    fn short_plain_bodies_pass_through_and_html_does_not() {
        let plain = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(plain.to_string(), "server error (502): upstream down");

        let html = clean_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html><body>{ internal error }</body></html>",
        );
        assert_eq!(html.to_string(), "server returned 500");
    }
}
