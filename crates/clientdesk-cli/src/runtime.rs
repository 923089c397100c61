// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use clientdesk_app::{Backend, Request, Response};
use clientdesk_tui::InternalEvent;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Runs each backend request on its own worker thread so the event loop
/// never blocks on the network.
pub struct ThreadedRuntime {
    backend: Arc<dyn Backend>,
    notice_timeout: Duration,
}

impl ThreadedRuntime {
    pub fn new(backend: Arc<dyn Backend>, notice_timeout: Duration) -> Self {
        Self {
            backend,
            notice_timeout,
        }
    }
}

impl clientdesk_tui::AppRuntime for ThreadedRuntime {
    fn execute(&mut self, request: Request) -> Response {
        request.execute(self.backend.as_ref())
    }

    fn dispatch(&mut self, request: Request, tx: Sender<InternalEvent>) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let label = request.label();
        debug!(request = label, "dispatching");
        thread::Builder::new()
            .name(format!("clientdesk-{label}"))
            .spawn(move || {
                let response = request.execute(backend.as_ref());
                let _ = tx.send(InternalEvent::Backend(response));
            })
            .with_context(|| format!("spawn worker for {label}"))?;
        Ok(())
    }

    fn notice_timeout(&self) -> Duration {
        self.notice_timeout
    }
}
