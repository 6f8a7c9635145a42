/*
 * executor.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Corriere, an asynchronous HTTP request library.
 *
 * Corriere is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Corriere is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Corriere.  If not, see <http://www.gnu.org/licenses/>.
 */

//! `RequestExecutor` over `HttpClient`: one connection per request, run on a tokio task.

use std::io;
use std::sync::{Arc, PoisonError};

use bytes::Bytes;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{FuelError, HttpException};
use crate::executor::{Completion, RequestExecutor, RequestHandle, RequestOutcome};
use crate::http::client::HttpClient;
use crate::http::handler::CollectingHandler;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::uri::{self, Target};

/// Executes requests over HTTP/1.1, applying the client configuration (base path, base headers
/// and parameters, timeouts). Cancelling a request aborts its task, which closes the socket.
#[derive(Clone)]
pub struct HttpExecutor {
    config: Arc<ClientConfig>,
    runtime: Handle,
}

impl HttpExecutor {
    /// Executor spawning onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime; use `with_runtime_handle` there.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_runtime_handle(config, Handle::current())
    }

    pub fn with_runtime_handle(config: ClientConfig, runtime: Handle) -> Self {
        Self {
            config: Arc::new(config),
            runtime,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl RequestExecutor for HttpExecutor {
    fn execute(&self, request: Request, completion: Completion) -> RequestHandle {
        let target = match uri::resolve(
            self.config.base_path(),
            &request.path,
            self.config.base_params(),
            &request.params,
        ) {
            Ok(target) => target,
            Err(e) => {
                warn!(path = %request.path, error = %e, "cannot resolve request URL");
                completion.complete(RequestOutcome::failure(request, None, FuelError::new(e)));
                return RequestHandle::detached();
            }
        };
        let config = self.config.clone();
        let task = self.runtime.spawn(async move {
            let outcome = perform(&config, request, target).await;
            completion.complete(outcome);
        });
        RequestHandle::from_abort_handle(task.abort_handle())
    }
}

/// Wire form of the request: origin-form target, base headers the request does not override,
/// and a single-use connection.
fn wire_request(config: &ClientConfig, request: &Request, target: &Target) -> Request {
    let mut wire = Request::new(request.method, target.path_and_query.clone());
    for (name, value) in config.base_headers() {
        if !request.has_header(name) {
            wire.header(name.clone(), value.clone());
        }
    }
    for (name, value) in &request.headers {
        wire.header(name.clone(), value.clone());
    }
    if !wire.has_header("Connection") {
        wire.header("Connection", "close");
    }
    if let Some(body) = &request.body {
        if !wire.has_header("Content-Length") && !wire.has_header("Transfer-Encoding") {
            wire.header("Content-Length", body.len().to_string());
        }
        wire.body_slice(body);
    }
    wire
}

async fn perform(config: &ClientConfig, request: Request, target: Target) -> RequestOutcome {
    debug!(method = request.method.as_str(), url = %target.url, "executing");
    let wire = wire_request(config, &request, &target);
    let handler = CollectingHandler::new();
    let state = handler.state();

    let sent = match HttpClient::connect_with_timeout(
        &target.host,
        target.port,
        target.secure,
        config.timeout(),
    )
    .await
    {
        Ok(mut connection) => {
            connection.set_read_timeout(Some(config.timeout_read()));
            connection.send(&wire, handler).await
        }
        Err(e) => Err(e),
    };

    let mut collected = state.lock().unwrap_or_else(PoisonError::into_inner);
    let body = collected.take_body();
    let response = collected.response.take().map(|mut response| {
        response.url = target.url.clone();
        response.content_length = body.len() as u64;
        response
    });
    drop(collected);

    match (sent, response) {
        (Ok(()), Some(response)) => classify(request, response, body),
        (Ok(()), None) => {
            let e = io::Error::new(io::ErrorKind::UnexpectedEof, "no response received");
            RequestOutcome::failure(request, None, FuelError::new(e))
        }
        (Err(e), response) => {
            debug!(url = %target.url, error = %e, "request failed");
            RequestOutcome::failure(request, response, FuelError::new(e))
        }
    }
}

/// 2xx is success; any other status is an `HttpException` carrying the body as error data.
fn classify(request: Request, response: Response, body: Bytes) -> RequestOutcome {
    if response.is_success() {
        return RequestOutcome::success(request, response, body);
    }
    let error = FuelError::new(HttpException::new(response.code, response.reason()))
        .with_error_data(body);
    debug!(url = %response.url, status = response.code, "non-success status");
    RequestOutcome::failure(request, Some(response), error)
}
