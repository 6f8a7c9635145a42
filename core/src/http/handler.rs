/*
 * handler.rs
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

//! HTTP response handler trait (push callbacks driven by the connection).
//!
//! Events: status → headers → start_body → body_chunk (×n) → end_body → trailer (×n) →
//! complete / failed.

use std::io;
use std::sync::{Arc, Mutex};

use bytes::{Bytes, BytesMut};

use crate::http::response::Response;

/// Handler for HTTP response events (push model). The connection drives this as data arrives.
///
/// Flow for a response with body:
/// 1. `ok(response)` or `error(response)`: status received
/// 2. `header(name, value)`: for each response header
/// 3. `start_body()`: body begins
/// 4. `body_chunk(data)`: for each chunk of body data
/// 5. `end_body()`: body complete
/// 6. `header(name, value)`: for each trailer (if any)
/// 7. `complete()`: response fully complete
///
/// On connection/protocol failure `failed(error)` is called, possibly after some of the above.
pub trait ResponseHandler {
    /// Called when a successful (2xx) status is received.
    fn ok(&mut self, response: Response);

    /// Called when any other status is received.
    fn error(&mut self, response: Response);

    /// Called for each response or trailer header. Name may repeat for multi-value headers.
    fn header(&mut self, name: &str, value: &str);

    /// Called when the response body is about to start. Not called for HEAD, 204 or 304.
    fn start_body(&mut self);

    /// Called for each chunk of body data. Data is only valid for the duration of the call.
    fn body_chunk(&mut self, data: &[u8]);

    fn end_body(&mut self);

    /// Called when the response is fully complete (after all headers and body).
    fn complete(&mut self);

    /// Called when the request fails (connection error, protocol error, timeout).
    fn failed(&mut self, error: &io::Error);
}

/// Everything a `CollectingHandler` saw, readable once `send` returns.
#[derive(Debug, Default)]
pub struct CollectedResponse {
    pub response: Option<Response>,
    pub headers: Vec<(String, String)>,
    pub body: BytesMut,
    pub completed: bool,
    pub failure: Option<String>,
}

impl CollectedResponse {
    /// Take the body, leaving an empty buffer behind.
    pub fn take_body(&mut self) -> Bytes {
        self.body.split().freeze()
    }
}

/// ResponseHandler that buffers the whole response into shared state.
/// `HttpConnection::send` takes the handler by value, so the result is read back through the `Arc`.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    state: Arc<Mutex<CollectedResponse>>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<CollectedResponse>> {
        self.state.clone()
    }

    fn with_state(&self, f: impl FnOnce(&mut CollectedResponse)) {
        let mut guard = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}

impl ResponseHandler for CollectingHandler {
    fn ok(&mut self, response: Response) {
        self.with_state(|s| s.response = Some(response));
    }

    fn error(&mut self, response: Response) {
        self.with_state(|s| s.response = Some(response));
    }

    fn header(&mut self, name: &str, value: &str) {
        self.with_state(|s| s.headers.push((name.to_string(), value.to_string())));
    }

    fn start_body(&mut self) {}

    fn body_chunk(&mut self, data: &[u8]) {
        self.with_state(|s| s.body.extend_from_slice(data));
    }

    fn end_body(&mut self) {}

    fn complete(&mut self) {
        self.with_state(|s| s.completed = true);
    }

    fn failed(&mut self, error: &io::Error) {
        self.with_state(|s| s.failure = Some(error.to_string()));
    }
}
