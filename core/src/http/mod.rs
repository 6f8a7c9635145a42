/*
 * mod.rs
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

//! HTTP/1.1 client with push-parsed responses.
//!
//! - Callback-based response API: `ResponseHandler` with `ok`/`error`, `header`, `start_body`,
//!   `body_chunk`, `end_body`, `complete`, `failed`.
//! - Buffers: `bytes` crate (BytesMut for the parse buffer and collected bodies).
//! - TLS with ALPN `http/1.1`.
//! - `HttpExecutor` runs each request on its own connection and reports through a `Completion`.

mod handler;
mod request;
mod response;

pub mod h1;

pub use handler::{CollectedResponse, CollectingHandler, ResponseHandler};
pub use h1::H1ResponseHandler;
pub use request::{Method, Request};
pub use response::Response;

pub mod client;
pub mod connection;
pub mod executor;

pub use client::HttpClient;
pub use connection::{HttpConnection, HttpStream};
pub use executor::HttpExecutor;
