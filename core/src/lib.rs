/*
 * lib.rs
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

//! Corriere core: awaitable HTTP requests on top of a callback-driven executor.
//!
//! ```no_run
//! use corriere_core::{AwaitClient, ClientConfig, Json, Request};
//!
//! #[derive(serde::Deserialize)]
//! struct Uuid { uuid: String }
//!
//! # async fn run() -> Result<(), corriere_core::FuelError> {
//! let mut config = ClientConfig::new();
//! config.set_base_path("https://httpbin.org");
//! let client = AwaitClient::http(config);
//! let uuid = client.await_object(Request::get("/uuid"), &Json::<Uuid>::new()).await?;
//! println!("{}", uuid.uuid);
//! # Ok(())
//! # }
//! ```

pub mod await_client;
pub mod bridge;
pub mod config;
pub mod deserialize;
pub mod error;
pub mod executor;
pub mod http;
pub mod net;
pub mod result;
pub mod uri;

pub use await_client::{AwaitClient, ResponseTriple};
pub use bridge::{AwaitBridge, PendingOutcome, RequestState};
pub use config::{ClientConfig, ConfigError};
pub use deserialize::{decode_text, from_fn, FromFn, Json, ResponseDeserializable};
pub use error::{BoxError, Cause, DeserializationError, FuelError, HttpException};
pub use executor::{Completion, RequestExecutor, RequestHandle, RequestOutcome};
pub use http::{HttpExecutor, Method, Request, Response};
pub use result::FuelResult;
