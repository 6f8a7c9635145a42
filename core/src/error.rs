/*
 * error.rs
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

//! Request errors: `FuelError` and the three causes it can wrap.

use std::error::Error;
use std::fmt;
use std::io;

use bytes::Bytes;

/// Boxed cause of a deserialization failure (serde_json::Error, a closure's error, ...).
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Non-2xx status received from the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP Exception {status_code} {reason}")]
pub struct HttpException {
    status_code: u16,
    reason: String,
}

impl HttpException {
    pub fn new(status_code: u16, reason: impl Into<String>) -> Self {
        Self {
            status_code,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The payload arrived but could not be mapped to the requested type.
#[derive(Debug)]
pub struct DeserializationError {
    source: BoxError,
}

impl DeserializationError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The parser's own error.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.source
    }

    /// Downcast the parser's error, e.g. to `serde_json::Error`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deserialization failed: {}", self.source)
    }
}

impl Error for DeserializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// What went wrong underneath a `FuelError`.
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    /// Connection, TLS, timeout, malformed URL or other I/O failure. No HTTP status.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Http(#[from] HttpException),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),
}

/// Error reported for a request: the cause, an optional message overriding the cause's text,
/// and for HTTP failures the body the server sent with the error status.
#[derive(Debug)]
pub struct FuelError {
    cause: Cause,
    message: Option<String>,
    error_data: Bytes,
}

impl FuelError {
    pub fn new(cause: impl Into<Cause>) -> Self {
        Self {
            cause: cause.into(),
            message: None,
            error_data: Bytes::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_error_data(mut self, data: Bytes) -> Self {
        self.error_data = data;
        self
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Human-readable message: the explicit message if one was given, otherwise the cause's.
    pub fn message(&self) -> String {
        match &self.message {
            Some(m) => m.clone(),
            None => self.cause.to_string(),
        }
    }

    /// Body of the non-2xx response (empty for other failures).
    pub fn error_data(&self) -> &Bytes {
        &self.error_data
    }

    pub fn http_exception(&self) -> Option<&HttpException> {
        match &self.cause {
            Cause::Http(e) => Some(e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.http_exception().map(HttpException::status_code)
    }

    pub fn deserialization_error(&self) -> Option<&DeserializationError> {
        match &self.cause {
            Cause::Deserialization(e) => Some(e),
            _ => None,
        }
    }

    pub fn io_error(&self) -> Option<&io::Error> {
        match &self.cause {
            Cause::Io(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.io_error()
            .map(|e| e.kind() == io::ErrorKind::TimedOut)
            .unwrap_or(false)
    }
}

impl fmt::Display for FuelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}", m),
            None => write!(f, "{}", self.cause),
        }
    }
}

impl Error for FuelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

impl From<io::Error> for FuelError {
    fn from(e: io::Error) -> Self {
        FuelError::new(e)
    }
}

impl From<HttpException> for FuelError {
    fn from(e: HttpException) -> Self {
        FuelError::new(e)
    }
}

impl From<DeserializationError> for FuelError {
    fn from(e: DeserializationError) -> Self {
        FuelError::new(e)
    }
}
