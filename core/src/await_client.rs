/*
 * await_client.rs
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

//! Awaitable entry points over a `RequestExecutor`.
//!
//! Three result shapes for each of three body representations (bytes, text, object):
//!
//! | shape    | bytes                       | text                    | object                  |
//! |----------|-----------------------------|-------------------------|-------------------------|
//! | raw      | `await_byte_array`          | `await_string`          | `await_object`          |
//! | result   | `await_byte_array_result`   | `await_string_result`   | `await_object_result`   |
//! | response | `await_response`            | `await_string_response` | `await_object_response` |
//!
//! The raw shape returns `Err(FuelError)` for every failure, including a failed deserialization.
//! The result and response shapes never fail: transport, HTTP status and deserialization
//! failures all arrive as `FuelResult::Failure`.
//!
//! Every entry point suspends only the calling task. Dropping the returned future before it
//! resolves cancels the request.

use bytes::Bytes;

use crate::bridge::AwaitBridge;
use crate::config::ClientConfig;
use crate::deserialize::{decode_text, deserialize_body, ResponseDeserializable};
use crate::error::FuelError;
use crate::executor::{RequestExecutor, RequestOutcome};
use crate::http::{HttpExecutor, Request, Response};
use crate::result::FuelResult;

/// Request, response (when a status line was received) and the result.
pub type ResponseTriple<T> = (Request, Option<Response>, FuelResult<T, FuelError>);

pub struct AwaitClient<X> {
    executor: X,
}

impl AwaitClient<HttpExecutor> {
    /// Client over HTTP on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn http(config: ClientConfig) -> Self {
        Self::new(HttpExecutor::new(config))
    }
}

impl<X: RequestExecutor> AwaitClient<X> {
    pub fn new(executor: X) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    async fn outcome(&self, request: Request) -> RequestOutcome {
        AwaitBridge::new(&self.executor).submit(request).await
    }

    // Raw: body or Err.

    /// Response body as bytes.
    pub async fn await_byte_array(&self, request: Request) -> Result<Bytes, FuelError> {
        self.await_byte_array_result(request).await.into_result()
    }

    /// Response body decoded as text using the response charset (UTF-8 otherwise).
    pub async fn await_string(&self, request: Request) -> Result<String, FuelError> {
        self.await_string_result(request).await.into_result()
    }

    /// Response body deserialized. A deserializer error is returned as a `FuelError` whose cause
    /// is `Cause::Deserialization`.
    pub async fn await_object<D>(
        &self,
        request: Request,
        deserializer: &D,
    ) -> Result<D::Output, FuelError>
    where
        D: ResponseDeserializable + ?Sized,
    {
        self.await_object_result(request, deserializer).await.into_result()
    }

    // Result: failures folded into the value.

    pub async fn await_byte_array_result(&self, request: Request) -> FuelResult<Bytes, FuelError> {
        self.await_response(request).await.2
    }

    pub async fn await_string_result(&self, request: Request) -> FuelResult<String, FuelError> {
        self.await_string_response(request).await.2
    }

    pub async fn await_object_result<D>(
        &self,
        request: Request,
        deserializer: &D,
    ) -> FuelResult<D::Output, FuelError>
    where
        D: ResponseDeserializable + ?Sized,
    {
        self.await_object_response(request, deserializer).await.2
    }

    // Response: request, response and result together.

    pub async fn await_response(&self, request: Request) -> ResponseTriple<Bytes> {
        let RequestOutcome {
            request,
            response,
            result,
        } = self.outcome(request).await;
        (request, response, result)
    }

    pub async fn await_string_response(&self, request: Request) -> ResponseTriple<String> {
        let (request, response, result) = self.await_response(request).await;
        let result = result.map(|body| decode_text(&body, response.as_ref()));
        (request, response, result)
    }

    /// The deserializer runs only on a 2xx body; a failed deserialization keeps the response.
    pub async fn await_object_response<D>(
        &self,
        request: Request,
        deserializer: &D,
    ) -> ResponseTriple<D::Output>
    where
        D: ResponseDeserializable + ?Sized,
    {
        let (request, response, result) = self.await_response(request).await;
        let result = result.and_then(|body| {
            match deserialize_body(deserializer, &body, response.as_ref()) {
                Ok(value) => FuelResult::Success(value),
                Err(e) => FuelResult::Failure(e),
            }
        });
        (request, response, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialize::{from_fn, Json};
    use crate::error::{Cause, HttpException};
    use crate::executor::{Completion, RequestHandle};
    use serde::Deserialize;
    use std::io;

    /// Completes synchronously based on the request path.
    struct Canned;

    impl RequestExecutor for Canned {
        fn execute(&self, request: Request, completion: Completion) -> RequestHandle {
            let outcome = match request.path.as_str() {
                "/uuid" => {
                    let mut response = Response::with_reason(200, "OK");
                    response.headers.push(("Content-Type".into(), "application/json".into()));
                    let body =
                        Bytes::from_static(br#"{"uuid":"6ba7b810-9dad-11d1-80b4-00c04fd430c8"}"#);
                    RequestOutcome::success(request, response, body)
                }
                "/latin1" => {
                    let mut response = Response::with_reason(200, "OK");
                    response
                        .headers
                        .push(("Content-Type".into(), "text/plain; charset=iso-8859-1".into()));
                    RequestOutcome::success(request, response, Bytes::from_static(&[0x6e, 0xe9]))
                }
                "/offline" => RequestOutcome::failure(
                    request,
                    None,
                    FuelError::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
                ),
                _ => RequestOutcome::failure(
                    request,
                    Some(Response::with_reason(404, "Not Found")),
                    FuelError::new(HttpException::new(404, "Not Found"))
                        .with_error_data(Bytes::from_static(b"missing")),
                ),
            };
            completion.complete(outcome);
            RequestHandle::detached()
        }
    }

    #[derive(Debug, Deserialize)]
    struct Uuid {
        uuid: String,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Origin {
        origin: String,
    }

    #[tokio::test]
    async fn raw_family() {
        let client = AwaitClient::new(Canned);
        let bytes = client.await_byte_array(Request::get("/uuid")).await.unwrap();
        assert!(bytes.starts_with(b"{"));
        let text = client.await_string(Request::get("/latin1")).await.unwrap();
        assert_eq!(text, "né");
        let uuid = client
            .await_object(Request::get("/uuid"), &Json::<Uuid>::new())
            .await
            .unwrap();
        assert_eq!(uuid.uuid.len(), 36);

        let err = client.await_string(Request::get("/nope")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(&err.error_data()[..], b"missing");
    }

    #[tokio::test]
    async fn raw_deserialization_failure_is_an_error() {
        let client = AwaitClient::new(Canned);
        let err = client
            .await_object(Request::get("/uuid"), &Json::<Origin>::new())
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), Cause::Deserialization(_)));
    }

    #[tokio::test]
    async fn result_family_folds_failures() {
        let client = AwaitClient::new(Canned);
        let r = client.await_byte_array_result(Request::get("/offline")).await;
        let kind = r.fold(|_| None, |e| e.io_error().map(io::Error::kind));
        assert_eq!(kind, Some(io::ErrorKind::ConnectionRefused));

        let r = client.await_string_result(Request::get("/nope")).await;
        assert_eq!(r.fold(|_| 0, |e| e.status_code().unwrap_or(0)), 404);

        let r = client
            .await_object_result(Request::get("/uuid"), &Json::<Origin>::new())
            .await;
        assert!(r.fold(|_| false, |e| e.deserialization_error().is_some()));

        let length = from_fn(|s: &str| Ok::<_, io::Error>(s.len()));
        let r = client.await_object_result(Request::get("/latin1"), &length).await;
        assert_eq!(r.fold(|n| n, |_| 0), 3);
    }

    #[tokio::test]
    async fn response_family_keeps_request_and_response() {
        let client = AwaitClient::new(Canned);
        let (request, response, result) = client.await_response(Request::get("/uuid")).await;
        assert_eq!(request.path, "/uuid");
        assert_eq!(response.as_ref().map(|r| r.code), Some(200));
        assert!(result.is_success());

        let (_, response, result) = client.await_string_response(Request::get("/nope")).await;
        assert_eq!(response.map(|r| r.code), Some(404));
        assert!(result.is_failure());

        let (_, response, result) = client
            .await_object_response(Request::get("/uuid"), &Json::<Origin>::new())
            .await;
        assert_eq!(response.map(|r| r.code), Some(200));
        assert!(result.fold(|_| false, |e| e.deserialization_error().is_some()));

        let (_, response, result) = client.await_response(Request::get("/offline")).await;
        assert!(response.is_none());
        assert!(result.is_failure());
    }
}
