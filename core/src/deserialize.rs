/*
 * deserialize.rs
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

//! Response body decoding: bytes → text using the response charset, text → object through a
//! caller-supplied `ResponseDeserializable`.

use std::marker::PhantomData;

use encoding_rs::{Encoding, UTF_8};
use serde::de::DeserializeOwned;

use crate::error::{BoxError, DeserializationError, FuelError};
use crate::http::Response;

/// Turns decoded response text into a typed value. Passed to the object awaiters per call.
pub trait ResponseDeserializable {
    type Output;

    fn deserialize(&self, content: &str) -> Result<Self::Output, BoxError>;
}

impl<D: ResponseDeserializable + ?Sized> ResponseDeserializable for &D {
    type Output = D::Output;

    fn deserialize(&self, content: &str) -> Result<Self::Output, BoxError> {
        (**self).deserialize(content)
    }
}

/// JSON deserializer for any serde type: `Json::<Uuid>::new()`.
pub struct Json<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Json<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ResponseDeserializable for Json<T> {
    type Output = T;

    fn deserialize(&self, content: &str) -> Result<T, BoxError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Deserializer backed by a closure. Build with `from_fn`.
pub struct FromFn<F> {
    f: F,
}

/// Use a closure `Fn(&str) -> Result<T, E>` as a deserializer.
pub fn from_fn<F, T, E>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Result<T, E>,
    E: Into<BoxError>,
{
    FromFn { f }
}

impl<F, T, E> ResponseDeserializable for FromFn<F>
where
    F: Fn(&str) -> Result<T, E>,
    E: Into<BoxError>,
{
    type Output = T;

    fn deserialize(&self, content: &str) -> Result<T, BoxError> {
        (self.f)(content).map_err(Into::into)
    }
}

/// Decode a body using the charset named in the response's Content-Type, as resolved by
/// `encoding_rs` (WHATWG labels: `iso-8859-1` is windows-1252, `utf-16le`, `shift_jis`, ...).
/// A missing or unknown charset means UTF-8. Malformed sequences become U+FFFD.
pub fn decode_text(body: &[u8], response: Option<&Response>) -> String {
    let encoding = response
        .and_then(Response::charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Decode and deserialize a successful body, turning a parser failure into a `FuelError`
/// whose cause is `DeserializationError`.
pub(crate) fn deserialize_body<D: ResponseDeserializable + ?Sized>(
    deserializer: &D,
    body: &[u8],
    response: Option<&Response>,
) -> Result<D::Output, FuelError> {
    let text = decode_text(body, response);
    deserializer
        .deserialize(&text)
        .map_err(|e| FuelError::new(DeserializationError::new(e)))
}
