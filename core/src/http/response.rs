/*
 * response.rs
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

//! HTTP response metadata: status, reason, headers, URL and body length.
//!
//! The body itself travels separately (in the request outcome) so the metadata can be handed
//! back to callers on failure as well as success.

/// Response status line plus whatever the executor learned about the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    /// URL the request was sent to, after base path and parameter resolution.
    pub url: String,
    /// Number of body bytes received.
    pub content_length: u64,
}

impl Response {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            reason: None,
            headers: Vec::new(),
            url: String::new(),
            content_length: 0,
        }
    }

    pub fn with_reason(code: u16, reason: impl Into<String>) -> Self {
        let mut response = Self::new(code);
        response.reason = Some(reason.into());
        response
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Reason phrase, or empty if the server sent none.
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// `charset` parameter of Content-Type, lowercased, without quotes.
    pub fn charset(&self) -> Option<String> {
        let content_type = self.content_type()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_ascii_lowercase())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_from_content_type() {
        let mut r = Response::with_reason(200, "OK");
        r.headers.push(("content-type".into(), "text/plain; Charset=\"ISO-8859-1\"".into()));
        assert_eq!(r.charset().as_deref(), Some("iso-8859-1"));
        assert!(r.is_success());
    }

    #[test]
    fn no_charset() {
        let mut r = Response::new(404);
        assert_eq!(r.charset(), None);
        r.headers.push(("Content-Type".into(), "application/json".into()));
        assert_eq!(r.charset(), None);
        assert!(!r.is_success());
        assert_eq!(r.reason(), "");
    }
}
