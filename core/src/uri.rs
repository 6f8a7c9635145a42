/*
 * uri.rs
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

//! Request URL resolution: base path joining, query parameters, and splitting an http(s) URL
//! into what the connection needs (scheme, host, port, origin-form path).

use std::io;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Query component safe set: encode everything that would break `name=value&...` parsing.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']');

/// Where a request goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    /// Origin-form request target: `/path?query`.
    pub path_and_query: String,
    /// Full URL, for diagnostics and `Response::url`.
    pub url: String,
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Join a relative path onto the base path with exactly one slash between them.
pub fn join_base_path(base_path: &str, path: &str) -> String {
    if path.is_empty() {
        return base_path.to_string();
    }
    format!(
        "{}/{}",
        base_path.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Append `name=value` pairs (percent-encoded) to a URL that may already carry a query.
pub fn append_query(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_COMPONENT),
                utf8_percent_encode(v, QUERY_COMPONENT)
            )
        })
        .collect();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query.join("&"))
}

/// Split an absolute http/https URL into a `Target`. Fragments are dropped.
pub fn parse_http_url(url: &str) -> io::Result<Target> {
    let (secure, rest) = if let Some(rest) = url.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        (false, rest)
    } else {
        return Err(invalid(format!("expected http:// or https:// URL: {}", url)));
    };
    let rest = rest.split('#').next().unwrap_or(rest);
    let (authority, path) = match rest.find(|c| c == '/' || c == '?') {
        Some(i) if rest[i..].starts_with('?') => (&rest[..i], format!("/{}", &rest[i..])),
        Some(i) => (&rest[..i], rest[i..].to_string()),
        None => (rest, "/".to_string()),
    };
    // Userinfo is not supported in the authority; credentials go in headers.
    if authority.contains('@') {
        return Err(invalid(format!("userinfo not supported in URL: {}", url)));
    }
    let default_port = if secure { 443 } else { 80 };
    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        let end = bracketed
            .find(']')
            .ok_or_else(|| invalid(format!("unterminated IPv6 address in URL: {}", url)))?;
        let host = &bracketed[..end];
        let port = match bracketed[end + 1..].strip_prefix(':') {
            Some(p) => parse_port(p, url)?,
            None => default_port,
        };
        (host, port)
    } else {
        match authority.rsplit_once(':') {
            Some((h, p)) => (h, parse_port(p, url)?),
            None => (authority, default_port),
        }
    };
    if host.is_empty() {
        return Err(invalid(format!("missing host in URL: {}", url)));
    }
    Ok(Target {
        secure,
        host: host.to_string(),
        port,
        path_and_query: path,
        url: url.to_string(),
    })
}

fn parse_port(port: &str, url: &str) -> io::Result<u16> {
    port.parse::<u16>()
        .map_err(|_| invalid(format!("invalid port in URL: {}", url)))
}

/// Resolve a request path against the base path and add query parameters
/// (`base_params` first, then `params`).
pub fn resolve(
    base_path: Option<&str>,
    path: &str,
    base_params: &[(String, String)],
    params: &[(String, String)],
) -> io::Result<Target> {
    let url = if is_absolute(path) {
        path.to_string()
    } else {
        match base_path {
            Some(base) => join_base_path(base, path),
            None => return Err(invalid(format!("relative path without base path: {}", path))),
        }
    };
    let mut all_params = Vec::with_capacity(base_params.len() + params.len());
    all_params.extend_from_slice(base_params);
    all_params.extend_from_slice(params);
    parse_http_url(&append_query(&url, &all_params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn joins_base_path_with_single_slash() {
        assert_eq!(join_base_path("https://httpbin.org/", "/ip"), "https://httpbin.org/ip");
        assert_eq!(join_base_path("https://httpbin.org", "ip"), "https://httpbin.org/ip");
        assert_eq!(join_base_path("https://httpbin.org", ""), "https://httpbin.org");
    }

    #[test]
    fn resolves_relative_path() {
        let t = resolve(Some("https://httpbin.org"), "/uuid", &[], &[]).unwrap();
        assert!(t.secure);
        assert_eq!(t.host, "httpbin.org");
        assert_eq!(t.port, 443);
        assert_eq!(t.path_and_query, "/uuid");
        assert_eq!(t.url, "https://httpbin.org/uuid");
    }

    #[test]
    fn absolute_url_ignores_base_path() {
        let t = resolve(Some("https://httpbin.org"), "http://127.0.0.1:8080/ip", &[], &[]).unwrap();
        assert!(!t.secure);
        assert_eq!(t.host, "127.0.0.1");
        assert_eq!(t.port, 8080);
        assert_eq!(t.path_and_query, "/ip");
    }

    #[test]
    fn query_parameters_are_encoded_and_ordered() {
        let t = resolve(
            Some("http://example.com/api"),
            "search?x=1",
            &[p("key", "a b")],
            &[p("q", "rust&go")],
        )
        .unwrap();
        assert_eq!(t.path_and_query, "/api/search?x=1&key=a%20b&q=rust%26go");
    }

    #[test]
    fn ipv6_and_query_without_path() {
        let t = parse_http_url("http://[::1]:9000?a=1").unwrap();
        assert_eq!(t.host, "::1");
        assert_eq!(t.port, 9000);
        assert_eq!(t.path_and_query, "/?a=1");
    }

    #[test]
    fn malformed_urls_are_invalid_input() {
        for bad in ["/ip", "ftp://host/x", "http://:80/", "http://host:99999/", "http://u@host/"] {
            let err = resolve(None, bad, &[], &[]).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{}", bad);
        }
    }
}
