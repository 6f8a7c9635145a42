/*
 * connection.rs
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

//! HTTP connection: one TCP or TLS stream, drives the HTTP/1.1 parser, invokes ResponseHandler.

use bytes::BytesMut;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream as TokioTlsStream;
use tracing::trace;

use crate::http::h1::{H1ResponseHandler, ParseState, ResponseParser};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::ResponseHandler;

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(Box<TokioTlsStream<TcpStream>>),
}

impl AsyncRead for HttpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for HttpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Bridges H1 parser callbacks to the connection state and user's ResponseHandler.
/// Status and headers are held back until the header block is complete so the handler
/// sees `ok`/`error` before any header.
struct H1Driver<'a> {
    status: &'a mut Option<(u16, Option<String>)>,
    headers: &'a mut Vec<(String, String)>,
    handler: &'a mut (dyn ResponseHandler + Send),
}

impl H1ResponseHandler for H1Driver<'_> {
    fn status(&mut self, code: u16, reason: Option<&str>) {
        *self.status = Some((code, reason.map(|s| s.to_string())));
    }

    fn header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn start_body(&mut self) {
        self.handler.start_body();
    }

    fn body_chunk(&mut self, data: &[u8]) {
        self.handler.body_chunk(data);
    }

    fn end_body(&mut self) {
        self.handler.end_body();
    }

    fn trailer(&mut self, name: &str, value: &str) {
        self.handler.header(name, value);
    }

    fn complete(&mut self) {
        self.handler.complete();
    }
}

/// HTTP/1.1 connection: holds the stream and drives the read loop. Call send() to issue a request.
pub struct HttpConnection {
    stream: HttpStream,
    host: String,
    port: u16,
    secure: bool,
    read_timeout: Option<Duration>,
    read_buf: BytesMut,
    parser: ResponseParser,
    status: Option<(u16, Option<String>)>,
    headers: Vec<(String, String)>,
}

impl HttpConnection {
    /// Create from an already-connected stream. Used by HttpClient::connect().
    pub fn new(stream: HttpStream, host: String, port: u16, secure: bool) -> Self {
        Self {
            stream,
            host,
            port,
            secure,
            read_timeout: None,
            read_buf: BytesMut::with_capacity(8192),
            parser: ResponseParser::new(),
            status: None,
            headers: Vec::new(),
        }
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Bound every socket read; a read that takes longer fails with `ErrorKind::TimedOut`.
    pub fn set_read_timeout(&mut self, read_timeout: Option<Duration>) -> &mut Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Send the request and run the read loop until the response is complete.
    /// `request.path` must be in origin form (`/path?query`). On error the handler's `failed` is
    /// called and the same error is returned.
    pub async fn send(
        &mut self,
        request: &Request,
        mut handler: impl ResponseHandler + Send + 'static,
    ) -> io::Result<()> {
        match self.exchange(request, &mut handler).await {
            Ok(()) => Ok(()),
            Err(e) => {
                handler.failed(&e);
                Err(e)
            }
        }
    }

    async fn exchange(
        &mut self,
        request: &Request,
        handler: &mut (dyn ResponseHandler + Send),
    ) -> io::Result<()> {
        self.status = None;
        self.headers.clear();
        self.parser.reset();
        self.read_buf.clear();

        self.write_request(request).await?;

        loop {
            self.parse_buffered(request.method, handler)?;
            if self.parser.state() == ParseState::Idle {
                return Ok(());
            }

            let mut tmp = [0u8; 8192];
            let n = self.read(&mut tmp).await?;
            if n == 0 {
                let mut driver = H1Driver {
                    status: &mut self.status,
                    headers: &mut self.headers,
                    handler: &mut *handler,
                };
                return self.parser.eof(&mut driver);
            }
            trace!(host = %self.host, bytes = n, "read");
            self.read_buf.extend_from_slice(&tmp[..n]);
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_timeout {
            Some(limit) => timeout(limit, self.stream.read(buf))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "HTTP read timed out"))?,
            None => self.stream.read(buf).await,
        }
    }

    /// Feed everything buffered to the parser, switching to body mode when the header block ends.
    fn parse_buffered(
        &mut self,
        method: Method,
        handler: &mut (dyn ResponseHandler + Send),
    ) -> io::Result<()> {
        loop {
            {
                let mut driver = H1Driver {
                    status: &mut self.status,
                    headers: &mut self.headers,
                    handler: &mut *handler,
                };
                self.parser.receive(&mut self.read_buf, &mut driver)?;
            }
            if self.parser.state() != ParseState::HeadersComplete {
                return Ok(());
            }

            let (code, reason) = self.status.take().unwrap_or((0, None));
            // Interim 1xx responses: discard and parse the final one.
            if (100..200).contains(&code) {
                self.headers.clear();
                self.parser.reset();
                continue;
            }
            self.begin_body(method, code, reason, handler);
        }
    }

    fn begin_body(
        &mut self,
        method: Method,
        code: u16,
        reason: Option<String>,
        handler: &mut (dyn ResponseHandler + Send),
    ) {
        let content_length = self
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<u64>().ok());
        let chunked = self
            .headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("transfer-encoding") && v.contains("chunked"));

        let mut response = match reason {
            Some(r) => Response::with_reason(code, r),
            None => Response::new(code),
        };
        response.headers = self.headers.clone();
        if response.is_success() {
            handler.ok(response);
        } else {
            handler.error(response);
        }
        for (name, value) in &self.headers {
            handler.header(name, value);
        }

        let bodiless = method == Method::Head || code == 204 || code == 304;
        let mut driver = H1Driver {
            status: &mut self.status,
            headers: &mut self.headers,
            handler,
        };
        if bodiless {
            self.parser.set_body_mode(Some(0), false, &mut driver);
        } else {
            if chunked || content_length != Some(0) {
                driver.start_body();
            }
            self.parser.set_body_mode(content_length, chunked, &mut driver);
        }
    }

    /// Host header value: IPv6 literals bracketed, port omitted when it is the scheme default.
    fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let default_port = if self.secure { 443 } else { 80 };
        if self.port == default_port {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    async fn write_request(&mut self, request: &Request) -> io::Result<()> {
        let host_header = self.host_header();
        let use_chunked = request.body.is_some()
            && !request.has_header("Content-Length")
            && !request.has_header("Transfer-Encoding");
        let mut head = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\n",
            request.method.as_str(),
            request.path,
            host_header
        );
        for (k, v) in &request.headers {
            head.push_str(k);
            head.push_str(": ");
            head.push_str(v);
            head.push_str("\r\n");
        }
        if !request.has_header("Connection") {
            head.push_str("Connection: keep-alive\r\n");
        }
        if use_chunked {
            head.push_str("Transfer-Encoding: chunked\r\n");
        }
        head.push_str("\r\n");
        self.stream.write_all(head.as_bytes()).await?;
        if let Some(body) = &request.body {
            if use_chunked {
                if !body.is_empty() {
                    let hex_len = format!("{:x}\r\n", body.len());
                    self.stream.write_all(hex_len.as_bytes()).await?;
                    self.stream.write_all(body).await?;
                    self.stream.write_all(b"\r\n").await?;
                }
                self.stream.write_all(b"0\r\n\r\n").await?;
            } else {
                self.stream.write_all(body).await?;
            }
        }
        self.stream.flush().await?;
        Ok(())
    }
}
