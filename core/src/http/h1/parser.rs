/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, headers, body (Content-Length, chunked, or until
//! close).

use bytes::Buf;
use bytes::BytesMut;
use std::io;

/// Callback for HTTP/1.1 response events. The connection implements this and forwards to
/// ResponseHandler.
pub trait H1ResponseHandler {
    fn status(&mut self, code: u16, reason: Option<&str>);
    fn header(&mut self, name: &str, value: &str);
    fn start_body(&mut self);
    fn body_chunk(&mut self, data: &[u8]);
    fn end_body(&mut self);
    fn trailer(&mut self, name: &str, value: &str);
    fn complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    StatusLine,
    Headers,
    /// Headers done; connection must call set_body_mode() before feeding more bytes.
    HeadersComplete,
    /// Body delimited by Content-Length.
    Body,
    /// Body delimited by connection close.
    BodyUntilClose,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// Push parser for HTTP/1.1 responses. Feed bytes via `receive`; handler is invoked as complete
/// tokens are parsed.
pub struct ResponseParser {
    state: ParseState,
    body_remaining: u64,
    chunk_remaining: u64,
}

/// Split one CRLF-terminated line off the front of `buf`, without the CRLF.
/// Returns None (consuming nothing) if no complete line is buffered.
fn take_line(buf: &mut BytesMut, what: &'static str) -> io::Result<Option<String>> {
    let end = match buf.windows(2).position(|w| w == b"\r\n") {
        Some(n) => n,
        None => return Ok(None),
    };
    let line = buf.split_to(end + 2);
    let text = std::str::from_utf8(&line[..end])
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, what))?;
    Ok(Some(text.to_string()))
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name.trim(), value.trim()))
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            body_remaining: 0,
            chunk_remaining: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Consume and parse as much as possible from buf. Partial tokens remain in buf.
    /// Stops at HeadersComplete so the connection can choose the body mode.
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> io::Result<()> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let Some(line) = take_line(buf, "invalid status line UTF-8")? else {
                        return Ok(());
                    };
                    // HTTP/1.1 200 OK or HTTP/1.1 200
                    let mut parts = line.splitn(3, ' ');
                    let version = parts.next().unwrap_or("");
                    if !version.starts_with("HTTP/") {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("malformed status line: {}", line),
                        ));
                    }
                    let code = parts
                        .next()
                        .and_then(|s| s.parse::<u16>().ok())
                        .ok_or_else(|| {
                            io::Error::new(io::ErrorKind::InvalidData, "invalid status code")
                        })?;
                    handler.status(code, parts.next());
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let Some(line) = take_line(buf, "invalid header UTF-8")? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.state = ParseState::HeadersComplete;
                        return Ok(());
                    }
                    if let Some((name, value)) = split_header(&line) {
                        handler.header(name, value);
                    }
                }
                ParseState::HeadersComplete | ParseState::Idle => return Ok(()),
                ParseState::Body => {
                    let n = (self.body_remaining.min(buf.len() as u64)) as usize;
                    if n > 0 {
                        let chunk = buf.split_to(n);
                        handler.body_chunk(&chunk);
                        self.body_remaining -= n as u64;
                    }
                    if self.body_remaining == 0 {
                        self.finish(handler);
                    }
                }
                ParseState::BodyUntilClose => {
                    let chunk = buf.split();
                    handler.body_chunk(&chunk);
                }
                ParseState::ChunkSize => {
                    let Some(line) = take_line(buf, "invalid chunk size")? else {
                        return Ok(());
                    };
                    let hex = line.split(';').next().unwrap_or("").trim();
                    self.chunk_remaining = u64::from_str_radix(hex, 16).map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "invalid chunk size")
                    })?;
                    self.state = if self.chunk_remaining == 0 {
                        ParseState::ChunkTrailer
                    } else {
                        ParseState::ChunkData
                    };
                }
                ParseState::ChunkData => {
                    if self.chunk_remaining > 0 {
                        let n = (self.chunk_remaining.min(buf.len() as u64)) as usize;
                        let chunk = buf.split_to(n);
                        handler.body_chunk(&chunk);
                        self.chunk_remaining -= n as u64;
                    }
                    if self.chunk_remaining > 0 {
                        return Ok(());
                    }
                    // Chunk data is followed by CRLF
                    if buf.len() < 2 {
                        return Ok(());
                    }
                    buf.advance(2);
                    self.state = ParseState::ChunkSize;
                }
                ParseState::ChunkTrailer => {
                    let Some(line) = take_line(buf, "invalid trailer")? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.finish(handler);
                    } else if let Some((name, value)) = split_header(&line) {
                        handler.trailer(name, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Called by the connection in state HeadersComplete. The connection calls
    /// handler.start_body() itself.
    /// `content_length` of Some(0) (or a body-less response) completes the response immediately.
    pub fn set_body_mode<H: H1ResponseHandler>(
        &mut self,
        content_length: Option<u64>,
        chunked: bool,
        handler: &mut H,
    ) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        self.state = match (chunked, content_length) {
            (true, _) => ParseState::ChunkSize,
            (false, Some(0)) => {
                handler.complete();
                ParseState::Idle
            }
            (false, Some(n)) => {
                self.body_remaining = n;
                ParseState::Body
            }
            (false, None) => ParseState::BodyUntilClose,
        };
    }

    /// The peer closed the connection. Ends a read-until-close body; anything else is truncation.
    pub fn eof<H: H1ResponseHandler>(&mut self, handler: &mut H) -> io::Result<()> {
        match self.state {
            ParseState::BodyUntilClose => {
                self.finish(handler);
                Ok(())
            }
            ParseState::Idle => Ok(()),
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "HTTP connection closed",
            )),
        }
    }

    fn finish<H: H1ResponseHandler>(&mut self, handler: &mut H) {
        handler.end_body();
        handler.complete();
        self.state = ParseState::Idle;
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        status: Option<(u16, Option<String>)>,
        headers: Vec<(String, String)>,
        trailers: Vec<(String, String)>,
        body: Vec<u8>,
        completed: bool,
    }

    impl H1ResponseHandler for Recorder {
        fn status(&mut self, code: u16, reason: Option<&str>) {
            self.status = Some((code, reason.map(str::to_string)));
        }
        fn header(&mut self, name: &str, value: &str) {
            self.headers.push((name.into(), value.into()));
        }
        fn start_body(&mut self) {}
        fn body_chunk(&mut self, data: &[u8]) {
            self.body.extend_from_slice(data);
        }
        fn end_body(&mut self) {}
        fn trailer(&mut self, name: &str, value: &str) {
            self.trailers.push((name.into(), value.into()));
        }
        fn complete(&mut self) {
            self.completed = true;
        }
    }

    #[test]
    fn content_length_body_in_one_buffer() {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf =
            BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nX-A: b\r\n\r\nhello"[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        assert_eq!(parser.state(), ParseState::HeadersComplete);
        parser.set_body_mode(Some(5), false, &mut rec);
        parser.receive(&mut buf, &mut rec).unwrap();
        assert_eq!(parser.state(), ParseState::Idle);
        assert_eq!(rec.status, Some((200, Some("OK".to_string()))));
        assert_eq!(rec.headers.len(), 2);
        assert_eq!(rec.body, b"hello");
        assert!(rec.completed);
    }

    #[test]
    fn chunked_body_split_across_reads() {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(
            &b"HTTP/1.1 404 Not Found\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nNo"[..],
        );
        parser.receive(&mut buf, &mut rec).unwrap();
        parser.set_body_mode(None, true, &mut rec);
        parser.receive(&mut buf, &mut rec).unwrap();
        buf.extend_from_slice(b"pe\r\n0\r\nX-T: 1\r\n\r\n");
        parser.receive(&mut buf, &mut rec).unwrap();
        assert_eq!(rec.status.as_ref().map(|s| s.0), Some(404));
        assert_eq!(rec.body, b"Nope");
        assert_eq!(rec.trailers, vec![("X-T".to_string(), "1".to_string())]);
        assert_eq!(parser.state(), ParseState::Idle);
    }

    #[test]
    fn body_until_close_ends_at_eof() {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"HTTP/1.0 200 OK\r\n\r\npartial"[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        parser.set_body_mode(None, false, &mut rec);
        parser.receive(&mut buf, &mut rec).unwrap();
        assert!(!rec.completed);
        parser.eof(&mut rec).unwrap();
        assert!(rec.completed);
        assert_eq!(rec.body, b"partial");
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc"[..]);
        parser.receive(&mut buf, &mut rec).unwrap();
        parser.set_body_mode(Some(10), false, &mut rec);
        parser.receive(&mut buf, &mut rec).unwrap();
        let err = parser.eof(&mut rec).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn garbage_status_line_is_rejected() {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf = BytesMut::from(&b"SSH-2.0-OpenSSH\r\n"[..]);
        assert!(parser.receive(&mut buf, &mut rec).is_err());
    }
}
