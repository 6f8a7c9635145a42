/*
 * mod.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Local HTTP/1.1 server for the integration tests. Serves a handful of fixed routes on
 * 127.0.0.1 and reports connection events so tests can observe cancellation.
 */

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

pub const UUID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

/// Something the server saw on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Request head received for this path.
    Request(String),
    /// Client closed a `/stall` connection.
    StallClosed,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub events: mpsc::UnboundedReceiver<Event>,
}

impl MockServer {
    /// Bind to an ephemeral loopback port and serve until the runtime shuts down.
    pub async fn start() -> MockServer {
        Self::start_on("127.0.0.1:0").await.unwrap()
    }

    /// Serve on the given address, e.g. `[::1]:0`. Fails if the address cannot be bound.
    pub async fn start_on(bind: &str) -> std::io::Result<MockServer> {
        let listener = TcpListener::bind(bind).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => return,
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let _ = handle(socket, tx).await;
                });
            }
        });
        Ok(MockServer { addr, events: rx })
    }

    pub fn base_path(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Next event, failing the test if none arrives within five seconds.
    pub async fn next_event(&mut self) -> Event {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("no server event within 5s")
            .expect("server stopped")
    }
}

/// Address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn handle(
    mut socket: TcpStream,
    events: mpsc::UnboundedSender<Event>,
) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut tmp = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&tmp[..n]);
    }
    let head = String::from_utf8_lossy(&head).into_owned();
    let mut request_line = head.split_whitespace();
    let method = request_line.next().unwrap_or("GET").to_string();
    let target = request_line.next().unwrap_or("/").to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();
    let _ = events.send(Event::Request(path.clone()));

    match path.as_str() {
        "/uuid" => {
            let body = format!("{{\"uuid\": \"{}\"}}", UUID);
            respond(&mut socket, "200 OK", "application/json", body.as_bytes()).await
        }
        "/ip" => {
            let body = br#"{"origin": "127.0.0.1"}"#;
            respond(&mut socket, "200 OK", "application/json", body).await
        }
        "/latin1" => {
            let content_type = "text/plain; charset=ISO-8859-1";
            respond(&mut socket, "200 OK", content_type, &[0x63, 0x61, 0x66, 0xe9]).await
        }
        // Request head echoed back, for checking base headers and parameters.
        "/anything" => respond(&mut socket, "200 OK", "text/plain", head.as_bytes()).await,
        "/chunked" => {
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
                      Transfer-Encoding: chunked\r\n\r\n\
                      5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n",
                )
                .await
        }
        "/until-close" => {
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
                      Connection: close\r\n\r\nstreamed",
                )
                .await?;
            socket.shutdown().await
        }
        "/empty" => socket.write_all(b"HTTP/1.1 204 No Content\r\n\r\n").await,
        // HEAD gets the GET headers and no body; the connection stays open until the client closes.
        "/sized" if method == "HEAD" => {
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
                      Content-Length: 42\r\n\r\n",
                )
                .await?;
            while socket.read(&mut tmp).await? > 0 {}
            Ok(())
        }
        "/sized" => respond(&mut socket, "200 OK", "text/plain", &[b'x'; 42]).await,
        // Interim responses ahead of the final one, all in one write.
        "/interim" => {
            socket
                .write_all(
                    b"HTTP/1.1 100 Continue\r\n\r\n\
                      HTTP/1.1 103 Early Hints\r\nLink: </style.css>; rel=preload\r\n\r\n\
                      HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nfinal",
                )
                .await
        }
        "/stall" => {
            while socket.read(&mut tmp).await? > 0 {}
            let _ = events.send(Event::StallClosed);
            Ok(())
        }
        _ => respond(&mut socket, "404 NOT FOUND", "text/html", b"<h1>Not Found</h1>").await,
    }
}

async fn respond(
    socket: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    socket.write_all(head.as_bytes()).await?;
    socket.write_all(body).await?;
    socket.flush().await
}
