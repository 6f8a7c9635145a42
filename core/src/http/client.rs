/*
 * client.rs
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

//! HTTP client: connect to a host, then use the connection to send requests with a callback
//! handler.

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::http::connection::{HttpConnection, HttpStream};
use crate::net::http_client_config;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client. Create a connection with `HttpClient::connect(host, port, use_tls)`, then send
/// requests on it with a handler.
pub struct HttpClient;

impl HttpClient {
    /// Connect with the default connect timeout.
    pub async fn connect(host: &str, port: u16, use_tls: bool) -> io::Result<HttpConnection> {
        Self::connect_with_timeout(host, port, use_tls, CONNECT_TIMEOUT).await
    }

    /// Connect to the given host and port. If `use_tls` is true, performs the TLS handshake
    /// (ALPN http/1.1). The whole TCP + TLS setup must finish within `connect_timeout`.
    pub async fn connect_with_timeout(
        host: &str,
        port: u16,
        use_tls: bool,
        connect_timeout: Duration,
    ) -> io::Result<HttpConnection> {
        timeout(connect_timeout, Self::open(host, port, use_tls))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "HTTP connect timed out"))?
    }

    async fn open(host: &str, port: u16, use_tls: bool) -> io::Result<HttpConnection> {
        let tcp = TcpStream::connect((host, port)).await?;
        tcp.set_nodelay(true)?;
        debug!(host, port, tls = use_tls, "connected");

        if !use_tls {
            return Ok(HttpConnection::new(
                HttpStream::Plain(tcp),
                host.to_string(),
                port,
                false,
            ));
        }

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
        let connector = TlsConnector::from(http_client_config());
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
        Ok(HttpConnection::new(
            HttpStream::Tls(Box::new(tls)),
            host.to_string(),
            port,
            true,
        ))
    }
}
