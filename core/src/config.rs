/*
 * config.rs
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

//! Client configuration: base path, timeouts, headers and query parameters added to every request.
//!
//! Built once (in code or from an XML file) before the first request and handed to the executor,
//! which keeps it behind an `Arc`; nothing mutates it while requests are running.
//! All XML read/write uses the quick_xml parser/writer.
//!
//! ```xml
//! <corriere>
//!   <base-path>https://httpbin.org</base-path>
//!   <timeout>30000</timeout>
//!   <timeout-read>30000</timeout-read>
//!   <header name="Accept">application/json</header>
//!   <param name="lang">en</param>
//! </corriere>
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
const DEFAULT_TIMEOUT_READ: Duration = Duration::from_millis(15_000);

/// Error loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_path: Option<String>,
    timeout: Duration,
    timeout_read: Duration,
    base_headers: Vec<(String, String)>,
    base_params: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            timeout: DEFAULT_TIMEOUT,
            timeout_read: DEFAULT_TIMEOUT_READ,
            base_headers: Vec::new(),
            base_params: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for request paths that are not absolute URLs, e.g. `https://httpbin.org`.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) -> &mut Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Connect timeout (TCP + TLS handshake).
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Limit on each individual socket read while waiting for the response.
    pub fn set_timeout_read(&mut self, timeout_read: Duration) -> &mut Self {
        self.timeout_read = timeout_read;
        self
    }

    /// Header sent with every request unless the request sets the same header itself.
    pub fn add_base_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.base_headers.push((name.into(), value.into()));
        self
    }

    /// Query parameter added to every request, before the request's own parameters.
    pub fn add_base_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.base_params.push((name.into(), value.into()));
        self
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_read(&self) -> Duration {
        self.timeout_read
    }

    pub fn base_headers(&self) -> &[(String, String)] {
        &self.base_headers
    }

    pub fn base_params(&self) -> &[(String, String)] {
        &self.base_params
    }

    /// Load configuration from an XML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration XML. Unknown elements are ignored; missing ones keep their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut config = ClientConfig::default();
        let mut element_name = Vec::<u8>::new();
        let mut attr_name: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Start(e) => {
                    let name = e.name();
                    let name = name.as_ref();
                    element_name.clear();
                    attr_name = None;
                    if matches!(name, b"header" | b"param") {
                        let attr = e.try_get_attribute("name").map_err(invalid)?.ok_or_else(|| {
                            ConfigError::Invalid(format!(
                                "<{}> without name attribute",
                                String::from_utf8_lossy(name)
                            ))
                        })?;
                        attr_name = Some(attr.unescape_value().map_err(invalid)?.into_owned());
                    }
                    element_name.extend_from_slice(name);
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(invalid)?.trim().to_string();
                    match element_name.as_slice() {
                        b"base-path" => {
                            config.set_base_path(text);
                        }
                        b"timeout" => {
                            config.set_timeout(parse_millis("timeout", &text)?);
                        }
                        b"timeout-read" => {
                            config.set_timeout_read(parse_millis("timeout-read", &text)?);
                        }
                        b"header" => {
                            if let Some(name) = attr_name.take() {
                                config.add_base_header(name, text);
                            }
                        }
                        b"param" => {
                            if let Some(name) = attr_name.take() {
                                config.add_base_param(name, text);
                            }
                        }
                        _ => {}
                    }
                    element_name.clear();
                }
                Event::End(_) => {
                    // <param name="x"></param> carries an empty value
                    if let Some(name) = attr_name.take() {
                        match element_name.as_slice() {
                            b"header" => {
                                config.add_base_header(name, "");
                            }
                            b"param" => {
                                config.add_base_param(name, "");
                            }
                            _ => {}
                        }
                    }
                    element_name.clear();
                }
                _ => {}
            }
            buf.clear();
        }
        Ok(config)
    }

    /// Serialize to the XML format read by `parse`.
    pub fn to_xml(&self) -> Result<String, ConfigError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("corriere")))?;
        if let Some(base_path) = &self.base_path {
            write_text_element(&mut writer, BytesStart::new("base-path"), base_path)?;
        }
        write_text_element(
            &mut writer,
            BytesStart::new("timeout"),
            &self.timeout.as_millis().to_string(),
        )?;
        write_text_element(
            &mut writer,
            BytesStart::new("timeout-read"),
            &self.timeout_read.as_millis().to_string(),
        )?;
        for (tag, entries) in [("header", &self.base_headers), ("param", &self.base_params)] {
            for (name, value) in entries {
                let mut start = BytesStart::new(tag);
                start.push_attribute(("name", name.as_str()));
                write_text_element(&mut writer, start, value)?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new("corriere")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Write the configuration to an XML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), ConfigError> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn invalid(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid(e.to_string())
}

fn parse_millis(element: &str, text: &str) -> Result<Duration, ConfigError> {
    text.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            ConfigError::Invalid(format!("<{}> must be milliseconds, got {:?}", element, text))
        })
}
