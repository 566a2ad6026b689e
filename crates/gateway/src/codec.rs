//! Wire codec for the terminal's Lua bridge
//!
//! One JSON document per line. The bridge speaks Windows-1251, so every line
//! is transcoded at the connection boundary; everything above this module
//! sees UTF-8.
//!
//! ```text
//! request : {"id":1,"cmd":"isConnected","t":1700000000000000,"data":""}\r\n
//! response: {"id":1,"cmd":"isConnected","t":1700000000000.5,"data":1}\n
//! event   : {"cmd":"NewCandle","t":1700000000000.5,"data":{...}}\n
//! ```

use encoding_rs::WINDOWS_1251;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::GatewayError;

/// Command sent on the command connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: i64,
    pub cmd: String,
    /// Creation time, microseconds since the Unix epoch
    pub t: i64,
    pub data: Value,
}

impl RequestEnvelope {
    pub fn new(id: i64, cmd: impl Into<String>, data: Value) -> Self {
        Self {
            id,
            cmd: cmd.into(),
            t: chrono::Utc::now().timestamp_micros(),
            data,
        }
    }
}

/// Answer to a `RequestEnvelope`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub t: f64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lua_error: Option<String>,
}

impl ResponseEnvelope {
    /// Terminal-side error, if any (an empty string means none)
    pub fn error(&self) -> Option<&str> {
        non_empty(&self.lua_error)
    }

    /// Payload, treating JSON `null` as absent
    pub fn into_data(self) -> Option<Value> {
        self.data.filter(|data| !data.is_null())
    }
}

/// Event pushed on the event connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackEnvelope {
    pub cmd: String,
    #[serde(default)]
    pub t: f64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lua_error: Option<String>,
}

impl CallbackEnvelope {
    pub fn error(&self) -> Option<&str> {
        non_empty(&self.lua_error)
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Reads `\n`-terminated Windows-1251 lines and yields UTF-8 text
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::with_capacity(4096),
        }
    }

    /// Next line without its terminator.
    ///
    /// EOF before any byte is `Closed`; EOF in the middle of a line is
    /// `Truncated`.
    pub async fn read_line(&mut self) -> Result<String, GatewayError> {
        self.buf.clear();
        let n = self.inner.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Err(GatewayError::Closed);
        }
        let (text, _, _) = WINDOWS_1251.decode(&self.buf);
        if !self.buf.ends_with(b"\n") {
            return Err(GatewayError::Truncated(text.into_owned()));
        }
        Ok(text.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Next line decoded as JSON
    pub async fn read_json<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, GatewayError> {
        let line = self.read_line().await?;
        Ok(serde_json::from_str(&line)?)
    }
}

/// Writes UTF-8 text as Windows-1251 lines terminated by `\r\n`
pub struct LineWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn write_line(&mut self, line: &str) -> Result<(), GatewayError> {
        let (bytes, _, _) = WINDOWS_1251.encode(line);
        self.inner.write_all(&bytes).await?;
        self.inner.write_all(b"\r\n").await?;
        self.inner.flush().await?;
        Ok(())
    }

    pub async fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), GatewayError> {
        let line = serde_json::to_string(value)?;
        self.write_line(&line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, duplex};

    #[tokio::test]
    async fn test_request_line_ends_with_crlf() {
        let (client, mut server) = duplex(1024);
        let mut writer = LineWriter::new(client);
        writer
            .write_json(&RequestEnvelope::new(1, "isConnected", json!("")))
            .await
            .unwrap();
        drop(writer);

        let mut raw = Vec::new();
        server.read_to_end(&mut raw).await.unwrap();
        assert!(raw.ends_with(b"\r\n"));
        let request: RequestEnvelope = serde_json::from_slice(&raw[..raw.len() - 2]).unwrap();
        assert_eq!(request.id, 1);
        assert_eq!(request.cmd, "isConnected");
    }

    #[tokio::test]
    async fn test_cyrillic_is_windows_1251_on_the_wire() {
        let (client, server) = duplex(1024);
        let mut writer = LineWriter::new(client);
        writer.write_line("Привет").await.unwrap();
        drop(writer);

        let mut raw = Vec::new();
        let mut server = server;
        server.read_to_end(&mut raw).await.unwrap();
        // "П" is 0xCF in Windows-1251 and a single byte
        assert_eq!(raw[0], 0xCF);
        assert_eq!(raw.len(), "Привет".chars().count() + 2);

        let mut reader = LineReader::new(&raw[..]);
        assert_eq!(reader.read_line().await.unwrap(), "Привет");
    }

    #[tokio::test]
    async fn test_reader_distinguishes_eof_and_truncation() {
        let mut reader = LineReader::new(&b"{\"cmd\":\"OnConnected\"}\n{\"cmd\""[..]);
        let event: CallbackEnvelope = reader.read_json().await.unwrap();
        assert_eq!(event.cmd, "OnConnected");
        assert!(matches!(reader.read_line().await, Err(GatewayError::Truncated(_))));
        assert!(matches!(reader.read_line().await, Err(GatewayError::Closed)));
    }

    #[test]
    fn test_empty_lua_error_is_no_error() {
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"id":3,"cmd":"message","t":1.0,"data":null,"lua_error":""}"#)
                .unwrap();
        assert_eq!(response.error(), None);
        assert_eq!(response.into_data(), None);

        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"id":4,"cmd":"x","lua_error":"not connected"}"#).unwrap();
        assert_eq!(response.error(), Some("not connected"));
    }
}
