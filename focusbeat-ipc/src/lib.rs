//! Inter-process communication between focusbeat, focusbeatctl and companion peers
//!
//! We use Unix domain sockets for local IPC. Every message is a single line of
//! JSON: the client writes one `Command`, the server answers with one `Response`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Which kind of interval a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Focus,
    Break,
}

impl SessionMode {
    pub fn opposite(self) -> Self {
        match self {
            SessionMode::Focus => SessionMode::Break,
            SessionMode::Break => SessionMode::Focus,
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Focus => f.write_str("FOCUS"),
            SessionMode::Break => f.write_str("BREAK"),
        }
    }
}

/// Commands that focusbeatctl (or a companion peer) can send to focusbeat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start when idle, pause when running. Mirrors the single start/pause button.
    Toggle,
    Start,
    Pause,
    Reset,
    Skip,
    Status,
    SetDurations {
        focus_minutes: Option<u32>,
        break_minutes: Option<u32>,
    },
    RestoreDefaults,
    /// Free-form text from a paired device.
    Relay { text: String },
}

/// Responses from focusbeat back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(SessionStatus),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub mode: SessionMode,
    pub running: bool,
    pub remaining_secs: u32, // seconds
    pub focus_secs: u32,
    pub break_secs: u32,
    pub companion_message: Option<String>,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused - is focusbeat running?")]
    ConnectionRefused,

    #[error("Connection closed before a reply was received")]
    Closed,
}

pub const SOCKET_PATH: &str = "/tmp/focusbeat.sock";

/// Write `msg` as one JSON line.
pub async fn write_line<W, T>(writer: &mut W, msg: &T) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut buf = serde_json::to_vec(msg)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one JSON line. Returns `None` on a clean end of stream.
pub async fn read_line<R, T>(reader: &mut R) -> Result<Option<T>, IpcError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

/// Connect to the socket at `path`, send `command` and wait for the reply.
pub async fn request(path: impl AsRef<Path>, command: &Command) -> Result<Response, IpcError> {
    let stream = UnixStream::connect(path.as_ref())
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused | ErrorKind::NotFound => IpcError::ConnectionRefused,
            _ => IpcError::Io(e),
        })?;
    let (reader, mut writer) = stream.into_split();
    write_line(&mut writer, command).await?;

    let mut reader = BufReader::new(reader);
    read_line(&mut reader).await?.ok_or(IpcError::Closed)
}
