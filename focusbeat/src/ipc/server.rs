//! Unix domain socket server for IPC
//!
//! Connections are handled on the runtime, but commands are not executed here:
//! each one is handed to the UI loop, which owns the session machine, and the
//! reply is awaited over a oneshot channel.

use anyhow::{Context, Result};
use focusbeat_ipc::{read_line, write_line, Command, Response};
use std::path::Path;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

#[derive(Debug)]
pub struct ControlRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Response>,
}

pub fn bind(socket_path: &Path) -> Result<UnixListener> {
    // Remove old socket if it exists
    let _ = std::fs::remove_file(socket_path);

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind control socket at {:?}", socket_path))?;
    info!("IPC server listening on {:?}", socket_path);
    Ok(listener)
}

pub async fn serve(listener: UnixListener, requests: mpsc::Sender<ControlRequest>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let requests = requests.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, requests).await {
                        error!("Error handling client: {:#}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, requests: mpsc::Sender<ControlRequest>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let Some(command) = read_line::<_, Command>(&mut reader).await? else {
        return Ok(());
    };
    debug!(?command, "control command received");

    let (reply, response) = oneshot::channel();
    let response = if requests.send(ControlRequest { command, reply }).await.is_err() {
        Response::Error("focusbeat is shutting down".into())
    } else {
        response
            .await
            .unwrap_or_else(|_| Response::Error("command dropped".into()))
    };

    write_line(&mut writer, &response).await?;
    Ok(())
}
