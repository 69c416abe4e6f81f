//! Best-effort text relay to a paired focusbeat instance.

use focusbeat_ipc::{request, Command, Response};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub trait CompanionChannel {
    /// Fire and forget. Failures are logged, never retried.
    fn send(&self, text: &str);
}

/// Sends `Command::Relay` to a peer's control socket.
pub struct SocketCompanion {
    peer: Option<PathBuf>,
    handle: Option<Handle>,
}

impl SocketCompanion {
    pub fn new(peer: Option<PathBuf>, handle: Handle) -> Self {
        Self {
            peer,
            handle: Some(handle),
        }
    }

    #[cfg(test)]
    fn disconnected() -> Self {
        Self {
            peer: None,
            handle: None,
        }
    }

    #[cfg(test)]
    fn is_paired(&self) -> bool {
        self.peer.is_some() && self.handle.is_some()
    }
}

impl CompanionChannel for SocketCompanion {
    fn send(&self, text: &str) {
        let (Some(peer), Some(handle)) = (&self.peer, &self.handle) else {
            debug!("no companion paired, dropping message");
            return;
        };
        let peer = peer.clone();
        let command = Command::Relay {
            text: text.to_string(),
        };
        handle.spawn(async move {
            match request(&peer, &command).await {
                Ok(Response::Ok) => debug!("companion message delivered"),
                Ok(other) => warn!("Companion rejected message: {:?}", other),
                Err(e) => warn!("Companion send failed: {}", e),
            }
        });
    }
}
