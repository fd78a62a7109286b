use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

use utils::{Command, InboundBuffer};

#[derive(Debug, Error)]
pub enum ChannelError {
    /// Another instance is listening under this name. `stream` is the open
    /// connection to it, ready to carry a command.
    #[error("another instance is already listening on {}", .path.display())]
    AddressInUse { path: PathBuf, stream: UnixStream },

    /// Nobody is listening under this name.
    #[error("no instance listening on {}", .path.display())]
    ConnectFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The peer is gone (or there never was one).
    #[error("peer disconnected")]
    Disconnected,

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    Command(Command),
    /// The active peer hung up; any partial command was dropped.
    PeerGone,
}

struct Peer {
    stream: UnixStream,
    inbound: InboundBuffer,
}

enum Step {
    Accepted(io::Result<UnixStream>),
    Read(io::Result<usize>),
}

/// Server side of the wake-up channel.
///
/// Holds at most one peer. A connection arriving while a peer is active is
/// closed without being read.
pub struct CommandServer {
    listener: UnixListener,
    path: PathBuf,
    peer: Option<Peer>,
}

impl CommandServer {
    /// Bind `path`, failing with [`ChannelError::AddressInUse`] when a live
    /// instance already owns it. A stale socket file is replaced.
    ///
    /// The connection used to detect the live instance is handed back in the
    /// error; the running server has already admitted it as its peer.
    pub async fn listen(path: &Path) -> Result<Self, ChannelError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let listener = match UnixListener::bind(path) {
            Ok(l) => l,
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                if let Ok(stream) = UnixStream::connect(path).await {
                    return Err(ChannelError::AddressInUse {
                        path: path.to_path_buf(),
                        stream,
                    });
                }
                log::info!("server: removing stale socket {}", path.display());
                tokio::fs::remove_file(path).await?;
                UnixListener::bind(path)?
            }
            Err(e) => return Err(e.into()),
        };
        log::info!("server: listening on {}", path.display());
        Ok(Self {
            listener,
            path: path.to_path_buf(),
            peer: None,
        })
    }

    pub fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    /// Wait for the next recognized command or peer departure.
    ///
    /// Cancel-safe: dropping the future loses no received bytes.
    pub async fn next_event(&mut self) -> ServerEvent {
        loop {
            let mut chunk = [0u8; 64];
            let step = tokio::select! {
                res = self.listener.accept() => Step::Accepted(res.map(|(s, _)| s)),
                res = read_peer(&mut self.peer, &mut chunk) => Step::Read(res),
            };

            match step {
                Step::Accepted(Ok(stream)) => self.admit(stream),
                Step::Accepted(Err(e)) => log::warn!("server: accept failed: {e:?}"),
                Step::Read(Ok(0)) | Step::Read(Err(_)) => {
                    if let Some(peer) = self.peer.take() {
                        if !peer.inbound.is_empty() {
                            log::debug!(
                                "server: peer left mid-command, dropping {} bytes",
                                peer.inbound.len()
                            );
                        }
                    }
                    return ServerEvent::PeerGone;
                }
                Step::Read(Ok(n)) => {
                    let Some(peer) = self.peer.as_mut() else {
                        continue;
                    };
                    if let Some(cmd) = peer.inbound.feed(&chunk[..n]) {
                        log::debug!("server: command={:?}", cmd);
                        return ServerEvent::Command(cmd);
                    }
                }
            }
        }
    }

    fn admit(&mut self, stream: UnixStream) {
        if self.peer.is_some() {
            log::debug!("server: refused second peer");
            drop(stream);
            return;
        }
        log::debug!("server: peer connected");
        self.peer = Some(Peer {
            stream,
            inbound: InboundBuffer::new(),
        });
    }

    /// Write `bytes` to the active peer and close the connection.
    pub async fn send_reply(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        let Some(mut peer) = self.peer.take() else {
            return Err(ChannelError::Disconnected);
        };
        log::debug!("server: reply bytes={}", bytes.len());
        peer.stream.write_all(bytes).await?;
        peer.stream.shutdown().await?;
        Ok(())
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn read_peer(peer: &mut Option<Peer>, buf: &mut [u8]) -> io::Result<usize> {
    match peer {
        Some(p) => p.stream.read(buf).await,
        None => std::future::pending().await,
    }
}
