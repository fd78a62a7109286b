use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use utils::Command;

use crate::channel::ChannelError;

pub async fn connect(path: &Path) -> Result<UnixStream, ChannelError> {
    log::debug!("connect: target={}", path.display());
    let s = UnixStream::connect(path)
        .await
        .map_err(|source| ChannelError::ConnectFailed {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("connect: ok target={}", path.display());
    Ok(s)
}

/// Fire-and-forget: write the keyword and hang up.
pub async fn send_command(path: &Path, cmd: Command) -> Result<(), ChannelError> {
    let mut stream = connect(path).await?;
    log::debug!("send_command: cmd={:?}", cmd);
    stream.write_all(cmd.keyword()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Write the keyword, then wait for the single reply the server sends before
/// closing. The connection stays open for writing so the server still sees
/// us as its active peer.
pub async fn request(path: &Path, cmd: Command) -> Result<Vec<u8>, ChannelError> {
    request_on(connect(path).await?, cmd).await
}

/// [`request`] over a connection that is already open.
pub async fn request_on(mut stream: UnixStream, cmd: Command) -> Result<Vec<u8>, ChannelError> {
    log::debug!("request: cmd={:?}", cmd);
    stream.write_all(cmd.keyword()).await?;
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await?;
    log::debug!("request: reply bytes={}", reply.len());
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{CommandServer, ServerEvent};

    #[tokio::test]
    async fn missing_listener_is_connect_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nobody.sock");
        let err = send_command(&path, Command::Wake).await.unwrap_err();
        assert!(matches!(err, ChannelError::ConnectFailed { .. }));
    }

    #[tokio::test]
    async fn fire_and_forget_wake_then_peer_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let mut server = CommandServer::listen(&path).await.unwrap();

        send_command(&path, Command::Wake).await.unwrap();
        assert_eq!(
            server.next_event().await,
            ServerEvent::Command(Command::Wake)
        );
        assert_eq!(server.next_event().await, ServerEvent::PeerGone);
    }

    #[tokio::test]
    async fn request_returns_the_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let mut server = CommandServer::listen(&path).await.unwrap();

        let client_path = path.clone();
        let client = tokio::spawn(async move { request(&client_path, Command::Quit).await });

        assert_eq!(
            server.next_event().await,
            ServerEvent::Command(Command::Quit)
        );
        server.send_reply(b"").await.unwrap();
        assert!(client.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_second_launches_all_reach_the_running_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let mut server = CommandServer::listen(&path).await.unwrap();

        let serve = tokio::spawn(async move {
            let mut wakes = 0;
            while wakes < 40 {
                if server.next_event().await == ServerEvent::Command(Command::Wake) {
                    wakes += 1;
                    server.send_reply(b"X").await.unwrap();
                }
            }
            server
        });

        for run in 0..40 {
            let stream = match CommandServer::listen(&path).await {
                Err(ChannelError::AddressInUse { stream, .. }) => stream,
                other => panic!("run {run}: expected AddressInUse, got {:?}", other.err()),
            };
            let reply = request_on(stream, Command::Wake).await.unwrap();
            assert_eq!(reply, b"X", "run {run}");
        }
        let server = serve.await.unwrap();
        drop(server);
        assert!(!path.exists());
    }
}
