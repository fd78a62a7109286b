use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::catalog::CandidateIndex;
use crate::channel::{CommandServer, ServerEvent};
use crate::frontend;
use crate::runner;
use crate::session::{Action, Event, PickerSession};

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Minimum delay between accept and running the external command.
    pub command_delay: Duration,
}

/// Drive `session` until it asks to exit; returns the process exit code.
///
/// Everything runs on one task: channel I/O, `input` lines and action
/// execution. Picked text goes to `output`. External commands are the only
/// spawned work.
pub async fn run<I, R, W>(
    mut session: PickerSession<I>,
    mut server: Option<CommandServer>,
    input: R,
    mut output: W,
    opts: RuntimeOptions,
) -> anyhow::Result<i32>
where
    I: CandidateIndex,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut stdin_open = true;
    let mut pending: Vec<JoinHandle<()>> = Vec::new();

    if session.is_persistent() {
        log::info!("picker: waiting hidden for wake-up");
    } else {
        eprintln!("{}", frontend::status_line(&session));
    }

    loop {
        let ev = tokio::select! {
            ev = next_server_event(&mut server) => match ev {
                ServerEvent::Command(cmd) => Event::Remote(cmd),
                ServerEvent::PeerGone => Event::PeerGone,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(l)) => match frontend::parse_line(&l) {
                    Ok(Some(ev)) => ev,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                },
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    if session.is_persistent() {
                        log::debug!("picker: input closed, serving channel only");
                        continue;
                    }
                    Event::Cancel
                }
            },
        };

        let redraw = matches!(ev, Event::QueryChanged(_) | Event::Key(_));
        for action in session.handle(ev) {
            match action {
                Action::Show => {
                    log::info!("picker: shown");
                    eprintln!("{}", frontend::status_line(&session));
                }
                Action::Hide => log::info!("picker: hidden"),
                Action::Print(text) => {
                    output.write_all(text.as_bytes()).await.context("write output")?;
                    output.flush().await.context("flush output")?;
                }
                Action::Reply(text) => match server.as_mut() {
                    Some(s) => {
                        if let Err(e) = s.send_reply(text.as_bytes()).await {
                            log::debug!("picker: reply not delivered: {e}");
                        }
                    }
                    None => log::debug!("picker: no channel to reply on"),
                },
                Action::Run { command, argument } => {
                    pending.retain(|h| !h.is_finished());
                    pending.push(runner::spawn_command(command, argument, opts.command_delay));
                }
                Action::Exit(code) => {
                    for h in pending.drain(..) {
                        let _ = h.await;
                    }
                    return Ok(code);
                }
            }
        }
        if redraw {
            eprintln!("{}", frontend::status_line(&session));
        }
    }
}

async fn next_server_event(server: &mut Option<CommandServer>) -> ServerEvent {
    match server {
        Some(s) => s.next_event().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_db;
    use crate::catalog::EmojiDb;
    use crate::net;
    use crate::session::SessionOptions;
    use tokio::io::{duplex, BufReader};
    use utils::Command;

    const WAIT: Duration = Duration::from_secs(5);
    const SETTLE: Duration = Duration::from_millis(100);

    fn opts() -> RuntimeOptions {
        RuntimeOptions {
            command_delay: Duration::ZERO,
        }
    }

    fn session(persistent: bool, command: Option<String>) -> PickerSession<EmojiDb> {
        PickerSession::new(
            sample_db(),
            SessionOptions {
                persistent,
                command,
                ..SessionOptions::default()
            },
        )
    }

    async fn bounded<F: std::future::Future>(f: F) -> F::Output {
        tokio::time::timeout(WAIT, f).await.expect("finished in time")
    }

    #[tokio::test]
    async fn standalone_accept_prints_and_exits_zero() {
        let mut out = Vec::<u8>::new();
        let code = bounded(run(
            session(false, None),
            None,
            &b"query crying\nenter\n"[..],
            &mut out,
            opts(),
        ))
        .await
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(out, "😢".as_bytes());
    }

    #[tokio::test]
    async fn standalone_input_eof_cancels_with_one() {
        let mut out = Vec::<u8>::new();
        let code = bounded(run(session(false, None), None, &b"right\n"[..], &mut out, opts()))
            .await
            .unwrap();
        assert_eq!(code, 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn woken_client_receives_the_pick_and_quit_gets_an_empty_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let server = CommandServer::listen(&path).await.unwrap();
        let (mut keys, keys_rx) = duplex(256);
        let mut out = Vec::<u8>::new();

        let driver = async {
            let waiting = tokio::spawn({
                let path = path.clone();
                async move { net::request(&path, Command::Wake).await }
            });
            tokio::time::sleep(SETTLE).await;
            keys.write_all(b"query thumbs\nf2\n").await.unwrap();
            let picked = waiting.await.unwrap().unwrap();

            let quit = net::request(&path, Command::Quit).await.unwrap();
            (picked, quit)
        };

        let (code, (picked, quit)) = bounded(async {
            tokio::join!(
                run(session(true, None), Some(server), BufReader::new(keys_rx), &mut out, opts()),
                driver
            )
        })
        .await;

        assert_eq!(code.unwrap(), 0);
        assert_eq!(picked, "\u{1F44D}\u{1F3FC}".as_bytes());
        assert!(quit.is_empty());
        assert!(out.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn persistent_instance_outlives_input_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let server = CommandServer::listen(&path).await.unwrap();
        let mut out = Vec::<u8>::new();

        let driver = async {
            tokio::time::sleep(SETTLE).await;
            net::request(&path, Command::Quit).await.unwrap()
        };

        let (code, quit) = bounded(async {
            tokio::join!(
                run(session(true, None), Some(server), &b""[..], &mut out, opts()),
                driver
            )
        })
        .await;
        assert_eq!(code.unwrap(), 0);
        assert!(quit.is_empty());
    }

    #[tokio::test]
    async fn pending_command_finishes_before_exit() {
        let dir = tempfile::tempdir().unwrap();
        let picked = dir.path().join("picked.txt");
        let command = format!("sh -c 'sleep 0.2; printf %s \"$0\" > {}'", picked.display());
        let mut out = Vec::<u8>::new();

        let code = bounded(run(
            session(false, Some(command)),
            None,
            &b"query crying\nenter\n"[..],
            &mut out,
            RuntimeOptions {
                command_delay: Duration::from_millis(20),
            },
        ))
        .await
        .unwrap();

        assert_eq!(code, 0);
        assert!(out.is_empty());
        assert_eq!(std::fs::read_to_string(&picked).unwrap(), "😢");
    }
}
