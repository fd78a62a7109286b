use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

use picker::catalog::EmojiDb;
use picker::channel::{ChannelError, CommandServer};
use picker::config::{self, PickerConfig};
use picker::format::{parse_format, OutputFormat};
use picker::runtime::{self, RuntimeOptions};
use picker::session::{PickerSession, SessionOptions};
use picker::{net, paths};
use utils::Command;

#[derive(Parser)]
#[command(name = "picker", version, about = "Keyboard-driven emoji picker")]
struct Cli {
    /// Output format: utf-8 or cp (hex codepoints).
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Serve wake-up requests under this name; hide instead of exiting after a pick.
    #[arg(short = 's', long)]
    server_name: Option<String>,

    /// External command to run with the picked emoji as its last argument.
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Prefix for each codepoint in cp format (e.g. U+).
    #[arg(short = 'p', long)]
    cp_prefix: Option<String>,

    /// Do not output a trailing newline.
    #[arg(short = 'n', long)]
    no_newline: bool,

    /// Emoji data file (JSON).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Config file (default: ~/.config/emoji-picker/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

struct Settings {
    session: SessionOptions,
    server_name: Option<String>,
    data_file: PathBuf,
    command_delay: Duration,
}

// Flags win over the config file.
fn resolve(cli: Cli, cfg: PickerConfig) -> anyhow::Result<Settings> {
    let format = parse_format(cli.format.as_deref().unwrap_or(&cfg.format))?;
    let command = cli.command.or(cfg.command).filter(|c| !c.trim().is_empty());
    let server_name = cli.server_name.or(cfg.server_name);
    Ok(Settings {
        session: SessionOptions {
            output: OutputFormat {
                format,
                codepoint_prefix: cli.cp_prefix.unwrap_or(cfg.codepoint_prefix),
                newline: cfg.newline && !cli.no_newline,
            },
            command,
            persistent: server_name.is_some(),
            columns: cfg.columns,
            page_rows: cfg.page_rows,
        },
        server_name,
        data_file: cli
            .data
            .or(cfg.data_file)
            .unwrap_or_else(paths::default_data_file),
        command_delay: Duration::from_millis(cfg.command_delay_ms),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Enable logging when the user sets RUST_LOG (kept quiet by default).
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let settings = resolve(cli, config::load_or_default(&config_path))?;

    let db = EmojiDb::load(&settings.data_file)?.with_recent_store(paths::recent_path());
    if db.is_empty() {
        log::warn!("picker: no emojis in {}", settings.data_file.display());
    } else {
        log::info!("picker: loaded {} emojis", db.len());
    }

    let server = match settings.server_name.as_deref() {
        Some(name) => {
            let path = paths::socket_path(name);
            match CommandServer::listen(&path).await {
                Ok(s) => Some(s),
                Err(ChannelError::AddressInUse { stream, .. }) => {
                    // Already running: wake it and relay its answer.
                    log::info!("picker: instance running on {}, waking it", path.display());
                    let reply = net::request_on(stream, Command::Wake)
                        .await
                        .context("wake running instance")?;
                    let mut out = tokio::io::stdout();
                    out.write_all(&reply).await.context("write stdout")?;
                    out.flush().await.context("flush stdout")?;
                    return Ok(());
                }
                Err(e) => return Err(e).context("listen"),
            }
        }
        None => None,
    };

    let session = PickerSession::new(db, settings.session);
    let code = runtime::run(
        session,
        server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        RuntimeOptions {
            command_delay: settings.command_delay,
        },
    )
    .await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
