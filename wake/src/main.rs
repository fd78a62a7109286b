use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncWriteExt;

use picker::channel::ChannelError;
use picker::{net, paths};
use utils::Command;

#[derive(Parser)]
#[command(name = "picker-wake", version, about = "Wake up a running picker")]
struct Cli {
    /// Server name the picker was started with (`picker -s NAME`), or a socket path.
    server_name: String,

    /// Quit instead of showing the window.
    #[arg(short = 'q', long)]
    quit: bool,

    /// Wait for the picked emoji and print it.
    #[arg(short = 'w', long)]
    wait: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let cli = Cli::parse();
    let path = paths::socket_path(&cli.server_name);
    let cmd = if cli.quit { Command::Quit } else { Command::Wake };

    let res = if cli.wait {
        match net::request(&path, cmd).await {
            Ok(reply) => {
                let mut out = tokio::io::stdout();
                out.write_all(&reply).await.context("write stdout")?;
                out.flush().await.context("flush stdout")?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    } else {
        net::send_command(&path, cmd).await
    };

    match res {
        Ok(()) => Ok(()),
        Err(ChannelError::ConnectFailed { path, .. }) => {
            eprintln!("picker-wake: no running picker on {}", path.display());
            std::process::exit(1);
        }
        Err(e) => Err(e).context("send command"),
    }
}
