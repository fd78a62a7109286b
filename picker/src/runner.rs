use std::time::Duration;
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Split `command` into program and arguments (shell quoting rules) and
/// append `argument` last.
pub fn build_argv(command: &str, argument: &str) -> Option<Vec<String>> {
    let mut argv = match shell_words::split(command) {
        Ok(parts) if !parts.is_empty() => parts,
        Ok(_) => return None,
        Err(e) => {
            log::warn!("runner: cannot parse command {:?}: {e}", command);
            return None;
        }
    };
    argv.push(argument.to_string());
    Some(argv)
}

/// Run the external command after `delay`, on its own task.
///
/// Fire-and-forget: failures are logged, never surfaced. The handle only
/// lets the caller wait for completion before exiting.
pub fn spawn_command(command: String, argument: String, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let Some(argv) = build_argv(&command, &argument) else {
            log::warn!("runner: nothing to run for {:?}", command);
            return;
        };
        log::debug!("runner: exec {:?}", argv);
        match Command::new(&argv[0]).args(&argv[1..]).status().await {
            Ok(st) if st.success() => {}
            Ok(st) => log::warn!("runner: {} exited with {st}", argv[0]),
            Err(e) => log::warn!("runner: {} failed to start: {e:?}", argv[0]),
        }
    })
}
