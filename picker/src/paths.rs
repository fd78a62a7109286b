use std::path::{Path, PathBuf};

use crate::consts::{APP_DIR_NAME, CONFIG_FILE_NAME, DATA_FILE_NAME, RECENT_FILE_NAME, SOCKET_SUFFIX};

/// Socket directory: `$XDG_RUNTIME_DIR/emoji-picker`, or a per-user dir
/// under `/tmp` when there is no runtime dir.
pub fn default_runtime_dir() -> PathBuf {
    match dirs::runtime_dir() {
        Some(d) => d.join(APP_DIR_NAME),
        None => {
            let uid = unsafe { libc::geteuid() };
            std::env::temp_dir().join(format!("{APP_DIR_NAME}-{uid}"))
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
    base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

pub fn default_data_file() -> PathBuf {
    default_data_dir().join(DATA_FILE_NAME)
}

pub fn recent_path() -> PathBuf {
    default_data_dir().join(RECENT_FILE_NAME)
}

/// Resolve a server name to its socket path.
///
/// Bare names live in the runtime dir; anything containing a `/` is taken
/// as a path as-is.
pub fn socket_path(name: &str) -> PathBuf {
    socket_path_in(&default_runtime_dir(), name)
}

pub fn socket_path_in(runtime_dir: &Path, name: &str) -> PathBuf {
    if name.contains('/') {
        return PathBuf::from(name);
    }
    runtime_dir.join(format!("{}{}", safe_for_filename(name), SOCKET_SUFFIX))
}

/// Server names become file names: anything outside `[A-Za-z0-9._-]` is `_`.
pub fn safe_for_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
