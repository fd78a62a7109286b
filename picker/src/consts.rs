pub const APP_DIR_NAME: &str = "emoji-picker";

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const RECENT_FILE_NAME: &str = "recent.json";
pub const DATA_FILE_NAME: &str = "emojis.json";

// Socket files live under the runtime dir as `<name>.sock`.
pub const SOCKET_SUFFIX: &str = ".sock";

pub const RECENT_CATEGORY: &str = "Recent";
pub const MAX_RECENT: usize = 30;

// 0: every group is one row; a positive width wraps groups into a grid.
pub const DEFAULT_COLUMNS: usize = 0;
pub const DEFAULT_PAGE_ROWS: usize = 10;
pub const DEFAULT_COMMAND_DELAY_MS: u64 = 20;
