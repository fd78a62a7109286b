use anyhow::Context;

use std::path::{Path, PathBuf};

use crate::consts::{DEFAULT_COLUMNS, DEFAULT_COMMAND_DELAY_MS, DEFAULT_PAGE_ROWS};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// `utf-8` or `cp`.
    pub format: String,
    pub codepoint_prefix: String,
    pub newline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub command_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub columns: usize,
    pub page_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            format: "utf-8".to_string(),
            codepoint_prefix: String::new(),
            newline: true,
            command: None,
            command_delay_ms: DEFAULT_COMMAND_DELAY_MS,
            server_name: None,
            columns: DEFAULT_COLUMNS,
            page_rows: DEFAULT_PAGE_ROWS,
            data_file: None,
        }
    }
}

pub fn config_path() -> PathBuf {
    crate::paths::default_config_path()
}

pub fn load_config_from(path: &Path) -> anyhow::Result<PickerConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: PickerConfig = toml::from_str(&s).context("parse config")?;
    Ok(cfg)
}

/// Load the config file, falling back to defaults.
///
/// A missing file is normal; a broken one is reported and ignored.
pub fn load_or_default(path: &Path) -> PickerConfig {
    if !path.exists() {
        return PickerConfig::default();
    }
    match load_config_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("config: using defaults: {e:#}");
            PickerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        std::fs::write(&p, "format = \"cp\"\ncodepoint_prefix = \"U+\"\ncolumns = 8\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.format, "cp");
        assert_eq!(cfg.codepoint_prefix, "U+");
        assert_eq!(cfg.columns, 8);
        assert_eq!(cfg.page_rows, DEFAULT_PAGE_ROWS);
        assert!(cfg.newline);
        assert_eq!(cfg.command, None);
    }

    #[test]
    fn missing_or_broken_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        assert_eq!(load_or_default(&p), PickerConfig::default());

        std::fs::write(&p, "columns = \"many\"").unwrap();
        assert!(load_config_from(&p).is_err());
        assert_eq!(load_or_default(&p), PickerConfig::default());
    }

    #[test]
    fn defaults_roundtrip_through_toml() {
        let s = toml::to_string(&PickerConfig::default()).unwrap();
        let back: PickerConfig = toml::from_str(&s).unwrap();
        assert_eq!(back, PickerConfig::default());
    }
}
