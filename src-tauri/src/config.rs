//! Runtime configuration from environment variables.
//!
//! A `.env` file in the working directory is loaded first if present.
//!
//! | Variable                   | Default                     |
//! |----------------------------|-----------------------------|
//! | `SHOT_TO_PDF_HTTP`         | on                          |
//! | `SHOT_TO_PDF_PORT`         | 8080                        |
//! | `SHOT_TO_PDF_SHOW_WINDOW`  | on                          |
//! | `SHOT_TO_PDF_PAGE_SIZE`    | `a4` (or `letter`)          |
//! | `SHOT_TO_PDF_EXPORT_DIR`   | documents dir, else home    |
//! | `SHOT_TO_PDF_HOTKEY`       | `CommandOrControl+Shift+S`  |

use crate::export::PageSize;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOTKEY: &str = "CommandOrControl+Shift+S";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Serve the local HTTP control surface.
    pub http_enabled: bool,
    pub http_port: u16,
    /// Show the main window at startup. Off means the app is driven only
    /// through the tray and the HTTP surface.
    pub show_window: bool,
    pub page_size: PageSize,
    /// Where the save dialog opens.
    pub export_dir: Option<PathBuf>,
    /// Global capture shortcut; `None` disables it.
    pub hotkey: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_enabled: true,
            http_port: DEFAULT_PORT,
            show_window: true,
            page_size: PageSize::A4,
            export_dir: dirs::document_dir().or_else(dirs::home_dir),
            hotkey: Some(DEFAULT_HOTKEY.to_string()),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unparseable values are
    /// logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SHOT_TO_PDF_HTTP") {
            config.http_enabled = parse_flag("SHOT_TO_PDF_HTTP", &raw, config.http_enabled);
        }

        if let Some(raw) = lookup("SHOT_TO_PDF_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) if port != 0 => config.http_port = port,
                _ => log::warn!(
                    "Invalid SHOT_TO_PDF_PORT {:?}, using {}",
                    raw,
                    config.http_port
                ),
            }
        }

        if let Some(raw) = lookup("SHOT_TO_PDF_SHOW_WINDOW") {
            config.show_window = parse_flag("SHOT_TO_PDF_SHOW_WINDOW", &raw, config.show_window);
        }

        if let Some(raw) = lookup("SHOT_TO_PDF_PAGE_SIZE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "a4" => config.page_size = PageSize::A4,
                "letter" => config.page_size = PageSize::LETTER,
                _ => log::warn!("Unknown SHOT_TO_PDF_PAGE_SIZE {:?}, using A4", raw),
            }
        }

        if let Some(raw) = lookup("SHOT_TO_PDF_EXPORT_DIR") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.export_dir = Some(PathBuf::from(trimmed));
            }
        }

        if let Some(raw) = lookup("SHOT_TO_PDF_HOTKEY") {
            let trimmed = raw.trim();
            config.hotkey = match parse_bool(trimmed) {
                Some(false) => None,
                _ if trimmed.is_empty() => None,
                _ => Some(trimmed.to_string()),
            };
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_flag(key: &str, raw: &str, default: bool) -> bool {
    parse_bool(raw).unwrap_or_else(|| {
        log::warn!("Invalid {} {:?}, using {}", key, raw, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert!(config.http_enabled);
        assert_eq!(config.http_port, 8080);
        assert!(config.show_window);
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.hotkey.as_deref(), Some(DEFAULT_HOTKEY));
    }

    #[test]
    fn add_in_only_mode() {
        let config = config_from(&[
            ("SHOT_TO_PDF_SHOW_WINDOW", "off"),
            ("SHOT_TO_PDF_PORT", "9123"),
            ("SHOT_TO_PDF_PAGE_SIZE", "Letter"),
        ]);
        assert!(!config.show_window);
        assert_eq!(config.http_port, 9123);
        assert_eq!(config.page_size, PageSize::LETTER);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("SHOT_TO_PDF_HTTP", "maybe"),
            ("SHOT_TO_PDF_PORT", "0"),
            ("SHOT_TO_PDF_PAGE_SIZE", "tabloid"),
        ]);
        assert!(config.http_enabled);
        assert_eq!(config.http_port, DEFAULT_PORT);
        assert_eq!(config.page_size, PageSize::A4);

        assert_eq!(config_from(&[("SHOT_TO_PDF_PORT", "70000")]).http_port, DEFAULT_PORT);
    }

    #[test]
    fn server_and_hotkey_can_be_disabled() {
        let config = config_from(&[("SHOT_TO_PDF_HTTP", "0"), ("SHOT_TO_PDF_HOTKEY", "off")]);
        assert!(!config.http_enabled);
        assert!(config.hotkey.is_none());

        let custom = config_from(&[("SHOT_TO_PDF_HOTKEY", "Alt+F9")]);
        assert_eq!(custom.hotkey.as_deref(), Some("Alt+F9"));
    }

    #[test]
    fn export_dir_override() {
        let config = config_from(&[("SHOT_TO_PDF_EXPORT_DIR", "/tmp/shots")]);
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/shots")));
    }
}
