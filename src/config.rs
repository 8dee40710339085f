use crate::logging::LogLevel;

pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

#[cfg(not(target_arch = "wasm32"))]
pub use server_config::ServerConfig;

#[cfg(target_arch = "wasm32")]
pub use client_config::ClientConfig;

fn parse_log_level(value: Option<String>, default: LogLevel) -> LogLevel {
    value
        .as_deref()
        .and_then(LogLevel::from_str)
        .unwrap_or(default)
}

#[cfg(not(target_arch = "wasm32"))]
mod server_config {
    use super::{parse_log_level, DEFAULT_LOG_LEVEL};
    use crate::logging::{LogLevel, LogSettings};
    use std::path::PathBuf;

    const DEFAULT_PORT: u16 = 8080;
    const DEFAULT_DIST_DIR: &str = "dist";
    const PORT_BOUNDS: (u16, u16) = (1, u16::MAX);

    #[derive(Clone, Debug)]
    pub struct ServerConfig {
        pub port: u16,
        pub dist_dir: PathBuf,
        pub log_level: LogLevel,
    }

    impl ServerConfig {
        pub fn from_env() -> Self {
            Self::from_lookup(|name| std::env::var(name).ok())
        }

        pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
            let port = parse_u16_with_bounds(lookup("PORT"), DEFAULT_PORT, PORT_BOUNDS);
            let dist_dir = parse_non_empty_string(lookup("SITE_DIST_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));
            let log_level = parse_log_level(lookup("LOG_LEVEL"), DEFAULT_LOG_LEVEL);

            Self {
                port,
                dist_dir,
                log_level,
            }
        }

        pub fn index_path(&self) -> PathBuf {
            self.dist_dir.join("index.html")
        }
    }

    impl LogSettings for ServerConfig {
        fn log_level(&self) -> LogLevel {
            self.log_level
        }
    }

    fn parse_u16_with_bounds(value: Option<String>, default: u16, bounds: (u16, u16)) -> u16 {
        value
            .and_then(|value| value.trim().parse::<u16>().ok())
            .filter(|value| (bounds.0..=bounds.1).contains(value))
            .unwrap_or(default)
    }

    fn parse_non_empty_string(value: Option<String>) -> Option<String> {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(target_arch = "wasm32")]
mod client_config {
    use super::{parse_log_level, DEFAULT_LOG_LEVEL};
    use crate::logging::{LogLevel, LogSettings};
    use web_sys::window;

    const LOG_LEVEL_KEY: &str = "portfolio-log-level";
    const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ClientConfig {
        pub log_level: LogLevel,
        pub reduced_motion: bool,
    }

    impl Default for ClientConfig {
        fn default() -> Self {
            Self {
                log_level: DEFAULT_LOG_LEVEL,
                reduced_motion: false,
            }
        }
    }

    impl ClientConfig {
        pub fn load() -> Self {
            Self {
                log_level: parse_log_level(read_stored_log_level(), DEFAULT_LOG_LEVEL),
                reduced_motion: prefers_reduced_motion(),
            }
        }
    }

    fn read_stored_log_level() -> Option<String> {
        let storage = window()?.local_storage().ok().flatten()?;
        storage.get_item(LOG_LEVEL_KEY).ok().flatten()
    }

    impl LogSettings for ClientConfig {
        fn log_level(&self) -> LogLevel {
            self.log_level
        }
    }

    fn prefers_reduced_motion() -> bool {
        let Some(query) = window().and_then(|win| win.match_media(REDUCED_MOTION_QUERY).ok().flatten()) else {
            return false;
        };
        query.matches()
    }
}
