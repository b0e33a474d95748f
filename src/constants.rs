//! Application constants and configuration

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const SERVER_URL_ENV: &str = "ACTIVITY_ROSTER_SERVER";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a flash message stays visible, in seconds.
pub const FLASH_SECS: f32 = 5.0;
