mod config;

pub use config::{Config, DisplayConfig, LoggingConfig, TimerConfig};

use std::io;
use std::path::{Path, PathBuf};

/// Folder under `~/.config` holding `config.toml`.
pub const APP_DIR: &str = "meditation-timer";

/// Settings folder for `profile` below `home`.
///
/// No profile (or `production`) maps to `~/.config/meditation-timer`; any
/// other profile gets its own sibling, e.g. `meditation-timer-dev`.
pub fn config_dir_in(home: &Path, profile: Option<&str>) -> io::Result<PathBuf> {
    let name = match profile.map(str::trim) {
        None | Some("") | Some("production") => APP_DIR.to_string(),
        Some(p) if p.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            format!("{APP_DIR}-{p}")
        }
        Some(p) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("MEDITATION_ENV profile '{p}' may only use letters, digits and '-'"),
            ))
        }
    };
    Ok(home.join(".config").join(name))
}

/// The settings folder for the profile named by `MEDITATION_ENV`, created
/// on first use.
pub fn config_dir() -> io::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "cannot locate a home directory for the timer settings",
        )
    })?;
    let profile = std::env::var("MEDITATION_ENV").ok();
    let dir = config_dir_in(&home, profile.as_deref())?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
