use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the config directory.
pub const HOME_ENV: &str = "DRINKMAKER_HOME";

/// Base drinkmaker config directory (~/.config/drinkmaker/ unless DRINKMAKER_HOME is set)
pub fn drinkmaker() -> Result<PathBuf> {
    if let Ok(dir) = env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("drinkmaker"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("drinkmaker"))
    }
}

/// Global drinkmaker.json config file path
pub fn drinkmaker_json() -> Result<PathBuf> {
    Ok(drinkmaker()?.join("drinkmaker.json"))
}

/// Default SQLite database file
pub fn database() -> Result<PathBuf> {
    Ok(drinkmaker()?.join("drinks.db"))
}
