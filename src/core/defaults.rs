use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::paths;

/// Root configuration structure for drinkmaker.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DrinkmakerConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via drinkmaker.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    #[serde(default = "default_store")]
    pub store: StoreConfig,

    #[serde(default = "default_list")]
    pub list: ListConfig,

    #[serde(default = "default_user")]
    pub user: UserConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            store: default_store(),
            list: default_list(),
            user: default_user(),
        }
    }
}

/// Where the SQLite database lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path to the database file. `~` and `$VARS` are expanded.
    /// When absent, the database sits next to drinkmaker.json.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

impl StoreConfig {
    pub fn resolve_path(&self) -> crate::Result<PathBuf> {
        match &self.database_path {
            Some(raw) => {
                let expanded = shellexpand::full(raw).map_err(|e| {
                    crate::Error::config_invalid_value(
                        "defaults.store.database_path",
                        Some(raw.clone()),
                        e.to_string(),
                    )
                })?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            None => paths::database(),
        }
    }
}

/// Paging, search and scroll tuning for incremental lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_auto_continue_window_ms")]
    pub auto_continue_window_ms: u64,

    #[serde(default = "default_near_bottom_threshold_px")]
    pub near_bottom_threshold_px: f64,
}

impl Default for ListConfig {
    fn default() -> Self {
        default_list()
    }
}

/// Identity used when no --user flag is given
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub default_user: String,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_store() -> StoreConfig {
    StoreConfig {
        database_path: None,
    }
}

fn default_list() -> ListConfig {
    ListConfig {
        page_size: default_page_size(),
        min_query_length: default_min_query_length(),
        max_name_length: default_max_name_length(),
        debounce_ms: default_debounce_ms(),
        auto_continue_window_ms: default_auto_continue_window_ms(),
        near_bottom_threshold_px: default_near_bottom_threshold_px(),
    }
}

fn default_user() -> UserConfig {
    UserConfig {
        default_user: default_user_id(),
    }
}

fn default_page_size() -> usize {
    10
}

fn default_min_query_length() -> usize {
    3
}

fn default_max_name_length() -> usize {
    crate::slugify::MAX_NAME_LENGTH
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_auto_continue_window_ms() -> u64 {
    1200
}

fn default_near_bottom_threshold_px() -> f64 {
    300.0
}

fn default_user_id() -> String {
    "local".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If drinkmaker.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full drinkmaker.json config, falling back to defaults on any error.
pub fn load_config() -> DrinkmakerConfig {
    match load_config_from_file() {
        Ok(config) => config,
        Err(err) => {
            if config_exists() {
                log_status!("config", "Ignoring drinkmaker.json: {}", err);
            }
            DrinkmakerConfig::default()
        }
    }
}

/// Attempt to load config from drinkmaker.json file.
fn load_config_from_file() -> crate::Result<DrinkmakerConfig> {
    let path = paths::drinkmaker_json()?;

    if !path.exists() {
        return Err(crate::Error::other("drinkmaker.json not found"));
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    parse_config(&content, &path.display().to_string())
}

pub(crate) fn parse_config(content: &str, origin: &str) -> crate::Result<DrinkmakerConfig> {
    let config: DrinkmakerConfig = serde_json::from_str(content)
        .map_err(|e| crate::Error::config_invalid_json(origin, e))?;

    validate_list_config(&config.defaults.list)?;
    Ok(config)
}

fn validate_list_config(list: &ListConfig) -> crate::Result<()> {
    if list.page_size == 0 {
        return Err(crate::Error::config_invalid_value(
            "defaults.list.page_size",
            Some(list.page_size.to_string()),
            "page_size must be at least 1",
        ));
    }
    if list.min_query_length > list.max_name_length {
        return Err(crate::Error::config_invalid_value(
            "defaults.list.min_query_length",
            Some(list.min_query_length.to_string()),
            "min_query_length cannot exceed max_name_length",
        ));
    }
    Ok(())
}

/// Save config to drinkmaker.json file (creates if missing).
pub fn save_config(config: &DrinkmakerConfig) -> crate::Result<()> {
    let path = paths::drinkmaker_json()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("serialize drinkmaker.json".to_string()))
    })?;

    fs::write(&path, content).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })?;

    Ok(())
}

/// Check if drinkmaker.json file exists
pub fn config_exists() -> bool {
    paths::drinkmaker_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Delete drinkmaker.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::drinkmaker_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to drinkmaker.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::drinkmaker_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn empty_object_yields_builtin_defaults() {
        let config = parse_config("{}", "test").unwrap();
        assert_eq!(config.defaults, builtin_defaults());
        assert_eq!(config.defaults.list.page_size, 10);
        assert_eq!(config.defaults.list.auto_continue_window_ms, 1200);
    }

    #[test]
    fn partial_list_section_keeps_other_defaults() {
        let config = parse_config(r#"{"defaults":{"list":{"page_size":25}}}"#, "test").unwrap();
        assert_eq!(config.defaults.list.page_size, 25);
        assert_eq!(config.defaults.list.min_query_length, 3);
        assert_eq!(config.defaults.user.default_user, "local");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = parse_config(r#"{"defaults":{"list":{"page_size":0}}}"#, "test").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn malformed_json_reports_origin() {
        let err = parse_config("{not json", "/tmp/drinkmaker.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
        assert_eq!(err.details["path"], "/tmp/drinkmaker.json");
    }

    #[test]
    fn explicit_database_path_is_expanded() {
        let store = StoreConfig {
            database_path: Some("/var/lib/drinks.db".to_string()),
        };
        assert_eq!(
            store.resolve_path().unwrap(),
            PathBuf::from("/var/lib/drinks.db")
        );
    }
}
