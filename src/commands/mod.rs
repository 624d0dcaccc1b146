use serde_json::Value;
use std::io::Read;
use std::path::Path;

use drinkmaker::defaults::Defaults;
use drinkmaker::store::{DataStore, SqliteStore};

pub type CmdResult<T> = drinkmaker::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Acting user id for ownership checks.
    pub user: String,
    /// Use a throwaway in-memory store instead of the database file.
    pub memory: bool,
    pub defaults: Defaults,
}

impl GlobalArgs {
    pub fn open_store(&self) -> drinkmaker::Result<Box<dyn DataStore>> {
        if self.memory {
            return Ok(Box::new(SqliteStore::open_in_memory()?));
        }
        let path = self.defaults.store.resolve_path()?;
        Ok(Box::new(SqliteStore::open(&path)?))
    }
}

// ============================================================================
// JSON Input Parsing (CLI layer)
// ============================================================================

/// Read JSON spec from string, file (@path), or stdin (-).
fn read_json_spec_to_string(spec: &str) -> drinkmaker::Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(drinkmaker::Error::validation_invalid_argument(
                "json",
                "Cannot read JSON from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        stdin.read_to_string(&mut buf).map_err(|e| {
            drinkmaker::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(drinkmaker::Error::validation_invalid_argument(
                "json",
                "Invalid JSON spec '@' (missing file path)",
                None,
                None,
            ));
        }
        return std::fs::read_to_string(Path::new(path)).map_err(|e| {
            drinkmaker::Error::internal_io(e.to_string(), Some(format!("read {}", path)))
        });
    }

    Ok(spec.to_string())
}

/// Parse a JSON argument given inline, as `@file`, or as `-` for stdin.
pub(crate) fn read_json_spec(spec: &str) -> drinkmaker::Result<Value> {
    let raw = read_json_spec_to_string(spec)?;
    serde_json::from_str(&raw).map_err(|e| {
        drinkmaker::Error::validation_invalid_json(e, Some("parse JSON argument".to_string()))
    })
}

/// Instructions from either plain text or a JSON document; JSON wins.
pub(crate) fn instructions_arg(
    text: Option<String>,
    json: Option<String>,
) -> drinkmaker::Result<Option<Value>> {
    match (json, text) {
        (Some(spec), _) => read_json_spec(&spec).map(Some),
        (None, Some(text)) => Ok(Some(drinkmaker::instructions::from_plain_text(&text))),
        (None, None) => Ok(None),
    }
}

pub mod config;
pub mod drink;
pub mod ingredient;
pub mod slug;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (drinkmaker::Result<serde_json::Value>, i32) {
    crate::tty::status("drinkmaker is working...");

    match command {
        // Commands without global context
        crate::Commands::Slug(args) => dispatch!(args, slug),

        // Commands with global context
        crate::Commands::Drink(args) => dispatch!(args, global, drink),
        crate::Commands::Ingredient(args) => dispatch!(args, global, ingredient),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
