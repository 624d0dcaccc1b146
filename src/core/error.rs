use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidName,
    ValidationInvalidJson,

    DrinkNotFound,
    IngredientNotFound,
    IngredientAlreadyExists,

    PermissionDenied,

    StoreQueryFailed,
    StoreConstraintViolation,
    StoreUnknownTable,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidName => "validation.invalid_name",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::DrinkNotFound => "drink.not_found",
            ErrorCode::IngredientNotFound => "ingredient.not_found",
            ErrorCode::IngredientAlreadyExists => "ingredient.already_exists",

            ErrorCode::PermissionDenied => "auth.permission_denied",

            ErrorCode::StoreQueryFailed => "store.query_failed",
            ErrorCode::StoreConstraintViolation => "store.constraint_violation",
            ErrorCode::StoreUnknownTable => "store.unknown_table",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    /// True for failures raised by the data store (transport, query, constraint).
    pub fn is_store(&self) -> bool {
        matches!(
            self,
            ErrorCode::StoreQueryFailed
                | ErrorCode::StoreConstraintViolation
                | ErrorCode::StoreUnknownTable
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundDetails {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidNameDetails {
    pub name: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDeniedDetails {
    pub actor: String,
    pub owner: String,
    pub resource: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreErrorDetails {
    pub table: String,
    pub operation: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            to_details(MissingArgumentDetails { args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    /// A display name that cannot produce a usable slug or fails length rules.
    pub fn validation_invalid_name(name: impl Into<String>, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidNameDetails {
            name: name.into(),
            problem: problem.clone(),
        });

        Self::new(ErrorCode::ValidationInvalidName, problem, details)
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn drink_not_found(slug: impl Into<String>) -> Self {
        Self::not_found(ErrorCode::DrinkNotFound, "Drink not found", slug)
            .with_hint("Run 'drinkmaker drink list' to see available drinks")
    }

    pub fn ingredient_not_found(id: impl Into<String>) -> Self {
        Self::not_found(ErrorCode::IngredientNotFound, "Ingredient not found", id)
            .with_hint("Run 'drinkmaker ingredient search <prefix>' to find ingredients")
    }

    fn not_found(code: ErrorCode, message: &str, id: impl Into<String>) -> Self {
        Self::new(code, message, to_details(NotFoundDetails { id: id.into() }))
    }

    pub fn ingredient_already_exists(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::IngredientAlreadyExists,
            format!("'{}' already exists", name),
            to_details(NotFoundDetails { id: name }),
        )
    }

    pub fn permission_denied(
        actor: impl Into<String>,
        owner: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        let details = to_details(PermissionDeniedDetails {
            actor: actor.into(),
            owner: owner.into(),
            resource: resource.into(),
        });

        Self::new(
            ErrorCode::PermissionDenied,
            "Only the owner can modify this record",
            details,
        )
    }

    pub fn store_query_failed(
        table: impl Into<String>,
        operation: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut err = Self::store(
            ErrorCode::StoreQueryFailed,
            "Data store request failed",
            table,
            operation,
            error,
        );
        err.retryable = Some(true);
        err
    }

    pub fn store_constraint_violation(
        table: impl Into<String>,
        operation: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut err = Self::store(
            ErrorCode::StoreConstraintViolation,
            "Data store rejected the write",
            table,
            operation,
            error,
        );
        err.retryable = Some(false);
        err
    }

    pub fn store_unknown_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self::store(
            ErrorCode::StoreUnknownTable,
            "Unknown table",
            table.clone(),
            "resolve",
            format!("no table named '{}'", table),
        )
    }

    fn store(
        code: ErrorCode,
        message: &str,
        table: impl Into<String>,
        operation: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let details = to_details(StoreErrorDetails {
            table: table.into(),
            operation: operation.into(),
            error: error.into(),
        });
        Self::new(code, message, details)
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::json!({
            "path": path.into(),
            "error": err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
