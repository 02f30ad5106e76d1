use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

lazy_static! {
    static ref IDENTIFIER_PART: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_@$#]*$").unwrap();
}

/// SQL Server `sysname` length.
const MAX_IDENTIFIER_LEN: usize = 128;
const MAX_COLLECTION_NAME_LEN: usize = 100;

/// Request validation shared by the route groups
pub struct ValidationHelpers;

impl ValidationHelpers {
    /// Validate that a string is not empty
    pub fn validate_non_empty_string(value: &str, field_name: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} cannot be empty", field_name)));
        }
        Ok(())
    }

    /// Validate a table or column name and return it bracket-quoted.
    ///
    /// Accepts `name` or `schema.name`; brackets already present are rejected
    /// rather than re-escaped.
    pub fn quote_identifier(identifier: &str, field_name: &str) -> Result<String, AppError> {
        let identifier = identifier.trim();
        Self::validate_non_empty_string(identifier, field_name)?;

        let parts: Vec<&str> = identifier.split('.').collect();
        if parts.len() > 2 {
            return Err(AppError::Validation(format!(
                "Invalid {} '{}': at most one schema qualifier is allowed",
                field_name, identifier
            )));
        }

        let mut quoted = Vec::with_capacity(parts.len());
        for part in parts {
            if part.len() > MAX_IDENTIFIER_LEN {
                return Err(AppError::Validation(format!("{} too long", field_name)));
            }
            if !IDENTIFIER_PART.is_match(part) {
                return Err(AppError::Validation(format!(
                    "Invalid {} format: '{}'",
                    field_name, identifier
                )));
            }
            quoted.push(format!("[{}]", part));
        }
        Ok(quoted.join("."))
    }

    /// Validate a table name against the configured allow-list.
    pub fn validate_table_allowed(table_name: &str, allowlist: &[String]) -> Result<(), AppError> {
        if allowlist.is_empty() {
            return Ok(());
        }
        let table_name = table_name.trim();
        let unqualified = table_name.rsplit('.').next().unwrap_or(table_name);
        let allowed = allowlist
            .iter()
            .any(|t| t.eq_ignore_ascii_case(table_name) || t.eq_ignore_ascii_case(unqualified));
        if !allowed {
            return Err(AppError::Validation(format!(
                "Table '{}' is not in the allow-list",
                table_name
            )));
        }
        Ok(())
    }

    /// Validate a MongoDB collection name
    pub fn validate_collection_name(name: &str) -> Result<(), AppError> {
        if name.is_empty() || name.chars().count() > MAX_COLLECTION_NAME_LEN {
            return Err(AppError::Validation(format!(
                "Collection name must be between 1 and {} characters",
                MAX_COLLECTION_NAME_LEN
            )));
        }
        if name.contains('$') || name.contains('\0') {
            return Err(AppError::Validation(format!(
                "Collection name '{}' contains a reserved character",
                name
            )));
        }
        if name.starts_with("system.") {
            return Err(AppError::Validation(
                "Collection names starting with 'system.' are reserved".to_string(),
            ));
        }
        Ok(())
    }
}
