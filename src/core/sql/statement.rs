//! Statement builders for the relational routes.
//!
//! Identifiers are validated and bracket-quoted, values are bound as `@Pn`
//! parameters. WHERE clauses, raw `SET` assignments, DDL and join queries are
//! caller-supplied SQL and are passed through as text.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::utils::ValidationHelpers;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

/// `SET` list of an update: either pre-formatted `"column = value"` strings
/// or a column to value map whose values are bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Assignments {
    Raw(Vec<String>),
    Values(Map<String, Value>),
}

impl Assignments {
    pub fn is_empty(&self) -> bool {
        match self {
            Assignments::Raw(list) => list.is_empty(),
            Assignments::Values(map) => map.is_empty(),
        }
    }
}

fn placeholder(index: usize) -> String {
    format!("@P{}", index)
}

fn top_clause(multi: bool) -> &'static str {
    if multi {
        ""
    } else {
        " TOP (1)"
    }
}

fn checked_condition(condition: &str) -> Result<&str, AppError> {
    ValidationHelpers::validate_non_empty_string(condition, "condition")?;
    Ok(condition.trim())
}

pub fn insert(table: &str, columns: &[String], values: &[Value]) -> Result<Statement, AppError> {
    let table = ValidationHelpers::quote_identifier(table, "table name")?;
    if columns.is_empty() {
        return Err(AppError::Validation("columns cannot be empty".to_string()));
    }
    let columns = columns
        .iter()
        .map(|c| ValidationHelpers::quote_identifier(c, "column name"))
        .collect::<Result<Vec<_>, _>>()?;

    // One placeholder per value; a column/value count mismatch is left for
    // the server to reject.
    let placeholders: Vec<String> = (1..=values.len()).map(placeholder).collect();

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: values.to_vec(),
    })
}

pub fn delete(table: &str, condition: &str, multi: bool) -> Result<Statement, AppError> {
    let table = ValidationHelpers::quote_identifier(table, "table name")?;
    let condition = checked_condition(condition)?;
    Ok(Statement::raw(format!(
        "DELETE{} FROM {} WHERE {}",
        top_clause(multi),
        table,
        condition
    )))
}

pub fn update(
    table: &str,
    condition: &str,
    assignments: &Assignments,
    multi: bool,
) -> Result<Statement, AppError> {
    let table = ValidationHelpers::quote_identifier(table, "table name")?;
    let condition = checked_condition(condition)?;
    if assignments.is_empty() {
        return Err(AppError::Validation("updates cannot be empty".to_string()));
    }

    let mut params = Vec::new();
    let set_clauses = match assignments {
        Assignments::Raw(list) => list
            .iter()
            .map(|assignment| raw_assignment(assignment))
            .collect::<Result<Vec<_>, _>>()?,
        Assignments::Values(map) => {
            let mut clauses = Vec::with_capacity(map.len());
            for (column, value) in map {
                let column = ValidationHelpers::quote_identifier(column, "column name")?;
                params.push(value.clone());
                clauses.push(format!("{} = {}", column, placeholder(params.len())));
            }
            clauses
        }
    };

    Ok(Statement {
        sql: format!(
            "UPDATE{} {} SET {} WHERE {}",
            top_clause(multi),
            table,
            set_clauses.join(", "),
            condition
        ),
        params,
    })
}

/// `"name = 'x'"` becomes `"[name] = 'x'"`; the right-hand side is kept.
fn raw_assignment(assignment: &str) -> Result<String, AppError> {
    let (column, value) = assignment.split_once('=').ok_or_else(|| {
        AppError::Validation(format!(
            "Update '{}' must have the form 'column = value'",
            assignment
        ))
    })?;
    let column = ValidationHelpers::quote_identifier(column, "column name")?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!(
            "Update '{}' is missing a value",
            assignment
        )));
    }
    Ok(format!("{} = {}", column, value))
}

pub fn drop_table(table: &str) -> Result<Statement, AppError> {
    let table = ValidationHelpers::quote_identifier(table, "table name")?;
    Ok(Statement::raw(format!("DROP TABLE {}", table)))
}

/// Table targeted by a `CREATE TABLE` statement, brackets stripped.
pub fn created_table_name(ddl: &str) -> Option<String> {
    let mut words = ddl.split_whitespace();
    let create = words.next()?;
    let table = words.next()?;
    if !create.eq_ignore_ascii_case("CREATE") || !table.eq_ignore_ascii_case("TABLE") {
        return None;
    }
    let name: String = words
        .next()?
        .split('(')
        .next()?
        .chars()
        .filter(|c| *c != '[' && *c != ']')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

pub fn server_identity() -> Statement {
    Statement::raw("SELECT @@SERVERNAME AS server_name, DB_NAME() AS database_name")
}
