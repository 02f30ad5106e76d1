use salvo::prelude::*;

use super::payload::{
    is_json, optional_param, param_values, parse_json, parse_payload, required_param,
};
use super::types::{
    CreateTableRequest, DeleteDataRequest, DeleteTableRequest, InsertDataRequest,
    JoinTablesRequest, UpdateDataRequest,
};
use crate::core::sql::Assignments;
use crate::error::AppError;
use crate::state::get_app_state;

pub fn sql_routes() -> Router {
    Router::with_path("sql")
        .push(Router::with_path("create_table").post(create_table))
        .push(Router::with_path("insert_data").post(insert_data))
        .push(Router::with_path("delete_data").delete(delete_data))
        .push(Router::with_path("update_data").put(update_data))
        .push(Router::with_path("delete_table").delete(delete_table))
        .push(Router::with_path("join_tables").post(join_tables))
}

/// Create a table from a full CREATE TABLE statement
#[handler]
pub async fn create_table(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: CreateTableRequest = parse_payload(req).await?;

    let outcome = state
        .sql
        .create_table(&request.table_name, &request.table_query)
        .await?;

    res.render(Json(outcome));
    Ok(())
}

/// Insert one row from parallel column/value lists
#[handler]
pub async fn insert_data(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: InsertDataRequest = parse_json(req).await?;

    let outcome = state
        .sql
        .insert_row(&request.table_name, &request.columns, &request.values)
        .await?;

    res.render(Json(outcome));
    Ok(())
}

#[handler]
pub async fn delete_data(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: DeleteDataRequest = parse_payload(req).await?;

    let outcome = state
        .sql
        .delete_rows(&request.table_name, &request.condition, request.multi)
        .await?;

    res.render(Json(outcome));
    Ok(())
}

/// Non-JSON update: each field may come from the query string or the form
/// body, `updates` repeated once per `"column = value"` assignment.
async fn update_request_from_params(req: &mut Request) -> Result<UpdateDataRequest, AppError> {
    let table_name = required_param(req, "table_name").await?;
    let condition = required_param(req, "condition").await?;
    let updates = param_values(req, "updates").await?;
    let multi = match optional_param(req, "multi").await? {
        Some(raw) => raw
            .trim()
            .parse::<bool>()
            .map_err(|_| AppError::BadRequest(format!("multi must be true or false, got '{}'", raw)))?,
        None => true,
    };

    Ok(UpdateDataRequest {
        table_name,
        condition,
        updates: Assignments::Raw(updates),
        multi,
    })
}

/// Update rows; `updates` is a JSON list of `"column = value"` strings or a
/// column/value object, or repeated form/query fields.
#[handler]
pub async fn update_data(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: UpdateDataRequest = if is_json(req) {
        parse_json(req).await?
    } else {
        update_request_from_params(req).await?
    };

    let outcome = state
        .sql
        .update_rows(
            &request.table_name,
            &request.condition,
            &request.updates,
            request.multi,
        )
        .await?;

    res.render(Json(outcome));
    Ok(())
}

#[handler]
pub async fn delete_table(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: DeleteTableRequest = parse_payload(req).await?;

    let outcome = state.sql.drop_table(&request.table_name).await?;

    res.render(Json(outcome));
    Ok(())
}

/// Run a caller-supplied query (usually a JOIN) and return its rows
#[handler]
pub async fn join_tables(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: JoinTablesRequest = parse_payload(req).await?;

    let outcome = state.sql.run_join_query(&request.query).await?;

    res.render(Json(outcome));
    Ok(())
}
