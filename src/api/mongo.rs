use salvo::prelude::*;

use super::payload::parse_json;
use super::types::{
    CreateCollectionRequest, DeleteDocumentsRequest, InsertDocumentsRequest,
    UpdateDocumentsRequest,
};
use crate::error::AppError;
use crate::state::get_app_state;

pub fn mongo_routes() -> Router {
    Router::with_path("mongo")
        .push(Router::with_path("create-collection").post(create_collection))
        .push(Router::with_path("insert-data").post(insert_data))
        .push(Router::with_path("update-data").put(update_data))
        .push(Router::with_path("delete-data").delete(delete_data))
}

#[handler]
pub async fn create_collection(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: CreateCollectionRequest = parse_json(req).await?;

    let created = state
        .documents
        .create_collection(&request.collection_name, &request.indexes)
        .await?;

    res.render(Json(created));
    Ok(())
}

#[handler]
pub async fn insert_data(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: InsertDocumentsRequest = parse_json(req).await?;

    let outcome = state
        .documents
        .insert_documents(&request.collection_name, request.data)
        .await?;

    res.render(Json(outcome));
    Ok(())
}

#[handler]
pub async fn update_data(
    req: &mut Request,
    res: &mut Response,
    depot: &mut Depot,
) -> Result<(), AppError> {
    let state = get_app_state(depot)?;
    let request: UpdateDocumentsRequest = parse_json(req).await?;

    let outcome = state
        .documents
        .update_documents(
            &request.collection_name,
            &request.filter_query,
            &request.update_values,
            request.multi,
        )
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
    let request: DeleteDocumentsRequest = parse_json(req).await?;

    let outcome = state
        .documents
        .delete_documents(&request.collection_name, &request.filter_query, request.multi)
        .await?;

    res.render(Json(outcome));
    Ok(())
}
