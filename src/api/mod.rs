pub mod mongo;
pub mod payload;
pub mod sql;
pub mod types;

use salvo::prelude::*;

use crate::middleware::inject_state;
use crate::state::AppState;

/// Full router: both route groups plus the welcome and health endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .hoop(inject_state(state))
        .get(read_root)
        .push(Router::with_path("health").get(health_check))
        .push(sql::sql_routes())
        .push(mongo::mongo_routes())
}

#[handler]
async fn read_root(res: &mut Response) {
    res.render(Json(serde_json::json!({
        "message": "Welcome to the CRUD gateway!",
        "routes": ["/sql", "/mongo", "/health"]
    })));
}

#[handler]
async fn health_check(res: &mut Response) {
    res.render(Json(serde_json::json!({
        "status": "ok",
        "service": "crud-gateway"
    })));
}
