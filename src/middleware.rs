use std::time::Instant;

use salvo::prelude::*;
use tracing::info;

use crate::state::AppState;

/// Hoop that puts [`AppState`] into the depot, applies the configured body
/// size cap and logs each request with its status and latency.
pub struct StateInjector {
    state: AppState,
}

impl StateInjector {
    pub fn new(state: AppState) -> Self {
        StateInjector { state }
    }
}

#[async_trait]
impl Handler for StateInjector {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        // salvo's own cap is 64 KiB, too small for bulk inserts
        req.set_secure_max_size(self.state.max_body_size);
        depot.inject(self.state.clone());

        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        ctrl.call_next(req, depot, res).await;

        let status = res.status_code.unwrap_or(StatusCode::OK);
        info!(
            "{} {} -> {} ({}ms)",
            method,
            path,
            status.as_u16(),
            started.elapsed().as_millis()
        );
    }
}

pub fn inject_state(state: AppState) -> StateInjector {
    StateInjector::new(state)
}
