//! Shared application state for the middleware and routes.

use crate::router::ShardRouter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ShardRouter>,
}

impl AppState {
    pub fn new(router: ShardRouter) -> Self {
        AppState {
            router: Arc::new(router),
        }
    }
}
