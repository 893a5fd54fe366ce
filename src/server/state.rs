use std::sync::Arc;

use wayfarer_kernel::{Config, RunController};

#[derive(Clone)]
pub struct ServeState {
    pub controller: Arc<RunController>,
    pub config: Arc<Config>,
}

impl ServeState {
    pub fn new(config: Config, controller: Arc<RunController>) -> Self {
        Self {
            controller,
            config: Arc::new(config),
        }
    }
}
