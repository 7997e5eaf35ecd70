use crate::config::Config;
use crate::task_db::TaskDb;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<TaskDb>,
    pub config: Config,
}
