use std::sync::Arc;

use common::ResumeStore;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resumes: ResumeStore,
}
