use std::sync::Arc;

use crate::{
    config::ServiceConfig,
    error::Result,
    llm::GeminiClient,
    session::{MemorySessionStore, SessionStore},
    submissions::SubmissionLog,
};

pub struct AppState {
    pub config: ServiceConfig,
    pub gemini: Option<GeminiClient>,
    pub sessions: Arc<dyn SessionStore>,
    pub submissions: SubmissionLog,
}

impl AppState {
    pub fn new(config: ServiceConfig, sessions: Arc<dyn SessionStore>) -> Result<Arc<Self>> {
        let gemini = GeminiClient::from_config(&config)?;
        let submissions = SubmissionLog::new(config.submissions_log.clone());

        Ok(Arc::new(Self {
            config,
            gemini,
            sessions,
            submissions,
        }))
    }

    /// State backed by a fresh in-memory session store.
    pub fn in_memory(config: ServiceConfig) -> Result<Arc<Self>> {
        Self::new(config, Arc::new(MemorySessionStore::new()))
    }
}
