// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{ai::StudyAssistant, config::Config, sessions::SessionRegistry, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub assistant: Arc<dyn StudyAssistant>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, assistant: Arc<dyn StudyAssistant>, config: Config) -> Self {
        Self {
            store,
            assistant,
            sessions: Arc::new(SessionRegistry::new()),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn StudyAssistant> {
    fn from_ref(state: &AppState) -> Self {
        state.assistant.clone()
    }
}

impl FromRef<AppState> for Arc<SessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
