use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::{
    config::Config,
    content_loader::SiteContent,
    pages::Shell,
    posts::PostStore,
};

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: Config,
    pub store: PostStore,
    /// Templates, site data and the route set; swapped wholesale on reload.
    pub content: RwLock<SiteContent>,
}

impl AppState {
    pub fn new(config: Config, content: SiteContent) -> Self {
        Self {
            store: PostStore::new(config.posts_dir()),
            content: RwLock::new(content),
            config,
        }
    }

    pub fn shell<'a>(&self, content: &'a SiteContent) -> Shell<'a> {
        content.shell(self.config.is_development)
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
