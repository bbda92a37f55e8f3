//! Loads the site bundle: templates, `site.toml` and the post route set.

use tokio::fs;
use tracing::{error, info};

use crate::{
    config::Config,
    error::SiteError,
    pages::Shell,
    posts::{PostStore, Slug},
    site::SiteData,
    state::AppState,
};

pub struct SiteContent {
    pub layout: String,
    pub not_found: String,
    pub site: SiteData,
    pub slugs: Vec<Slug>,
}

impl SiteContent {
    pub fn shell(&self, live_reload: bool) -> Shell<'_> {
        Shell {
            layout: &self.layout,
            profile: &self.site.profile,
            live_reload,
        }
    }
}

async fn read_template(path: std::path::PathBuf) -> Result<String, SiteError> {
    fs::read_to_string(&path)
        .await
        .map_err(|e| SiteError::Io(path, e))
}

/// Everything a page needs except post bodies, which are read per request.
///
/// An unreadable posts directory fails the whole load.
pub async fn load_site(config: &Config) -> Result<SiteContent, SiteError> {
    let layout = read_template(config.layout_file()).await?;
    let not_found = read_template(config.not_found_file()).await?;
    let site = SiteData::load(&config.site_file()).await?;

    let slugs = PostStore::new(config.posts_dir()).list_slugs().await?;
    site.report_drift(&slugs);

    Ok(SiteContent {
        layout,
        not_found,
        site,
        slugs,
    })
}

/// Replaces the bundle in place. On failure the previous bundle stays.
pub async fn reload_site(app_state: &AppState) -> bool {
    info!("Reloading site content...");
    match load_site(&app_state.config).await {
        Ok(content) => {
            let routes = content.slugs.len();
            *app_state.content.write().await = content;
            info!(routes, "Site content reloaded.");
            true
        }
        Err(e) => {
            error!("Failed to reload site content: {:#}", anyhow::Error::from(e));
            false
        }
    }
}
