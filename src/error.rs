use std::path::PathBuf;

use thiserror::Error;

/// Failures of the post store.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content directory `{}` is unavailable", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no post named `{0}`")]
    ContentNotFound(String),

    #[error("`{0}` is not a valid post slug")]
    InvalidSlug(String),

    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// True for errors a visitor should see as a plain 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContentNotFound(_) | Self::InvalidSlug(_))
    }
}

/// Failures while loading the site bundle (templates and `site.toml`).
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("site data parsing error")]
    Parse(#[from] toml::de::Error),

    #[error("site data validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}
