//! Markdown posts on disk: slug enumeration and raw content lookup.

use std::{fmt, path::PathBuf};

use tokio::{fs, io::AsyncReadExt};
use tracing::{debug, warn};

use crate::error::ContentError;

const POST_EXTENSION: &str = "md";

/// URL identifier of a post: its file name minus `.md`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slug(String);

impl Slug {
    /// Validates caller-supplied input. Only ASCII letters, digits, `-`, `_`
    /// and `.` are allowed, and no leading `.`, so a slug is a single URL path
    /// segment as written and never names a hidden file or a parent directory.
    pub fn parse(raw: &str) -> Result<Self, ContentError> {
        let invalid = raw.is_empty()
            || raw.starts_with('.')
            || !raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if invalid {
            return Err(ContentError::InvalidSlug(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn file_name(&self) -> String {
        format!("{}.{}", self.0, POST_EXTENSION)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directory of `<slug>.md` files. Nothing is cached.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every post route the site exposes, sorted.
    ///
    /// Fails as a whole if the directory cannot be read; a partial route set
    /// is never returned.
    pub async fn list_slugs(&self) -> Result<Vec<Slug>, ContentError> {
        let unavailable = |source| ContentError::DirectoryUnavailable {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(unavailable)?;
        let mut slugs = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == POST_EXTENSION) {
                continue;
            }

            // Follows symlinks so a linked post counts like a regular file.
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "skipping dangling post link");
                    continue;
                }
                Err(e) => return Err(unavailable(e)),
            };
            if !metadata.is_file() {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "skipping post with non UTF-8 file name");
                continue;
            };

            match Slug::parse(stem) {
                Ok(slug) => slugs.push(slug),
                Err(_) => debug!(path = %path.display(), "skipping file that is not a valid post"),
            }
        }

        slugs.sort();
        Ok(slugs)
    }

    /// Raw markdown for `slug`, byte for byte.
    ///
    /// The slug is validated before the filesystem is touched.
    pub async fn load_content(&self, slug: &str) -> Result<String, ContentError> {
        let slug = Slug::parse(slug)?;
        let path = self.dir.join(slug.file_name());

        let io_error = |source: std::io::Error| match source.kind() {
            std::io::ErrorKind::NotFound => ContentError::ContentNotFound(slug.to_string()),
            _ => ContentError::Io {
                path: path.clone(),
                source,
            },
        };

        // The handle lives only inside this call and is closed on drop,
        // whichever branch returns.
        let mut file = fs::File::open(&path).await.map_err(io_error)?;
        let metadata = file.metadata().await.map_err(io_error)?;
        if !metadata.is_file() {
            return Err(ContentError::ContentNotFound(slug.to_string()));
        }

        let mut text = String::new();
        file.read_to_string(&mut text).await.map_err(io_error)?;
        Ok(text)
    }
}
