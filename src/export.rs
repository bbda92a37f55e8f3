//! Static export: every route rendered once into an output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{config::Config, content_loader::load_site, pages, posts::PostStore};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub pages: usize,
    pub assets: usize,
}

async fn write_page(out_dir: &Path, route: &str, html: &str) -> Result<()> {
    let path = if route.ends_with(".html") {
        out_dir.join(route)
    } else {
        out_dir.join(route).join("index.html")
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    fs::write(&path, html)
        .await
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    debug!(path = %path.display(), "wrote page");
    Ok(())
}

async fn copy_static(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk `{}`", from.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(from)?;
        let target: PathBuf = to.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(entry.path(), &target)
            .await
            .with_context(|| format!("failed to copy `{}`", entry.path().display()))?;
        copied += 1;
    }
    Ok(copied)
}

/// Sibling directory the export is assembled in before it replaces `out_dir`.
fn staging_dir(out_dir: &Path) -> Result<PathBuf> {
    let name = out_dir
        .file_name()
        .with_context(|| format!("`{}` is not a usable output directory", out_dir.display()))?;
    let mut staging = std::ffi::OsString::from(".");
    staging.push(name);
    staging.push(".staging");
    Ok(out_dir.with_file_name(staging))
}

async fn write_tree(dir: &Path, pages: &[(String, String)], static_dir: &Path) -> Result<usize> {
    for (route, html) in pages {
        write_page(dir, route, html).await?;
    }
    copy_static(static_dir, &dir.join("static")).await
}

/// Renders the whole site into `out_dir`.
///
/// Every page is rendered in memory first, so an unreadable post aborts
/// before anything is written. The tree is then assembled in a staging
/// directory and swapped in, which also drops files left by earlier runs.
pub async fn export(config: &Config, out_dir: &Path) -> Result<ExportReport> {
    let content = load_site(config)
        .await
        .with_context(|| format!("failed to load site from `{}`", config.content_dir.display()))?;
    info!(routes = content.slugs.len(), out = %out_dir.display(), "Exporting site");

    let shell = content.shell(false);
    let site = &content.site;
    let store = PostStore::new(config.posts_dir());

    let mut pages = vec![
        (String::new(), pages::home(&shell, site)),
        ("resume".to_string(), pages::resume(&shell, site)),
        ("blogs".to_string(), pages::blog_index(&shell, site, None)),
        ("404.html".to_string(), pages::not_found(&shell, &content.not_found, "")),
    ];
    for slug in &content.slugs {
        let markdown = store
            .load_content(slug.as_str())
            .await
            .with_context(|| format!("failed to load post `{slug}`"))?;
        let html = pages::blog_post(&shell, site, slug.as_str(), &markdown);
        pages.push((format!("blogs/{slug}"), html));
    }

    let staging = staging_dir(out_dir)?;
    if fs::try_exists(&staging).await? {
        fs::remove_dir_all(&staging).await?;
    }
    let assets = match write_tree(&staging, &pages, &config.static_dir()).await {
        Ok(assets) => assets,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging).await;
            return Err(e);
        }
    };

    if fs::try_exists(out_dir).await? {
        fs::remove_dir_all(out_dir)
            .await
            .with_context(|| format!("failed to clear `{}`", out_dir.display()))?;
    }
    fs::rename(&staging, out_dir)
        .await
        .with_context(|| format!("failed to move export into `{}`", out_dir.display()))?;

    let report = ExportReport {
        pages: pages.len(),
        assets,
    };
    info!(pages = report.pages, assets = report.assets, "Export finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_site;

    #[tokio::test]
    async fn writes_every_route_and_asset() {
        let site = write_site();
        let out = tempfile::tempdir().unwrap();

        let report = export(&Config::new(site.path()), out.path()).await.unwrap();
        assert_eq!(report, ExportReport { pages: 6, assets: 1 });

        for file in [
            "index.html",
            "resume/index.html",
            "blogs/index.html",
            "blogs/clean-code/index.html",
            "blogs/apache-kafka-concepts/index.html",
            "404.html",
            "static/css/site.css",
        ] {
            assert!(out.path().join(file).is_file(), "{file} missing");
        }

        let post = std::fs::read_to_string(out.path().join("blogs/clean-code/index.html")).unwrap();
        assert!(post.contains("<h1>Hello</h1>"));
        assert!(!post.contains("WebSocket"));
    }

    #[tokio::test]
    async fn missing_posts_directory_aborts() {
        let site = write_site();
        std::fs::remove_dir_all(site.path().join("posts")).unwrap();
        let out = tempfile::tempdir().unwrap();

        assert!(export(&Config::new(site.path()), out.path()).await.is_err());
        assert!(!out.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn unreadable_post_aborts_without_touching_the_output() {
        let site = write_site();
        std::fs::write(site.path().join("posts/broken.md"), [0xff, 0xfe]).unwrap();
        let parent = tempfile::tempdir().unwrap();
        let out = parent.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("index.html"), "previous build").unwrap();

        let err = export(&Config::new(site.path()), &out).await.unwrap_err();
        assert!(format!("{err:#}").contains("broken"));

        assert_eq!(std::fs::read_to_string(out.join("index.html")).unwrap(), "previous build");
        assert!(!out.join("blogs").exists());
        assert!(!parent.path().join(".out.staging").exists());
    }

    #[tokio::test]
    async fn files_from_earlier_runs_are_removed() {
        let site = write_site();
        let parent = tempfile::tempdir().unwrap();
        let out = parent.path().join("out");
        std::fs::create_dir_all(out.join("blogs/deleted-post")).unwrap();
        std::fs::write(out.join("blogs/deleted-post/index.html"), "stale").unwrap();

        export(&Config::new(site.path()), &out).await.unwrap();

        assert!(!out.join("blogs/deleted-post").exists());
        assert!(out.join("blogs/clean-code/index.html").is_file());
        assert!(!parent.path().join(".out.staging").exists());
    }

    #[test]
    fn staging_sits_next_to_the_output() {
        let staging = staging_dir(Path::new("site/public")).unwrap();
        assert_eq!(staging, Path::new("site/.public.staging"));
        assert!(staging_dir(Path::new("/")).is_err());
    }
}
