//! `site.toml`: profile, blog summaries and resume in one place.

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::{error::SiteError, posts::Slug};

#[derive(Deserialize, Debug, Clone)]
pub struct SiteData {
    pub profile: Profile,
    #[serde(default)]
    pub posts: Vec<PostSummary>,
    #[serde(default)]
    pub resume: Resume,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub handle: String,
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub headline: String,
    pub bio: String,
    pub github: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
}

/// One labelled line in the home page side column, e.g. "Currently".
#[derive(Deserialize, Debug, Clone)]
pub struct Fact {
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PostSummary {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub published_at: NaiveDate,
    pub updated_at: NaiveDate,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Resume {
    #[serde(default)]
    pub work: Vec<ResumeEntry>,
    #[serde(default)]
    pub education: Vec<ResumeEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Resume {
    pub fn is_empty(&self) -> bool {
        self.work.is_empty() && self.education.is_empty() && self.skills.is_empty()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResumeEntry {
    pub title: String,
    pub organisation: String,
    pub period: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl SiteData {
    pub async fn load(path: &Path) -> Result<Self, SiteError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SiteError::Io(path.to_path_buf(), e))?;
        Self::parse(&text)
    }

    /// Parses and validates, then orders posts newest first.
    pub fn parse(text: &str) -> Result<Self, SiteError> {
        let mut site: SiteData = toml::from_str(text)?;

        site.validate()?;

        site.posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(site)
    }

    fn validate(&self) -> Result<(), SiteError> {
        let mut seen = HashSet::new();
        for post in &self.posts {
            if post.title.trim().is_empty() {
                return Err(SiteError::Validation(format!(
                    "post `{}` has an empty title",
                    post.slug
                )));
            }
            Slug::parse(&post.slug).map_err(|_| {
                SiteError::Validation(format!("post slug `{}` is not a valid slug", post.slug))
            })?;
            if !seen.insert(post.slug.as_str()) {
                return Err(SiteError::Validation(format!(
                    "post slug `{}` is listed more than once",
                    post.slug
                )));
            }
        }
        Ok(())
    }

    pub fn find(&self, slug: &str) -> Option<&PostSummary> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn latest(&self, n: usize) -> &[PostSummary] {
        &self.posts[..n.min(self.posts.len())]
    }

    /// Case-insensitive match over title and summary.
    pub fn search(&self, query: &str) -> Vec<&PostSummary> {
        let needle = query.trim().to_lowercase();
        self.posts
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.title.to_lowercase().contains(&needle)
                    || p.summary.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Logs listing entries and markdown files that do not line up.
    /// Returns the number of mismatches found.
    pub fn report_drift(&self, slugs: &[Slug]) -> usize {
        let on_disk: HashSet<&str> = slugs.iter().map(Slug::as_str).collect();
        let listed: HashSet<&str> = self.posts.iter().map(|p| p.slug.as_str()).collect();

        let mut mismatches = 0;
        for slug in listed.difference(&on_disk) {
            warn!(%slug, "listed post has no markdown file");
            mismatches += 1;
        }
        for slug in on_disk.difference(&listed) {
            warn!(%slug, "markdown post is missing from the listing");
            mismatches += 1;
        }
        mismatches
    }
}
