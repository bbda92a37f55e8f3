//! HTML for every route. Pure functions over site data and template text,
//! shared by the server and the static export.

use std::{borrow::Cow, fmt::Write};

use chrono::NaiveDate;
use htmlescape::encode_minimal;

use crate::{
    markdown::render_markdown,
    site::{PostSummary, Profile, ResumeEntry, SiteData},
};

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

/// How many posts the home page lists under "Latest from my blog".
pub const LATEST_POSTS: usize = 3;

/// The layout every page is wrapped in.
pub struct Shell<'a> {
    pub layout: &'a str,
    pub profile: &'a Profile,
    pub live_reload: bool,
}

impl Shell<'_> {
    /// Fills `{{ title }}`, `{{ description }}`, `{{ handle }}`,
    /// `{{ avatar }}`, `{{ github }}` and `{{ content }}`.
    pub fn page(&self, title: Option<&str>, content: &str) -> String {
        let full_title = match title {
            Some(title) => format!("{} | {}", title, self.profile.name),
            None => self.profile.name.clone(),
        };
        let avatar = self
            .profile
            .avatar
            .as_deref()
            .map(|src| {
                format!(
                    "<img class=\"avatar\" src=\"{}\" alt=\"{}\" width=\"36\" height=\"36\">",
                    encode_minimal(src),
                    encode_minimal(&self.profile.name)
                )
            })
            .unwrap_or_default();

        let mut page = fill_template(self.layout, |key| match key {
            "title" => Some(Cow::Owned(encode_minimal(&full_title))),
            "description" => Some(Cow::Owned(encode_minimal(&self.profile.description))),
            "handle" => Some(Cow::Owned(encode_minimal(&self.profile.handle))),
            "avatar" => Some(Cow::Borrowed(avatar.as_str())),
            "github" => Some(Cow::Owned(encode_minimal(&self.profile.github))),
            "content" => Some(Cow::Borrowed(content)),
            _ => None,
        });

        if self.live_reload {
            page = page.replacen("</body>", &format!("{HOT_RELOAD_SCRIPT}</body>"), 1);
        }
        page
    }
}

/// Single pass over `{{ key }}` placeholders, so substituted text is never
/// scanned again. Unknown keys are left as written.
pub fn fill_template<'v>(template: &str, lookup: impl Fn(&str) -> Option<Cow<'v, str>>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = after_open[..close].trim();
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    out.push_str(rest);
    out
}

fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn post_href(slug: &str) -> String {
    format!("/blogs/{}", encode_minimal(slug))
}

pub fn home(shell: &Shell, site: &SiteData) -> String {
    let profile = &site.profile;
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="home">
<section class="intro">
<h1>Hey, I&rsquo;m <br> {name}</h1>
<p class="headline">{headline}</p>
<p class="bio">{bio}</p>
<a class="button" href="{github}" target="_blank">Visit my GitHub</a>
</section>
<aside class="facts">
"#,
        name = encode_minimal(&profile.name),
        headline = encode_minimal(&profile.headline),
        bio = encode_minimal(&profile.bio),
        github = encode_minimal(&profile.github),
    );

    for fact in &profile.facts {
        let text = match &fact.link {
            Some(link) => format!(
                "<a href=\"{}\" target=\"_blank\">{}</a>",
                encode_minimal(link),
                encode_minimal(&fact.text)
            ),
            None => encode_minimal(&fact.text),
        };
        let _ = write!(
            body,
            "<div class=\"fact\"><p class=\"label\">{}</p><p>{}</p></div>\n",
            encode_minimal(&fact.label),
            text
        );
    }

    let latest = site.latest(LATEST_POSTS);
    if !latest.is_empty() {
        body.push_str("<div class=\"fact latest\"><p class=\"label\">Latest from my blog</p><ul>\n");
        for post in latest {
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a></li>",
                post_href(&post.slug),
                encode_minimal(&post.title)
            );
        }
        body.push_str("</ul></div>\n");
    }

    body.push_str("</aside>\n</div>");
    shell.page(None, &body)
}

fn resume_section(body: &mut String, heading: &str, entries: &[ResumeEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(body, "<section><h2>{}</h2>", encode_minimal(heading));
    for entry in entries {
        let _ = write!(
            body,
            "<div class=\"resume-entry\">\
<div class=\"resume-head\"><h3>{}</h3><span class=\"period\">{}</span></div>\
<p class=\"organisation\">{}</p><ul>",
            encode_minimal(&entry.title),
            encode_minimal(&entry.period),
            encode_minimal(&entry.organisation),
        );
        for detail in &entry.details {
            let _ = write!(body, "<li>{}</li>", encode_minimal(detail));
        }
        body.push_str("</ul></div>\n");
    }
    body.push_str("</section>\n");
}

pub fn resume(shell: &Shell, site: &SiteData) -> String {
    let resume = &site.resume;
    if resume.is_empty() {
        let body = "<div class=\"centered\">\
<h1>Coming Soon</h1>\
<p>I am working hard to launch something awesome. Stay tuned!</p>\
<a class=\"button\" href=\"/\">Take me Home</a></div>";
        return shell.page(Some("Resume"), body);
    }

    let mut body = String::from("<div class=\"resume\">\n");
    resume_section(&mut body, "Work Experience", &resume.work);
    resume_section(&mut body, "Education", &resume.education);

    if !resume.skills.is_empty() {
        body.push_str("<section><h2>Skills</h2><div class=\"skills\">");
        for skill in &resume.skills {
            let _ = write!(body, "<span class=\"skill\">{}</span>", encode_minimal(skill));
        }
        body.push_str("</div></section>\n");
    }

    body.push_str("</div>");
    shell.page(Some("Resume"), &body)
}

fn summary_card(body: &mut String, post: &PostSummary) {
    let _ = write!(
        body,
        "<article class=\"post-summary\">\
<h2><a href=\"{href}\">{title}</a></h2>\
<div class=\"dates\">Published: {published} | Updated: {updated}</div>\
<p>{summary}</p></article>\n",
        href = post_href(&post.slug),
        title = encode_minimal(&post.title),
        published = display_date(post.published_at),
        updated = display_date(post.updated_at),
        summary = encode_minimal(&post.summary),
    );
}

/// The listing page, optionally narrowed by a search query.
pub fn blog_index(shell: &Shell, site: &SiteData, query: Option<&str>) -> String {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let posts = site.search(query.unwrap_or_default());

    let mut body = String::new();
    let _ = write!(
        body,
        "<div class=\"blogs\">\
<h1>View My Blogs</h1>\
<form class=\"search\" action=\"/blogs\" method=\"get\">\
<input type=\"text\" name=\"q\" value=\"{}\" placeholder=\"Search bugs, topics, titles...\">\
</form>\n<div class=\"post-list\">\n",
        encode_minimal(query.unwrap_or_default())
    );

    if posts.is_empty() {
        match query {
            Some(q) => {
                let _ = write!(body, "<p class=\"empty\">No posts match &ldquo;{}&rdquo;.</p>", encode_minimal(q));
            }
            None => body.push_str("<p class=\"empty\">No posts yet.</p>"),
        }
    }
    for post in posts {
        summary_card(&mut body, post);
    }

    body.push_str("</div>\n</div>");
    shell.page(Some("Blogs"), &body)
}

/// A single post. The page title prefers the listing entry, then the first
/// heading of the document, then the slug.
pub fn blog_post(shell: &Shell, site: &SiteData, slug: &str, markdown: &str) -> String {
    let rendered = render_markdown(markdown);
    let title = site
        .find(slug)
        .map(|post| post.title.clone())
        .or(rendered.title)
        .unwrap_or_else(|| slug.to_string());

    let body = format!("<article class=\"prose\">\n{}</article>", rendered.html);
    shell.page(Some(&title), &body)
}

/// 404 body from `not_found.html`; `{{ path }}` is the requested path.
pub fn not_found(shell: &Shell, template: &str, path: &str) -> String {
    let body = fill_template(template, |key| match key {
        "path" => Some(Cow::Owned(encode_minimal(path))),
        _ => None,
    });
    shell.page(Some("Page not found"), &body)
}

pub fn server_error(shell: &Shell) -> String {
    let body = "<div class=\"centered\">\
<h1>Something went wrong</h1>\
<p>This page could not be loaded. Please try again later.</p>\
<a class=\"button\" href=\"/\">Take me Home</a></div>";
    shell.page(Some("Error"), body)
}
