use std::fs;

use tempfile::TempDir;

pub const LAYOUT: &str = "<!doctype html><html><head><title>{{ title }}</title>\
<meta name=\"description\" content=\"{{ description }}\"></head>\
<body><header>{{ avatar }}<a href=\"/\">{{ handle }}</a>\
<nav><a href=\"/resume\">Resume</a><a href=\"/blogs\">Blogs</a><a href=\"{{ github }}\">GitHub</a></nav>\
</header><main>{{ content }}</main></body></html>";

pub const NOT_FOUND: &str = "<h1>404</h1><p>Nothing lives at <code>{{ path }}</code>.</p>";

pub const SITE: &str = r#"
[profile]
name = "Prabin Kumar Shrestha"
handle = "prabinkshrestha"
description = "Software Engineer"
headline = "Software Engineer"
bio = "Builds things."
github = "https://github.com/prabinkshrestha"

[[posts]]
title = "Concept of Apache Kafka"
slug = "apache-kafka-concepts"
summary = "Topics and partitions."
published_at = "2025-06-12"
updated_at = "2025-06-18"

[[posts]]
title = "How to write clean code?"
slug = "clean-code"
summary = "Naming and small functions."
published_at = "2025-06-01"
updated_at = "2025-06-15"

[resume]
skills = ["Rust"]
"#;

/// A complete content directory with two posts and a stylesheet.
pub fn write_site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("layout.html"), LAYOUT).unwrap();
    fs::write(root.join("not_found.html"), NOT_FOUND).unwrap();
    fs::write(root.join("site.toml"), SITE).unwrap();

    fs::create_dir(root.join("posts")).unwrap();
    fs::write(root.join("posts/clean-code.md"), "# Hello").unwrap();
    fs::write(
        root.join("posts/apache-kafka-concepts.md"),
        "# Kafka\n\nA topic is split into *partitions*.\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("static/css")).unwrap();
    fs::write(root.join("static/css/site.css"), "body { margin: 0; }").unwrap();

    dir
}
