use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// HTML for one markdown document plus the text of its first `#` heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub title: Option<String>,
    pub html: String,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_MATH);
    options
}

pub fn render_markdown(markdown: &str) -> Rendered {
    let normalized_markdown = normalize_latex_delimiters(markdown);

    let mut title: Option<String> = None;
    let mut in_first_h1 = false;

    let parser = Parser::new_ext(&normalized_markdown, markdown_options()).map(|event| {
        match &event {
            Event::Start(Tag::Heading { level: HeadingLevel::H1, .. }) if title.is_none() => {
                in_first_h1 = true;
                title = Some(String::new());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => in_first_h1 = false,
            Event::Text(text) | Event::Code(text) if in_first_h1 => {
                if let Some(title) = title.as_mut() {
                    title.push_str(text);
                }
            }
            _ => {}
        }

        match event {
            Event::InlineMath(math) => html_event(render_math_html(&math, false)),
            Event::DisplayMath(math) => html_event(render_math_html(&math, true)),
            // Posts are prose; embedded HTML is shown, not executed.
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        }
    });

    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);

    Rendered {
        title: title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        html: html_out,
    }
}

fn html_event(html: String) -> Event<'static> {
    Event::Html(CowStr::Boxed(html.into_boxed_str()))
}

/// Rewrites `\( .. \)` and `\[ .. \]` into the `$` forms pulldown-cmark
/// understands. Multi-line inline math is promoted to display math.
fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                let fence = if display_mode || content.contains('\n') { "$$" } else { "$" };
                out.push_str(fence);
                out.push_str(content);
                out.push_str(fence);
                i = content_end + close.len();
                continue;
            }
        }

        match input[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let rendered = katex::Opts::builder()
        .display_mode(display_mode)
        .build()
        .ok()
        .and_then(|opts| katex::render_with_opts(source, opts).ok());

    rendered.unwrap_or_else(|| fallback_math_html(source, display_mode))
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!(
        "<span class=\"{class_name}\">{}</span>",
        htmlescape::encode_minimal(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_math_with_latex_paren_and_bracket_delimiters() {
        let output = render_markdown("\\(x^2\\) and \\[y^2\\]");
        assert!(output.html.contains("katex"));
    }

    #[test]
    fn renders_multiline_paren_delimited_math() {
        let input = "Start \\( \\frac{2.24T}{2.08T}\n\\approx 1.077 \\) end";
        assert!(render_markdown(input).html.contains("katex"));
    }

    #[test]
    fn first_level_one_heading_becomes_the_title() {
        let output = render_markdown("intro\n\n# How to write `clean` code?\n\n# Second\n");
        assert_eq!(output.title.as_deref(), Some("How to write clean code?"));
    }

    #[test]
    fn lower_headings_do_not_become_the_title() {
        let output = render_markdown("## Only a subheading\n\nbody");
        assert_eq!(output.title, None);
    }

    #[test]
    fn raw_html_is_escaped() {
        let output = render_markdown("<script>alert(1)</script>\n\nhi <b>there</b>");
        assert!(!output.html.contains("<script>"));
        assert!(output.html.contains("&lt;script&gt;"));
        assert!(!output.html.contains("<b>"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let output = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(output.html.contains("<table>"));
        assert!(output.html.contains("<del>gone</del>"));
    }

    #[test]
    fn math_fallback_escapes_source() {
        let html = fallback_math_html("a < b", false);
        assert_eq!(html, "<span class=\"math math-inline\">a &lt; b</span>");
    }

    #[test]
    fn renders_math_in_the_kafka_post() {
        let post = include_str!("../content/posts/apache-kafka-concepts.md");
        let output = render_markdown(post);
        assert!(output.html.contains("katex"));
        assert_eq!(output.title.as_deref(), Some("Concept of Apache Kafka"));
    }
}
