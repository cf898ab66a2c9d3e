//! Announcement Markdown
//!
//! Announcement bodies are written in Markdown by researchers and shown to
//! every teacher, so the pulldown-cmark event stream is filtered first:
//! - raw HTML blocks and inline HTML are shown as literal text
//! - links/images with a script-capable scheme lose their URL
//! - soft breaks become `<br>` (line breaks typed in the textarea stick)

use pulldown_cmark::{html::push_html, CowStr, Event, Options, Parser, Tag};

/// Render announcement Markdown to HTML safe for `inner_html`
pub fn render_announcement(text: &str) -> String {
    let parser = Parser::new_ext(text, get_options());
    let events = transform_events(parser);
    let mut html_output = String::new();
    push_html(&mut html_output, events.into_iter());
    html_output
}

/// One-line preview: first non-empty line, Markdown markers stripped
pub fn preview_line(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let plain: String = Parser::new(line)
        .filter_map(|event| match event {
            Event::Text(t) | Event::Code(t) => Some(t.into_string()),
            _ => None,
        })
        .collect();
    if plain.chars().count() > max_chars {
        let cut: String = plain.chars().take(max_chars).collect();
        format!("{}…", cut)
    } else {
        plain
    }
}

fn get_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

fn transform_events<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    parser
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::SoftBreak => Event::HardBreak,
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        })
        .collect()
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim().to_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        CowStr::from("#")
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = render_announcement("**注意** 本周停课");
        assert!(html.contains("<strong>注意</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_announcement("<script>alert(1)</script>\n\nhi <b>x</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_script_links_are_neutralised() {
        let html = render_announcement("[click](javascript:alert(1)) [ok](https://a.cn)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r#"href="https://a.cn""#));
    }

    #[test]
    fn test_soft_break_kept() {
        let html = render_announcement("第一行\n第二行");
        assert!(html.contains("<br />"));
    }

    #[test]
    fn test_preview_line() {
        assert_eq!(preview_line("\n## 标题 *重要*\n正文", 20), "标题 重要");
        assert_eq!(preview_line("abcdef", 3), "abc…");
    }
}
