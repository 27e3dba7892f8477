//! Markdown rendering for completion text.
//!
//! GitHub-flavoured markdown with raw HTML disabled, so anything tag-like in
//! the provider output is escaped rather than rendered.

use markdown::{to_html_with_options, Options};

fn options() -> Options {
    let mut options = Options::gfm();
    options.compile.allow_dangerous_html = false;
    options.compile.allow_dangerous_protocol = false;
    options
}

/// Render completion text as an HTML fragment.
pub fn render_markdown(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    // Only MDX syntax can fail to parse, and it is off in GFM.
    to_html_with_options(trimmed, &options()).unwrap_or_else(|_| markdown::to_html(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_html_is_not_rendered() {
        let html = render_markdown("<img src=x onerror=alert(1)>\n\n<script>alert(1)</script>");
        assert!(!html.contains("<img"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn javascript_links_are_neutralised() {
        let html = render_markdown("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn bold_and_italic() {
        let html = render_markdown("This is **important** and *gentle*.");
        assert!(html.contains("<strong>important</strong>"));
        assert!(html.contains("<em>gentle</em>"));
    }

    #[test]
    fn nested_emphasis() {
        let html = render_markdown("***both*** and __bold__");
        assert!(html.contains("<em><strong>both</strong></em>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn section_headings() {
        let html = render_markdown("### 💬 One-sentence Summary\nAll clear.");
        assert!(html.contains("<h3>💬 One-sentence Summary</h3>"));
        assert!(html.contains("<p>All clear.</p>"));
    }

    #[test]
    fn bullet_and_numbered_lists() {
        let html = render_markdown("Intro\n\n- a\n- b\n\n1. first\n2. second");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>a</li>"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>second</li>"));
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(render_markdown(""), "");
        assert_eq!(render_markdown("\n\n"), "");
    }
}
