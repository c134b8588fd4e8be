//! Markdown to HTML conversion.

use pulldown_cmark::{Options, Parser, html};

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Convert markdown text to an HTML fragment.
#[must_use]
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            to_html("# About\n\nWe build *sites*."),
            "<h1>About</h1>\n<p>We build <em>sites</em>.</p>\n"
        );
    }

    #[test]
    fn test_tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "{html}");
    }

    #[test]
    fn test_strikethrough_enabled() {
        assert_eq!(to_html("~~old~~"), "<p><del>old</del></p>\n");
    }
}
