//! Whitespace minification of rendered HTML.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Blocks whose content is whitespace-sensitive and copied verbatim.
static VERBATIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<pre\b.*?</pre\s*>|<textarea\b.*?</textarea\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>",
    )
    .unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\x00(\d+)>").unwrap());

/// Collapse whitespace runs to one space and trim the document.
///
/// A run between two tags becomes a single space rather than nothing, so
/// adjacent inline elements keep their separation.
#[must_use]
pub fn minify_html(html: &str) -> String {
    // Verbatim blocks are swapped for placeholders while collapsing.
    let mut verbatim: Vec<String> = Vec::new();
    let masked = VERBATIM_RE.replace_all(html, |caps: &Captures<'_>| {
        verbatim.push(caps[0].to_owned());
        format!("<\x00{}>", verbatim.len() - 1)
    });
    let collapsed = WHITESPACE_RE.replace_all(&masked, " ");

    PLACEHOLDER_RE
        .replace_all(collapsed.trim(), |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| verbatim.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::markdown::to_html;

    #[test]
    fn test_collapses_whitespace_between_tags() {
        assert_eq!(
            minify_html("<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>\n"),
            "<ul> <li>One</li> <li>Two</li> </ul>"
        );
    }

    #[test]
    fn test_adjacent_inline_elements_stay_separated() {
        assert_eq!(
            minify_html(&to_html("*hello* **world**")),
            "<p><em>hello</em> <strong>world</strong></p>"
        );
    }

    #[test]
    fn test_collapses_text_whitespace() {
        assert_eq!(
            minify_html("<p>Hello,\n    world   again</p>"),
            "<p>Hello, world again</p>"
        );
    }

    #[test]
    fn test_preserves_verbatim_blocks() {
        let html = "<div>\n  <pre>  keep\n    this</pre>\n  <script>\nlet a =  1;\n</script>\n</div>";
        assert_eq!(
            minify_html(html),
            "<div> <pre>  keep\n    this</pre> <script>\nlet a =  1;\n</script> </div>"
        );
    }

    #[test]
    fn test_verbatim_match_is_case_insensitive() {
        let html = "<PRE>a  b</PRE>  <p>c   d</p>";
        assert_eq!(minify_html(html), "<PRE>a  b</PRE> <p>c d</p>");
    }
}
