//! README markdown to searchable plain-text lines.
//!
//! Normalization is a fixed, ordered list of regex substitutions. Structural
//! passes (headings, fences, footnote definitions) run before inline passes
//! (images, links, HTML, emphasis), because the inline patterns assume the
//! structural noise is already gone. Do not reorder [`PASSES`] casually.

use regex::Regex;
use std::sync::LazyLock;

/// Pass list: (name, pattern, replacement).
///
/// Applied top to bottom to the whole document.
const PASSES: &[(&str, &str, &str)] = &[
    // # Title
    ("heading", r"(?m)^#+[ \t]*(.*)$", "${1}"),
    // =====
    ("heading_rule_equals", r"(?m)^=+[ \t]*$", ""),
    // -----
    ("heading_rule_dashes", r"(?m)^-+[ \t]*$", ""),
    // ```rust
    ("code_fence", r"(?m)^[ \t]*(?:```|~~~).*$", ""),
    // [label]: http://example.com
    ("footnote_definition", r"(?m)^ *\[.+?\]: *.*$", ""),
    // ![alt](http://example.com/image.png)
    ("image", r"!\[[^\]]*\] *\([^)]*\)", ""),
    // [text](http://example.com)
    ("link", r"\[([^\]]*)\] *\([^)]*\)", "${1}"),
    // [text][label]
    ("footnote_link", r"\[([^\]]+)\]\[[^\]]*\]", "${1}"),
    // <a href="http://example.com">text</a>
    ("html_anchor", r"(?is)<a\s[^>]*>(.*?)</a>", "${1}"),
    // <img src="http://example.com/image.png">
    ("html_image", r"(?i)<img\s[^>]*>", ""),
    // <!-- comment -->
    ("html_comment", r"(?s)<!--.*?-->", ""),
    // __bold__
    ("bold_underscore", r"__([^\s_](?:.*?[^\s_])?)__", "${1}"),
    // **bold**
    ("bold_asterisk", r"\*\*([^\s*](?:.*?[^\s*])?)\*\*", "${1}"),
    // _italic_
    ("italic_underscore", r"_([^\s_](?:.*?[^\s_])?)_", "${1}"),
    // *italic*
    ("italic_asterisk", r"\*([^\s*](?:.*?[^\s*])?)\*", "${1}"),
    // `code`
    ("inline_code", r"`([^`\n]*)`", "${1}"),
];

struct Pass {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

static COMPILED: LazyLock<Vec<Pass>> = LazyLock::new(|| {
    PASSES
        .iter()
        .map(|&(name, pattern, replacement)| Pass {
            name,
            pattern: Regex::new(pattern).expect("markdown pass pattern must compile"),
            replacement,
        })
        .collect()
});

/// Strip markdown syntax, returning the plain text with line breaks intact.
pub fn strip(markdown: &str) -> String {
    let mut text = markdown.replace("\r\n", "\n").replace('\r', "\n");

    for pass in COMPILED.iter() {
        let replaced = pass.pattern.replace_all(&text, pass.replacement);
        if let std::borrow::Cow::Owned(owned) = replaced {
            tracing::trace!(pass = pass.name, "markdown pass applied");
            text = owned;
        }
    }

    text
}

/// Normalize a README into non-empty plain-text lines.
pub fn normalize(markdown: &str) -> Vec<String> {
    strip(markdown)
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_passes_compile() {
        assert_eq!(COMPILED.len(), PASSES.len());
    }

    #[test]
    fn test_headings() {
        assert_eq!(normalize("# Title\n## Sub title\nbody"), vec!["Title", "Sub title", "body"]);
        assert_eq!(normalize("Title\n=====\nSub\n-----\nbody"), vec!["Title", "Sub", "body"]);
    }

    #[test]
    fn test_code_fences_removed_but_code_kept() {
        let md = "intro\n```rust\nfn main() {}\n```\n~~~\nplain\n~~~";
        assert_eq!(normalize(md), vec!["intro", "fn main() {}", "plain"]);
    }

    #[test]
    fn test_footnote_definitions_removed() {
        let md = "See [the docs][docs].\n\n[docs]: https://docs.rs\n  [other]: http://example.com \"title\"";
        assert_eq!(normalize(md), vec!["See the docs."]);
    }

    #[test]
    fn test_images_removed_entirely() {
        assert_eq!(normalize("before ![logo alt](logo.png) after"), vec!["before  after"]);
    }

    #[test]
    fn test_badge_link_around_image() {
        assert_eq!(normalize("[![Build](https://ci/badge.svg)](https://ci) Fast"), vec![" Fast"]);
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(normalize("Use [ripgrep](https://github.com/BurntSushi/ripgrep) today"), vec!["Use ripgrep today"]);
        assert_eq!(normalize("A [multi\nline](http://x) link"), vec!["A multi", "line link"]);
    }

    #[test]
    fn test_link_does_not_swallow_unrelated_brackets() {
        assert_eq!(normalize("[x] done and [docs](http://x)"), vec!["[x] done and docs"]);
    }

    #[test]
    fn test_html_tags() {
        let md = r#"<a href="https://example.com">Example</a> <img src="a.png" /> <!-- hidden
comment --> tail"#;
        assert_eq!(normalize(md), vec!["Example   tail"]);
        assert_eq!(normalize(r#"<A HREF="x">Upper</A><IMG SRC="y">"#), vec!["Upper"]);
    }

    #[test]
    fn test_emphasis_and_code() {
        let md = "__bold__ and **strong** and _em_ and *it* and `code` and ***both***";
        assert_eq!(normalize(md), vec!["bold and strong and em and it and code and both"]);
    }

    #[test]
    fn test_single_character_emphasis() {
        assert_eq!(normalize("a *b* c _d_"), vec!["a b c d"]);
    }

    #[test]
    fn test_empty_emphasis_pairs_are_left_alone() {
        assert_eq!(normalize("__ __"), vec!["__ __"]);
        assert_eq!(normalize("** **"), vec!["** **"]);
        assert_eq!(normalize("2 * 3 * 4"), vec!["2 * 3 * 4"]);
        assert_eq!(normalize("a _ b _ c"), vec!["a _ b _ c"]);
    }

    #[test]
    fn test_list_bullets_survive() {
        assert_eq!(normalize("* one\n* two"), vec!["* one", "* two"]);
        assert_eq!(normalize("- one\n- two"), vec!["- one", "- two"]);
    }

    #[test]
    fn test_blank_lines_dropped_and_crlf_handled() {
        assert_eq!(normalize("one\r\n\r\n   \r\ntwo\rthree"), vec!["one", "two", "three"]);
        assert!(normalize("").is_empty());
        assert!(normalize("\n\n\n").is_empty());
    }

    #[test]
    fn test_idempotent_on_normalized_text() {
        let md = "# Tool\n\nSome **bold** and _italic_ text with `code`.\n\n- item with [a link](http://x)\n\
                  ![img](a.png)\n<a href=\"x\">anchor</a> <!-- c -->\n```\nlet x = 1;\n```\n";
        let once = normalize(md);
        let twice = normalize(&once.join("\n"));
        assert_eq!(once, twice);
        for line in &once {
            assert!(!line.starts_with('#'));
            assert!(!line.contains("**"));
            assert!(!line.contains("]("));
        }
    }
}
