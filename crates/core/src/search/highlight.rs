//! Match scanning and HTML highlight fragments.

use regex::Regex;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build a case-insensitive literal matcher for `query`.
///
/// Returns `None` only when the query is too large to compile.
pub fn matcher(query: &str) -> Option<Regex> {
    regex::RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| tracing::warn!(error = %e, "query could not be compiled"))
        .ok()
}

/// Highlight every match of `matcher` in `line`.
///
/// Returns the number of non-overlapping matches and the escaped fragment
/// with each match wrapped in `<mark>`, or `None` when nothing matched.
pub fn highlight_line(matcher: &Regex, line: &str) -> Option<(usize, String)> {
    let mut html = String::with_capacity(line.len() + 16);
    let mut cursor = 0;
    let mut count = 0;

    for m in matcher.find_iter(line) {
        // An empty pattern would match between every character.
        if m.is_empty() {
            continue;
        }
        html.push_str(&escape_html(&line[cursor..m.start()]));
        html.push_str(MARK_OPEN);
        html.push_str(&escape_html(m.as_str()));
        html.push_str(MARK_CLOSE);
        cursor = m.end();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    html.push_str(&escape_html(&line[cursor..]));
    Some((count, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_marks(html: &str) -> String {
        html.replace(MARK_OPEN, "").replace(MARK_CLOSE, "")
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_highlight_case_insensitive() {
        let m = matcher("rust").unwrap();
        let (count, html) = highlight_line(&m, "Rust is RUST and rust").unwrap();
        assert_eq!(count, 3);
        assert_eq!(html, "<mark>Rust</mark> is <mark>RUST</mark> and <mark>rust</mark>");
    }

    #[test]
    fn test_highlight_non_overlapping() {
        let m = matcher("aa").unwrap();
        let (count, html) = highlight_line(&m, "aaaaa").unwrap();
        assert_eq!(count, 2);
        assert_eq!(html, "<mark>aa</mark><mark>aa</mark>a");
    }

    #[test]
    fn test_highlight_escapes_inside_and_outside_marks() {
        let m = matcher("<b>").unwrap();
        let (count, html) = highlight_line(&m, "use <b> & <B> tags").unwrap();
        assert_eq!(count, 2);
        assert_eq!(html, "use <mark>&lt;b&gt;</mark> &amp; <mark>&lt;B&gt;</mark> tags");
    }

    #[test]
    fn test_highlight_round_trip() {
        let lines = [
            "Fast <grep> & \"friends\" it's grep",
            "grep",
            "GREP at the end: grep",
            "no markup in grepgrepgrep",
        ];
        let m = matcher("grep").unwrap();
        for line in lines {
            let (_, html) = highlight_line(&m, line).unwrap();
            assert_eq!(strip_marks(&html), escape_html(line), "round trip failed for {line:?}");
        }
    }

    #[test]
    fn test_highlight_query_with_regex_metacharacters() {
        let m = matcher("a.b*").unwrap();
        assert!(highlight_line(&m, "axbbb").is_none());
        let (count, _) = highlight_line(&m, "see a.b* here").unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_highlight_unicode() {
        let m = matcher("straße").unwrap();
        let (count, html) = highlight_line(&m, "Die STRASSE und die Straße").unwrap();
        assert_eq!(count, 1);
        assert_eq!(html, "Die STRASSE und die <mark>Straße</mark>");
    }

    #[test]
    fn test_no_match() {
        let m = matcher("tokio").unwrap();
        assert!(highlight_line(&m, "async runtime").is_none());
    }
}
