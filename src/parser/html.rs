use std::sync::LazyLock;

use regex::Regex;

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_PAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Entity replacements, applied in order after tag stripping.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
];

/// Flatten an `HTMLContent` fragment into plain text, one `<br>` per line break.
///
/// This is a textual rewrite, not an HTML parser: tags are recognised as the
/// shortest `<...>` span, and only four entities are decoded. Never fails.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let with_breaks = BR_RE.replace_all(html, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");

    let mut text = stripped.into_owned();
    for &(entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    let text = HSPACE_RE.replace_all(&text, " ");
    let text = NEWLINE_PAD_RE.replace_all(&text, "\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn br_variants_become_newlines() {
        assert_eq!(html_to_text("a<br>b<BR/>c<br />d<Br  />e"), "a\nb\nc\nd\ne");
    }

    #[test]
    fn br_count_matches_line_count() {
        for n in 0..6 {
            let parts: Vec<String> = (0..=n).map(|i| format!("第{}段", i)).collect();
            let html = parts.join("<br/>");
            let text = html_to_text(&html);
            assert_eq!(text.split('\n').count(), n + 1, "{}", html);
        }
    }

    #[test]
    fn strips_tags_and_attributes() {
        let html = r#"<p class="x">第一條</p><span style="color:red">內容</span>"#;
        assert_eq!(html_to_text(html), "第一條內容");
    }

    #[test]
    fn entities_decoded_after_tag_stripping() {
        // The escaped tag must survive as literal text.
        assert_eq!(html_to_text("&lt;b&gt;粗體&lt;/b&gt;"), "<b>粗體</b>");
        assert_eq!(html_to_text("A&amp;B"), "A&B");
    }

    #[test]
    fn replacements_are_sequential() {
        // `&amp;` is rewritten before `&lt;`, so the result is decoded twice.
        assert_eq!(html_to_text("&amp;lt;"), "<");
        assert_eq!(html_to_text("&amp;nbsp;"), "&nbsp;");
    }

    #[test]
    fn nbsp_and_tabs_collapse() {
        assert_eq!(html_to_text("a&nbsp;&nbsp;\t b"), "a b");
    }

    #[test]
    fn whitespace_around_newlines_removed() {
        assert_eq!(html_to_text("  一  <br>   二 <br/>\t三  "), "一\n二\n三");
    }

    #[test]
    fn consecutive_breaks_collapse() {
        // `\s*\n\s*` swallows the neighbouring newline too.
        assert_eq!(html_to_text("一<br><br><br>二"), "一\n二");
    }

    #[test]
    fn unmatched_angle_bracket_passes_through() {
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn idempotent_on_plain_text() {
        let inputs = ["第一條\n內容", "  spaced   out  ", "a\n\n b", "純文字"];
        for x in inputs {
            let once = html_to_text(x);
            assert_eq!(html_to_text(&once), once);
        }
    }
}
