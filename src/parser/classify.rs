use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::articles::is_article_title;

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[一二三四五六七八九十]+\s*、").unwrap());
static SUB_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[（(]?[一二三四五六七八九十0-9]+[)）．.、]").unwrap());

/// Number of leading segments on the first page treated as the header.
const HEADER_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Header,
    ArticleTitle,
    Item,
    SubItem,
    Body,
}

impl SegmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Header => "Header",
            SegmentType::ArticleTitle => "ArticleTitle",
            SegmentType::Item => "Item",
            SegmentType::SubItem => "SubItem",
            SegmentType::Body => "Body",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a merged PDF segment. Rules are tried in order; first match wins.
///
/// Only the article-title rule tolerates leading whitespace; item markers must
/// start the segment.
pub fn classify_segment(text: &str, page: usize, segment_no: usize) -> SegmentType {
    if page == 1 && segment_no <= HEADER_SEGMENTS {
        return SegmentType::Header;
    }
    if is_article_title(text) {
        return SegmentType::ArticleTitle;
    }
    // 一、 二、 三、
    if ITEM_RE.is_match(text) {
        return SegmentType::Item;
    }
    // (一) 1) 2.
    if SUB_ITEM_RE.is_match(text) {
        return SegmentType::SubItem;
    }
    SegmentType::Body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_three_on_page_one_are_header() {
        for seg in 1..=3 {
            assert_eq!(classify_segment("第一條", 1, seg), SegmentType::Header);
        }
        assert_eq!(classify_segment("第一條", 1, 4), SegmentType::ArticleTitle);
        assert_eq!(classify_segment("內文。", 2, 1), SegmentType::Body);
    }

    #[test]
    fn article_title() {
        assert_eq!(classify_segment("第十二條 本法所稱", 2, 1), SegmentType::ArticleTitle);
        assert_eq!(classify_segment("  第3條", 2, 1), SegmentType::ArticleTitle);
    }

    #[test]
    fn item() {
        assert_eq!(classify_segment("一、項目一。", 2, 1), SegmentType::Item);
        assert_eq!(classify_segment("十一 、項目", 2, 1), SegmentType::Item);
    }

    #[test]
    fn sub_item() {
        for t in ["(一)說明", "（二）說明", "1)說明", "2.說明", "3．說明", "四)說明", "5、說明"] {
            assert_eq!(classify_segment(t, 2, 1), SegmentType::SubItem, "{}", t);
        }
    }

    #[test]
    fn body() {
        for t in ["一般內文。", "依第三條規定", "第1頁標題", "(甲)說明", "百、說明"] {
            assert_eq!(classify_segment(t, 2, 1), SegmentType::Body, "{}", t);
        }
    }

    #[test]
    fn header_wins_over_article_title() {
        assert_eq!(classify_segment("第一條、總則", 1, 2), SegmentType::Header);
        assert_eq!(classify_segment("第一條、總則", 2, 2), SegmentType::ArticleTitle);
    }

    #[test]
    fn leading_whitespace_is_not_an_item() {
        assert_eq!(classify_segment("  一、項目", 2, 1), SegmentType::Body);
        assert_eq!(classify_segment(" (一)說明", 2, 1), SegmentType::Body);
        assert_eq!(classify_segment("\t1.說明", 2, 1), SegmentType::Body);
        assert_eq!(classify_segment("  第3條", 2, 1), SegmentType::ArticleTitle);
    }

    #[test]
    fn item_wins_over_sub_item() {
        // `三、` satisfies both item and sub-item patterns.
        assert_eq!(classify_segment("三、", 2, 1), SegmentType::Item);
    }

    #[test]
    fn display_names() {
        assert_eq!(SegmentType::ArticleTitle.to_string(), "ArticleTitle");
        assert_eq!(SegmentType::SubItem.as_str(), "SubItem");
    }
}
