pub mod articles;
pub mod classify;
pub mod html;
pub mod paragraphs;
pub mod schema;

use classify::SegmentType;
use schema::{Source, Table};

/// Read access to one record's named fields.
pub trait FieldSource {
    /// The field's text, or `""` when the record has no such field.
    fn field(&self, name: &str) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteRow {
    /// Values in schema column order.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRow {
    pub meta_id: String,
    pub gazette_id: String,
    pub line_no: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub meta_id: String,
    pub gazette_id: String,
    pub article_no: String,
    pub title_line: String,
    pub line_start: usize,
    pub line_end: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSegmentRow {
    pub source_file: String,
    pub page: usize,
    pub segment_no: usize,
    pub segment_type: SegmentType,
    pub text: String,
}

/// Everything one gazette record contributes to the output tables.
#[derive(Debug, Clone)]
pub struct GazetteDocument {
    pub gazette: GazetteRow,
    pub lines: Vec<LineRow>,
    pub articles: Vec<ArticleRow>,
}

/// Two-pass pipeline per record: HTML → text → lines + articles.
pub struct GazetteDocumentBuilder {
    schema: Table,
}

impl GazetteDocumentBuilder {
    pub fn new(schema: Table) -> Self {
        Self { schema }
    }

    pub fn build<R: FieldSource + ?Sized>(&self, record: &R) -> GazetteDocument {
        let text = html::html_to_text(record.field(schema::HTML_FIELD));

        let values = self
            .schema
            .columns
            .iter()
            .map(|col| match col.source {
                Source::Field(name) => record.field(name).to_string(),
                Source::HtmlText => text.clone(),
                Source::Computed => String::new(),
            })
            .collect();

        let meta_id = record.field(schema::META_ID);
        let gazette_id = record.field(schema::GAZETTE_ID);

        let text_lines = articles::split_lines(&text);
        let article_rows = articles::scan_articles(&text_lines)
            .into_iter()
            .map(|a| ArticleRow {
                meta_id: meta_id.to_string(),
                gazette_id: gazette_id.to_string(),
                article_no: a.article_no,
                title_line: a.title_line,
                line_start: a.line_start,
                line_end: a.line_end,
                text: a.text,
            })
            .collect();
        let line_rows = text_lines
            .into_iter()
            .map(|l| LineRow {
                meta_id: meta_id.to_string(),
                gazette_id: gazette_id.to_string(),
                line_no: l.line_no,
                text: l.text,
            })
            .collect();

        GazetteDocument {
            gazette: GazetteRow { values },
            lines: line_rows,
            articles: article_rows,
        }
    }
}

/// Per-page pipeline for PDF text: lines → paragraphs → labelled segments.
pub struct PdfDocumentBuilder {
    source_file: String,
}

impl PdfDocumentBuilder {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
        }
    }

    /// Segment one page. Blank pages yield nothing; numbering restarts per page.
    pub fn build_page(&self, page: usize, text: &str) -> Vec<PdfSegmentRow> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let raw_lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        paragraphs::merge_paragraphs(raw_lines)
            .enumerate()
            .map(|(i, segment)| {
                let segment_no = i + 1;
                PdfSegmentRow {
                    source_file: self.source_file.clone(),
                    page,
                    segment_no,
                    segment_type: classify::classify_segment(&segment, page, segment_no),
                    text: segment,
                }
            })
            .collect()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapRecord(HashMap<&'static str, &'static str>);

    impl FieldSource for MapRecord {
        fn field(&self, name: &str) -> &str {
            self.0.get(name).copied().unwrap_or("")
        }
    }

    fn record(html: &'static str) -> MapRecord {
        MapRecord(HashMap::from([
            ("MetaId", "M1"),
            ("GazetteId", "G1"),
            ("Title", "測試公報"),
            ("HTMLContent", html),
        ]))
    }

    #[test]
    fn scenario_two_articles() {
        let builder = GazetteDocumentBuilder::new(schema::GAZETTE);
        let doc = builder.build(&record("第一條<br>內容一<br>第二條<br>內容二"));

        let got: Vec<_> = doc
            .articles
            .iter()
            .map(|a| (a.article_no.as_str(), a.title_line.as_str(), a.line_start, a.line_end, a.text.as_str()))
            .collect();
        assert_eq!(got, vec![("一", "第一條", 1, 2, "內容一"), ("二", "第二條", 3, 4, "內容二")]);
        assert!(doc.articles.iter().all(|a| a.meta_id == "M1" && a.gazette_id == "G1"));
        assert_eq!(doc.lines.len(), 4);
    }

    #[test]
    fn gazette_row_follows_schema() {
        let builder = GazetteDocumentBuilder::new(schema::GAZETTE);
        let doc = builder.build(&record("<p>第一條</p><br/>內容"));
        let row = doc.gazette;

        assert_eq!(row.values.len(), schema::GAZETTE.columns.len());
        assert_eq!(row.values[0], "M1");
        assert_eq!(row.values[10], "G1");
        assert_eq!(row.values[11], "測試公報");
        // Absent fields read as empty.
        assert_eq!(row.values[1], "");
        assert_eq!(row.values[18], "第一條\n內容");
    }

    #[test]
    fn empty_html_gives_no_lines() {
        let builder = GazetteDocumentBuilder::new(schema::GAZETTE);
        let doc = builder.build(&record(""));
        assert!(doc.lines.is_empty());
        assert!(doc.articles.is_empty());
        assert_eq!(doc.gazette.values[18], "");
    }

    #[test]
    fn blank_breaks_collapse_before_numbering() {
        let builder = GazetteDocumentBuilder::new(schema::GAZETTE);
        // A full-width space counts as whitespace around the newlines.
        let doc = builder.build(&record("前言<br>　<br><br>第一條<br>內容"));
        let numbers: Vec<usize> = doc.lines.iter().map(|l| l.line_no).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!((doc.articles[0].line_start, doc.articles[0].line_end), (2, 3));
    }

    #[test]
    fn scenario_first_page_is_all_header() {
        let builder = PdfDocumentBuilder::new("gazette.pdf");
        let segs = builder.build_page(1, "第1頁標題\n一、項目一。\n內文。");

        let got: Vec<_> = segs.iter().map(|s| (s.segment_no, s.segment_type, s.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (1, SegmentType::Header, "第1頁標題一、項目一。"),
                (2, SegmentType::Header, "內文。"),
            ]
        );
        assert!(segs.iter().all(|s| s.page == 1 && s.source_file == "gazette.pdf"));
    }

    #[test]
    fn later_page_labels() {
        let builder = PdfDocumentBuilder::new("gazette.pdf");
        let segs = builder.build_page(2, "一、項目一。\n內文。\n\n第三條 本法\n所稱公報：\n(一)紙本\n");

        let got: Vec<_> = segs.iter().map(|s| (s.segment_no, s.segment_type)).collect();
        assert_eq!(
            got,
            vec![
                (1, SegmentType::Item),
                (2, SegmentType::Body),
                (3, SegmentType::ArticleTitle),
                (4, SegmentType::SubItem),
            ]
        );
        assert_eq!(segs[2].text, "第三條 本法所稱公報：");
    }

    #[test]
    fn blank_page_yields_nothing() {
        let builder = PdfDocumentBuilder::new("x.pdf");
        assert!(builder.build_page(3, "  \n\n ").is_empty());
    }
}
