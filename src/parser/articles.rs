use std::sync::LazyLock;

use regex::Regex;

/// `第X條` at the start of a line; X is kept exactly as written.
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*第\s*([一二三四五六七八九十零〇百千0-9]+)\s*條").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// 1-based position in the newline split, blank lines included.
    pub line_no: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub article_no: String,
    pub title_line: String,
    pub line_start: usize,
    pub line_end: usize,
    pub text: String,
}

/// Return the numeral token of an article title line (`第十二條` → `十二`).
pub fn article_number(line: &str) -> Option<&str> {
    ARTICLE_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_article_title(line: &str) -> bool {
    ARTICLE_RE.is_match(line)
}

/// Split normalized text into numbered, trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<TextLine> {
    text.split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            (!line.is_empty()).then(|| TextLine {
                line_no: i + 1,
                text: line.to_string(),
            })
        })
        .collect()
}

#[derive(Debug)]
struct OpenArticle<'a> {
    article_no: &'a str,
    title_line: &'a str,
    line_start: usize,
    line_end: usize,
    body: Vec<&'a str>,
}

impl<'a> OpenArticle<'a> {
    fn start(article_no: &'a str, line: &'a TextLine) -> Self {
        Self {
            article_no,
            title_line: &line.text,
            line_start: line.line_no,
            line_end: line.line_no,
            body: Vec::new(),
        }
    }

    /// An article with no body lines is never emitted.
    fn finish(self) -> Option<Article> {
        if self.body.is_empty() {
            return None;
        }
        Some(Article {
            article_no: self.article_no.to_string(),
            title_line: self.title_line.to_string(),
            line_start: self.line_start,
            line_end: self.line_end,
            text: self.body.join("\n").trim().to_string(),
        })
    }
}

#[derive(Debug)]
enum ScanState<'a> {
    NoArticle,
    InArticle(OpenArticle<'a>),
}

/// Group lines into articles by `第X條` boundaries.
///
/// Lines before the first title belong to no article. A title followed
/// directly by another title has an empty body and is dropped.
pub fn scan_articles(lines: &[TextLine]) -> Vec<Article> {
    let mut articles = Vec::new();
    let mut state = ScanState::NoArticle;

    for line in lines {
        if let Some(no) = article_number(&line.text) {
            let previous = std::mem::replace(
                &mut state,
                ScanState::InArticle(OpenArticle::start(no, line)),
            );
            if let ScanState::InArticle(open) = previous {
                articles.extend(open.finish());
            }
            continue;
        }

        // Lines before the first title are dropped here.
        if let ScanState::InArticle(open) = &mut state {
            open.body.push(&line.text);
            open.line_end = line.line_no;
        }
    }

    if let ScanState::InArticle(open) = state {
        articles.extend(open.finish());
    }

    articles
}
