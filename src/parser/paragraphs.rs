use std::iter::Fuse;

/// A line ending in one of these closes the current paragraph.
const TERMINATORS: &[char] = &['。', '！', '？', '；', '：', '!', '?', ';', ':'];

/// Merge visual lines of a PDF page into paragraphs.
///
/// A blank line or a line ending in a sentence terminator closes the
/// paragraph; fragments are concatenated without a separator. Call again
/// to restart over the same lines.
pub fn merge_paragraphs<I>(lines: I) -> Paragraphs<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Paragraphs {
        lines: lines.into_iter().fuse(),
        buffer: String::new(),
    }
}

pub struct Paragraphs<I> {
    lines: Fuse<I>,
    buffer: String,
}

impl<I> Paragraphs<I> {
    fn flush(&mut self) -> Option<String> {
        let joined = std::mem::take(&mut self.buffer);
        let paragraph = joined.trim();
        (!paragraph.is_empty()).then(|| paragraph.to_string())
    }
}

impl<I> Iterator for Paragraphs<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(raw) = self.lines.next() {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                if let Some(paragraph) = self.flush() {
                    return Some(paragraph);
                }
                continue;
            }

            self.buffer.push_str(line);
            if line.ends_with(TERMINATORS) {
                return self.flush();
            }
        }
        self.flush()
    }
}
