//! Byte offset to line number mapping

use mago_span::Span;

/// Line start table for one source file
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based column of `offset` within its line
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.line_starts[line - 1] + 1
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// First and last line covered by `span`
    ///
    /// Span ends are exclusive, so the last line is the one holding the
    /// span's final byte.
    pub fn lines(&self, span: Span) -> (usize, usize) {
        let start = span.start.offset as usize;
        let end = span.end.offset as usize;
        let last = if end > start { end - 1 } else { start };
        (self.line_of(start), self.line_of(last))
    }
}
