//! Text splicing with a source map back to the original file.
//!
//! Only insertions are supported. Every original line and every stretch of
//! original text following an insertion gets its own mapping token, which is
//! enough for stack traces and devtools to land on the right line and column.

use oxc_sourcemap::SourceMapBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicedSource {
    pub code: String,
    /// Source map v3 JSON.
    pub map: String,
}

pub struct SourceSplicer<'s> {
    source: &'s str,
    insertions: Vec<(usize, String)>,
}

impl<'s> SourceSplicer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            insertions: Vec::new(),
        }
    }

    /// Insert `text` immediately before byte `offset` of the original.
    /// Insertions at the same offset keep their call order.
    pub fn insert_before(&mut self, offset: usize, text: impl Into<String>) {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        self.insertions.push((offset, text.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn finish(mut self, source_name: &str) -> SplicedSource {
        self.insertions.sort_by_key(|(offset, _)| *offset);

        let extra: usize = self.insertions.iter().map(|(_, t)| t.len()).sum();
        let mut out = Output {
            code: String::with_capacity(self.source.len() + extra),
            builder: SourceMapBuilder::default(),
            source_id: 0,
            out_line: 0,
            out_col: 0,
            src_line: 0,
            src_col: 0,
            needs_token: true,
        };
        out.source_id = out
            .builder
            .add_source_and_content(source_name, self.source);

        let mut cursor = 0;
        for (offset, text) in &self.insertions {
            out.copy_original(&self.source[cursor..*offset]);
            out.push_inserted(text);
            cursor = *offset;
        }
        out.copy_original(&self.source[cursor..]);

        SplicedSource {
            code: out.code,
            map: out.builder.into_sourcemap().to_json_string(),
        }
    }
}

struct Output {
    code: String,
    builder: SourceMapBuilder,
    source_id: u32,
    out_line: u32,
    out_col: u32,
    src_line: u32,
    src_col: u32,
    needs_token: bool,
}

impl Output {
    fn copy_original(&mut self, segment: &str) {
        for c in segment.chars() {
            if self.needs_token {
                self.builder.add_token(
                    self.out_line,
                    self.out_col,
                    self.src_line,
                    self.src_col,
                    Some(self.source_id),
                    None,
                );
                self.needs_token = false;
            }
            self.code.push(c);
            if c == '\n' {
                self.out_line += 1;
                self.out_col = 0;
                self.src_line += 1;
                self.src_col = 0;
                self.needs_token = true;
            } else {
                let width = c.len_utf16() as u32;
                self.out_col += width;
                self.src_col += width;
            }
        }
    }

    fn push_inserted(&mut self, text: &str) {
        for c in text.chars() {
            self.code.push(c);
            if c == '\n' {
                self.out_line += 1;
                self.out_col = 0;
            } else {
                self.out_col += c.len_utf16() as u32;
            }
        }
        self.needs_token = true;
    }
}
