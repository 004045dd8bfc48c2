//! Span id renumbering across chapter files.
//!
//! Each file's `quote` and `mention` ids (and the ids listed in their
//! `connection` attribute) are shifted by a running offset so that ids stay
//! unique once the chapters are concatenated. The running offset is carried
//! by [`SpanCounter`], which the assembler threads through its fold over the
//! input files.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::span::{SpanId, SpanIdError, SpanKind, shift_connection, shift_id};
use crate::xml::{Attribute, Document, Element};

/// How the running span offset advances across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OffsetMode {
    /// Renumber the whole file once per `text` element it contains, taking a
    /// fresh offset each time. A file with two `text` elements is shifted
    /// twice and a file with none is not shifted at all. This is the
    /// historical behaviour of the annotation pipeline.
    #[default]
    Legacy,
    /// Renumber every file exactly once.
    PerFile,
}

/// Per-kind upper bounds after renumbering one tree.
///
/// Each value is the largest renumbered numeric id of that kind plus one, or
/// 0 when the kind had no non-empty ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanTally {
    pub next_quote: u64,
    pub next_mention: u64,
    /// Number of span elements visited.
    pub spans: usize,
}

impl SpanTally {
    /// Record a renumbered id. Fails when its successor is not representable,
    /// since the next file could then only reuse ids.
    fn observe(&mut self, kind: SpanKind, id: &SpanId) -> std::result::Result<(), SpanIdError> {
        let next = id
            .number
            .checked_add(1)
            .ok_or_else(|| SpanIdError::Overflow(id.to_string()))?;
        let slot = match kind {
            SpanKind::Quote => &mut self.next_quote,
            SpanKind::Mention => &mut self.next_mention,
        };
        *slot = (*slot).max(next);
        Ok(())
    }

    /// The larger of the two per-kind bounds.
    pub fn next(&self) -> u64 {
        self.next_quote.max(self.next_mention)
    }
}

/// Running offset shared by all files of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanCounter {
    next: u64,
    spans: usize,
}

impl SpanCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The offset the next renumbering pass will use.
    pub fn offset(&self) -> u64 {
        self.next
    }

    /// Total span elements renumbered so far (counting repeated passes).
    pub fn spans_renumbered(&self) -> usize {
        self.spans
    }

    /// Fold a tally into the counter; the offset never decreases.
    pub fn advance(self, tally: SpanTally) -> SpanCounter {
        SpanCounter {
            next: self.next.max(tally.next()),
            spans: self.spans + tally.spans,
        }
    }
}

/// Shift every `quote`/`mention` id and connection in `root` by `offset`.
///
/// Returns the rewritten copy and its tally. Absent attributes stay absent
/// and empty ids are left alone.
pub fn renumber_spans(root: &Element, offset: u64, path: &Path) -> Result<(Element, SpanTally)> {
    let mut tally = SpanTally::default();

    let rewritten = root.rewrite(&mut |element: &Element| -> Result<Option<Vec<Attribute>>> {
        let Some(kind) = SpanKind::from_tag(&element.name) else {
            return Ok(None);
        };
        tally.spans += 1;

        let mut copy = element.clone();
        if let Some(raw) = element.attr("id")
            && let Some(id) = shift_id(raw, offset).map_err(|e| span_error(path, e))?
        {
            tally.observe(kind, &id).map_err(|e| span_error(path, e))?;
            copy.set_attr("id", id.to_string());
        }
        if let Some(raw) = element.attr("connection") {
            let shifted = shift_connection(raw, offset).map_err(|e| span_error(path, e))?;
            copy.set_attr("connection", shifted);
        }
        Ok(Some(copy.attrs))
    })?;

    Ok((rewritten, tally))
}

/// Apply the offset policy to one chapter file.
pub fn renumber_document(
    doc: &Document,
    counter: SpanCounter,
    mode: OffsetMode,
    path: &Path,
) -> Result<(Document, SpanCounter)> {
    let passes = match mode {
        OffsetMode::Legacy => doc.root.find_all("text").len(),
        OffsetMode::PerFile => 1,
    };

    let mut root = doc.root.clone();
    let mut counter = counter;
    for _ in 0..passes {
        let (next_root, tally) = renumber_spans(&root, counter.offset(), path)?;
        root = next_root;
        counter = counter.advance(tally);
    }

    Ok((Document::new(root), counter))
}

fn span_error(path: &Path, err: SpanIdError) -> Error {
    let path = path.to_path_buf();
    match err {
        SpanIdError::Malformed(id) => Error::InvalidSpanId { path, id },
        SpanIdError::Overflow(id) => Error::SpanIdOverflow { path, id },
    }
}
