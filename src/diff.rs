//! Line alignment between two documents.
//!
//! Built on `similar`'s Myers diff over line slices. Two views are derived
//! from the same opcodes: edited line numbers on the target side (with
//! optional context) and [`DiffChunk`]s covering the whole source.

use crate::document::TextDocument;
use similar::{Algorithm, DiffTag};
use std::ops::Range;

/// One contiguous run of a line comparison.
///
/// `start` is the 1-based number of the first original line. Equal runs
/// have identical `original` and `formatted` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChunk {
    pub start: usize,
    pub original: Vec<String>,
    pub formatted: Vec<String>,
}

impl DiffChunk {
    pub fn is_unchanged(&self) -> bool {
        self.original == self.formatted
    }
}

/// A single alignment step: tag, source range, target range.
pub type Opcode = (DiffTag, Range<usize>, Range<usize>);

/// Align the lines of `src` and `dst`.
pub fn diff_opcodes(src: &TextDocument, dst: &TextDocument) -> Vec<Opcode> {
    similar::capture_diff_slices(Algorithm::Myers, src.lines(), dst.lines())
        .iter()
        .map(|op| op.as_tag_tuple())
        .collect()
}

/// Target-side line numbers touched by `opcodes`, widened by `context_lines`.
///
/// Returns ascending, de-duplicated 1-based line numbers clipped to the
/// target document. Pure deletions only show up once context is added.
pub fn opcodes_to_edit_linenums(opcodes: &[Opcode], context_lines: usize) -> Vec<usize> {
    let Some((_, _, last)) = opcodes.last() else {
        return Vec::new();
    };
    let end = last.end;

    let mut linenums: Vec<usize> = Vec::new();
    for (tag, _, target) in opcodes {
        if *tag == DiffTag::Equal {
            continue;
        }
        let first = target.start.saturating_sub(context_lines);
        let stop = (target.end + context_lines).min(end);
        // Spans are visited in order, so skipping what is already covered
        // keeps the output sorted without a set.
        let from = linenums.last().map_or(first, |&prev| first.max(prev));
        linenums.extend((from..stop).map(|i| i + 1));
    }
    linenums
}

/// Split the comparison of `src` and `dst` into chunks covering all of `src`.
pub fn diff_chunks(src: &TextDocument, dst: &TextDocument) -> Vec<DiffChunk> {
    opcodes_to_chunks(&diff_opcodes(src, dst), src, dst)
}

pub fn opcodes_to_chunks(
    opcodes: &[Opcode],
    src: &TextDocument,
    dst: &TextDocument,
) -> Vec<DiffChunk> {
    opcodes
        .iter()
        .map(|(_, source, target)| DiffChunk {
            start: source.start + 1,
            original: src.lines()[source.clone()].to_vec(),
            formatted: dst.lines()[target.clone()].to_vec(),
        })
        .collect()
}
