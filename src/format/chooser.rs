use crate::diff::DiffChunk;

/// Pick formatted lines for chunks touching edited lines, original lines elsewhere.
///
/// A chunk counts as edited when any line number in `edited_linenums` falls
/// within its original span. A pure insertion has no span of its own; it is
/// taken when the line just before it or the line at its position is edited.
pub fn choose_lines(chunks: &[DiffChunk], edited_linenums: &[usize]) -> Vec<String> {
    let mut lines = Vec::new();
    for chunk in chunks {
        let (first, len) = if chunk.original.is_empty() {
            (chunk.start.saturating_sub(1), 2)
        } else {
            (chunk.start, chunk.original.len())
        };
        let has_edits = edited_linenums
            .iter()
            .any(|&n| (first..first + len).contains(&n));

        if has_edits {
            lines.extend(chunk.formatted.iter().cloned());
        } else {
            lines.extend(chunk.original.iter().cloned());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(start: usize, original: &[&str], formatted: &[&str]) -> DiffChunk {
        DiffChunk {
            start,
            original: original.iter().map(|s| s.to_string()).collect(),
            formatted: formatted.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn chunks() -> Vec<DiffChunk> {
        vec![
            chunk(1, &["a=1"], &["a = 1"]),
            chunk(2, &["x = 0"], &["x = 0"]),
            chunk(3, &["b=2", "c=3"], &["b = 2", "c = 3"]),
        ]
    }

    #[test]
    fn only_edited_chunks_are_reformatted() {
        assert_eq!(choose_lines(&chunks(), &[1]), ["a = 1", "x = 0", "b=2", "c=3"]);
        assert_eq!(choose_lines(&chunks(), &[4]), ["a=1", "x = 0", "b = 2", "c = 3"]);
    }

    #[test]
    fn no_edits_keeps_original() {
        assert_eq!(choose_lines(&chunks(), &[]), ["a=1", "x = 0", "b=2", "c=3"]);
    }

    #[test]
    fn insertion_next_to_edited_line() {
        let chunks = vec![
            chunk(1, &["import os"], &["import os"]),
            chunk(2, &[], &[""]),
            chunk(2, &["def f():"], &["def f():"]),
        ];
        assert_eq!(
            choose_lines(&chunks, &[1]),
            ["import os", "", "def f():"]
        );
        assert_eq!(choose_lines(&chunks, &[3]), ["import os", "def f():"]);
    }
}
