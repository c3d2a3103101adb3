//! Formatting-insensitive rendering of a Python syntax tree.
//!
//! Two sources that differ only in layout render to the same lines. Ignored:
//! whitespace, comments, line continuations, redundant parentheses,
//! semicolons, string quote style and prefix case, numeric literal case, and
//! the indentation of docstrings. Trailing commas are ignored only where they
//! cannot turn a value into a one-element tuple.

use crate::ts::parser::ParsedSource;
use tree_sitter::Node;

/// Punctuation whose presence is already implied by the tree structure.
const STRUCTURAL_PUNCTUATION: &[&str] = &["(", ")", ";"];

/// Containers where a trailing comma never changes what is built.
const TRAILING_COMMA_FREE: &[&str] = &[
    "argument_list",
    "parameters",
    "lambda_parameters",
    "list",
    "set",
    "dictionary",
    "import_from_statement",
];

/// Containers where a trailing comma after a single element makes a tuple.
const TUPLE_LIKE: &[&str] = &[
    "tuple",
    "expression_list",
    "pattern_list",
    "tuple_pattern",
    "list_pattern",
    "subscript",
];

/// Render the tree of `parsed` as one line per node, indented by depth.
pub fn normalize(parsed: &ParsedSource<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let mut walker = Walker {
        source: parsed.source,
        out: &mut out,
    };
    walker.visit(parsed.root_node(), 0, false);
    out
}

struct Walker<'s, 'o> {
    source: &'s str,
    out: &'o mut Vec<String>,
}

impl Walker<'_, '_> {
    fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    fn push(&mut self, depth: usize, line: String) {
        self.out.push(format!("{}{}", "  ".repeat(depth), line));
    }

    fn visit(&mut self, node: Node<'_>, depth: usize, docstring: bool) {
        if node.is_extra() {
            return;
        }

        match node.kind() {
            "parenthesized_expression" => {
                for child in named_children(node) {
                    self.visit(child, depth, false);
                }
                return;
            }
            "string" => {
                self.visit_string(node, depth, docstring);
                return;
            }
            _ => {}
        }

        if node.child_count() == 0 {
            if !node.is_named() {
                if !STRUCTURAL_PUNCTUATION.contains(&node.kind()) {
                    self.push(depth, node.kind().to_string());
                }
                return;
            }
            let text = match node.kind() {
                "integer" | "float" => self.text(node).to_lowercase(),
                _ => self.text(node).to_string(),
            };
            let line = format!("{} {}", label(node.kind()), text);
            self.push(depth, line);
            return;
        }

        self.push(depth, label(node.kind()).to_string());

        let has_docstring = matches!(node.kind(), "module" | "block");
        let mut first_statement = true;
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        let ignore_trailing_comma = trailing_comma_is_layout(node);
        for (index, child) in children.iter().copied().enumerate() {
            let trailing = child.kind() == "," && is_trailing(&children[index + 1..]);
            if ignore_trailing_comma && trailing {
                continue;
            }
            let is_docstring = has_docstring && first_statement && is_docstring_statement(child);
            if child.is_named() && !child.is_extra() {
                first_statement = false;
            }
            if is_docstring {
                self.push(depth + 1, label(child.kind()).to_string());
                if let Some(string) = named_children(child).into_iter().next() {
                    self.visit(string, depth + 2, true);
                }
            } else {
                self.visit(child, depth + 1, false);
            }
        }
    }

    fn visit_string(&mut self, node: Node<'_>, depth: usize, docstring: bool) {
        let mut content = String::new();
        let mut prefix = String::new();
        let mut parts: Vec<String> = Vec::new();

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "string_start" => prefix = string_prefix(self.text(child)),
                "string_end" => {}
                "interpolation" => {
                    parts.push(std::mem::take(&mut content));
                    let mut nested = Vec::new();
                    let mut inner = Walker {
                        source: self.source,
                        out: &mut nested,
                    };
                    inner.visit(child, 0, false);
                    parts.push(nested.join("|"));
                }
                _ => content.push_str(self.text(child)),
            }
        }
        parts.push(content);

        let raw = prefix.contains('r');
        let parts: Vec<String> = parts
            .into_iter()
            .map(|part| {
                // Raw strings keep their backslashes
                let part = if raw { part } else { unescape_quotes(&part) };
                if docstring {
                    normalize_docstring(&part)
                } else {
                    part
                }
            })
            .collect();

        self.push(depth, format!("string {prefix} {:?}", parts));
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Whether a trailing comma among `node`'s children is only layout.
fn trailing_comma_is_layout(node: Node<'_>) -> bool {
    let kind = node.kind();
    if TRAILING_COMMA_FREE.contains(&kind) {
        return true;
    }
    if !TUPLE_LIKE.contains(&kind) {
        return false;
    }
    let elements = if kind == "subscript" {
        let mut cursor = node.walk();
        node.children_by_field_name("subscript", &mut cursor).count()
    } else {
        named_children(node).len()
    };
    elements >= 2
}

/// Whether nothing but closing brackets and extras follow.
fn is_trailing(rest: &[Node<'_>]) -> bool {
    rest.iter()
        .all(|sibling| sibling.is_extra() || matches!(sibling.kind(), ")" | "]" | "}"))
}

fn is_docstring_statement(node: Node<'_>) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let children = named_children(node);
    children.len() == 1 && children[0].kind() == "string"
}

/// Node kinds that are the same construct written with or without parentheses.
fn label(kind: &str) -> &str {
    match kind {
        "expression_list" => "tuple",
        "pattern_list" => "tuple_pattern",
        other => other,
    }
}

/// Lowercase string prefix without quotes, `u` dropped, letters sorted.
fn string_prefix(start: &str) -> String {
    let mut letters: Vec<char> = start
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .filter(|&c| c != 'u')
        .collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

/// Remove backslashes that only escape a quote character.
fn unescape_quotes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(q @ ('\'' | '"')) => out.push(q),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn normalize_docstring(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::parser::PythonParser;

    fn render(source: &str) -> Vec<String> {
        let mut parser = PythonParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        normalize(&parsed)
    }

    fn same(a: &str, b: &str) {
        assert_eq!(render(a), render(b), "{a:?} vs {b:?}");
    }

    fn different(a: &str, b: &str) {
        assert_ne!(render(a), render(b), "{a:?} vs {b:?}");
    }

    #[test]
    fn layout_is_ignored() {
        same("if True: pass", "if True:\n    pass\n");
        same("x=[1,2,3]\n", "x = [\n    1,\n    2,\n    3,\n]\n");
        same("f(a,b)\n", "f(\n    a,\n    b,\n)\n");
    }

    #[test]
    fn comments_are_ignored() {
        same("x = 1  # one\n", "x = 1\n");
    }

    #[test]
    fn quote_style_is_ignored() {
        same("x = 'it\\'s'\n", "x = \"it's\"\n");
        same("x = U'a'\n", "x = \"a\"\n");
        same("x = Rb'a'\n", "x = br\"a\"\n");
    }

    #[test]
    fn redundant_parentheses_are_ignored() {
        same("return (1)\n", "return 1\n");
        same("x = (\n    a + b\n)\n", "x = a + b\n");
        same("del (a, b)\n", "del a, b\n");
    }

    #[test]
    fn numeric_case_is_ignored() {
        same("x = 0XFF\n", "x = 0xff\n");
        same("x = 1E5\n", "x = 1e5\n");
    }

    #[test]
    fn docstring_indentation_is_ignored() {
        same(
            "def f():\n    '''Doc.\n\n        more\n    '''\n",
            "def f():\n    \"\"\"Doc.\n\n    more\n    \"\"\"\n",
        );
    }

    #[test]
    fn semantic_changes_are_detected() {
        different("if True: pass", "if False: pass");
        different("x = a + b\n", "x = a - b\n");
        different("x = 'a'\n", "x = 'b'\n");
        different("x = (1,)\n", "x = (1)\n");
        different("x = ' a'\n", "x = 'a'\n");
        different("if a:\n    b = 1\nc = 2\n", "if a:\n    b = 1\n    c = 2\n");
        different("a[1,]\n", "a[1]\n");
        different("x = 1,\n", "x = 1\n");
        different("for x, in y: pass\n", "for x in y: pass\n");
        different("x = r'\\\"'\n", "x = r'\"'\n");
        different("x = rb'\\''\n", "x = rb\"'\"\n");
    }

    #[test]
    fn trailing_commas_in_containers_are_ignored() {
        same("f(a, b,)\n", "f(a, b)\n");
        same("def f(a, b,): pass\n", "def f(a, b): pass\n");
        same("x = [1,]\n", "x = [1]\n");
        same("x = {1: 2,}\n", "x = {1: 2}\n");
        same("x = {1,}\n", "x = {1}\n");
        same("from a import (b, c,)\n", "from a import b, c\n");
        same("x = (1, 2,)\n", "x = 1, 2\n");
        same("a[1, 2,]\n", "a[1, 2]\n");
        same("x = (1,)\n", "x = 1,\n");
    }

    #[test]
    fn raw_string_escapes_are_kept() {
        same("x = r'a\\b'\n", "x = r\"a\\b\"\n");
        same("x = R'a'\n", "x = r\"a\"\n");
    }

    #[test]
    fn string_prefix_normalization() {
        assert_eq!(string_prefix("'"), "");
        assert_eq!(string_prefix("Rb\"\"\""), "br");
        assert_eq!(string_prefix("u'"), "");
        assert_eq!(string_prefix("F'"), "f");
    }

    #[test]
    fn unescape_only_quotes() {
        assert_eq!(unescape_quotes(r#"it\'s \"x\" \n \\"#), r#"it's "x" \n \\"#);
    }
}
