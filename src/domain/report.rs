// Diagnostic Reporter
//
// Renders a non-equivalent [`MatchResult`] as a message naming both files,
// listing the unmatched nodes of each tree with their spans and source
// text, and quoting both files in full.

use std::fmt::Write;

use crate::domain::ast::SourceTree;
use crate::domain::equivalence::{MatchResult, Unmatched};

pub const UNMATCHED_EXPECTED: &str = "unmatched nodes in the expected tree";
pub const UNMATCHED_ACTUAL: &str = "unmatched nodes in the actual tree";

/// Render the failure message for a comparison that did not hold.
pub fn render(result: &MatchResult<'_>, expected: &SourceTree, actual: &SourceTree) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Expected that \"{}\" is equivalent to \"{}\", but the source trees differ.",
        actual.name(),
        expected.name()
    );

    if !result.unmatched_expected.is_empty() {
        section(&mut out, UNMATCHED_EXPECTED, expected, &result.unmatched_expected);
    }
    if !result.unmatched_actual.is_empty() {
        section(&mut out, UNMATCHED_ACTUAL, actual, &result.unmatched_actual);
    }

    quote(&mut out, "expected source", expected);
    quote(&mut out, "actual source", actual);
    out
}

fn section(out: &mut String, title: &str, tree: &SourceTree, nodes: &[Unmatched<'_>]) {
    let _ = writeln!(out, "\n{} ({}):", title, tree.name());
    for unmatched in nodes {
        let node = unmatched.node;
        match node.span() {
            Some(span) => {
                let _ = writeln!(out, "  - {} [{}]", unmatched.path, span);
            }
            None => {
                let _ = writeln!(out, "  - {}", unmatched.path);
            }
        }
        let text = tree.text_of(node).map(str::to_string).unwrap_or_else(|| node.label());
        for line in text.lines() {
            let _ = writeln!(out, "      {}", line);
        }
    }
}

fn quote(out: &mut String, title: &str, tree: &SourceTree) {
    let _ = writeln!(out, "\n{} ({}):", title, tree.name());
    out.push_str(tree.text());
    if !tree.text().ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{Node, NodeKind, SourceSpan};
    use crate::domain::equivalence::compare;

    fn file_with(name: &str, text: &str, items: Vec<Node>) -> SourceTree {
        SourceTree::new(name, text, Node::branch(NodeKind::File, items, None))
    }

    #[test]
    fn test_render_lists_both_sections_in_order() {
        let expected = file_with(
            "expected.rs",
            "const A: u8 = 1;",
            vec![Node::leaf(NodeKind::Verbatim, "const A : u8 = 1 ;", Some(SourceSpan::new(1, 0, 1, 16)))],
        );
        let actual = file_with(
            "actual.rs",
            "const B: u8 = 1;",
            vec![Node::leaf(NodeKind::Verbatim, "const B : u8 = 1 ;", Some(SourceSpan::new(1, 0, 1, 16)))],
        );
        let result = compare(&expected, &actual);
        let message = render(&result, &expected, &actual);

        assert!(message.contains("\"actual.rs\" is equivalent to \"expected.rs\""));
        let e = message.find(UNMATCHED_EXPECTED).unwrap();
        let a = message.find(UNMATCHED_ACTUAL).unwrap();
        assert!(e < a);
        assert!(message.contains("File > Verbatim [1:0-1:16]"));
        assert!(message.contains("      const A: u8 = 1;"));
        assert!(message.contains("      const B: u8 = 1;"));
        assert!(message.contains("expected source (expected.rs):\nconst A: u8 = 1;\n"));
        assert!(message.contains("actual source (actual.rs):\nconst B: u8 = 1;\n"));
    }

    #[test]
    fn test_render_omits_empty_section() {
        let expected = file_with("e.rs", "", vec![]);
        let actual = file_with(
            "a.rs",
            "",
            vec![Node::leaf(NodeKind::Use, "use std :: fmt", None)],
        );
        let result = compare(&expected, &actual);
        let message = render(&result, &expected, &actual);
        assert!(!message.contains(UNMATCHED_EXPECTED));
        assert!(message.contains(UNMATCHED_ACTUAL));
        // Without a span the node is described by kind and value.
        assert!(message.contains("Use `use std :: fmt`"));
    }
}
