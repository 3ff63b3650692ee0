// Structural Equivalence Matcher
//
// Walks two source trees in lockstep and collects the nodes on each side
// that have no counterpart on the other.
//
// Ordered children are paired by position. Unordered children (items,
// members, fields, modifiers) are aligned greedily: first every exact
// match is consumed, then leftover declarations with the same kind and
// name are paired and compared recursively so that a difference is
// reported where it actually is, and whatever remains is unmatched.
//
// The greedy alignment is not globally minimal; it reports one valid
// explanation of the mismatch. Among equivalent candidates the first
// unconsumed one is taken.

use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use crate::domain::ast::{ChildOrder, Node, SourceTree};

/// Location of a node, as the chain of labels from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodePath(Vec<String>);

impl NodePath {
    fn child(&self, node: &Node) -> NodePath {
        let mut segments = self.0.clone();
        segments.push(match node.identity() {
            Some(name) => format!("{} {}", node.kind(), name),
            None => node.kind().to_string(),
        });
        NodePath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

/// A node with no counterpart in the other tree.
#[derive(Debug, Clone, Serialize)]
pub struct Unmatched<'a> {
    pub path: NodePath,
    pub node: &'a Node,
}

/// Outcome of comparing two source trees.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchResult<'a> {
    pub unmatched_expected: Vec<Unmatched<'a>>,
    pub unmatched_actual: Vec<Unmatched<'a>>,
}

impl MatchResult<'_> {
    pub fn is_equivalent(&self) -> bool {
        self.unmatched_expected.is_empty() && self.unmatched_actual.is_empty()
    }
}

/// Compare `actual` against `expected`.
///
/// Never fails: wildly different trees simply leave everything unmatched.
pub fn compare<'a>(expected: &'a SourceTree, actual: &'a SourceTree) -> MatchResult<'a> {
    let mut matcher = Matcher::default();
    let root = NodePath::default();
    matcher.visit(
        expected.root(),
        actual.root(),
        &root.child(expected.root()),
        &root.child(actual.root()),
    );
    let result = matcher.finish();
    debug!(
        expected = expected.name(),
        actual = actual.name(),
        unmatched_expected = result.unmatched_expected.len(),
        unmatched_actual = result.unmatched_actual.len(),
        "compared source trees"
    );
    result
}

/// Whether two subtrees denote the same structure.
///
/// Unordered children are matched greedily, which is exact here because
/// this relation is an equivalence.
pub fn equivalent(expected: &Node, actual: &Node) -> bool {
    if expected.kind() != actual.kind() || expected.value() != actual.value() {
        return false;
    }
    let (left, right) = (expected.children(), actual.children());
    if left.len() != right.len() {
        return false;
    }
    match expected.kind().child_order() {
        ChildOrder::Leaf => true,
        ChildOrder::Ordered => left.iter().zip(right).all(|(e, a)| equivalent(e, a)),
        ChildOrder::Unordered => {
            let mut consumed = vec![false; right.len()];
            left
                .iter()
                .all(|e| take_equivalent(e, right, &mut consumed).is_some())
        }
    }
}

fn take_equivalent(node: &Node, candidates: &[Node], consumed: &mut [bool]) -> Option<usize> {
    let index = candidates
        .iter()
        .enumerate()
        .position(|(i, candidate)| !consumed[i] && equivalent(node, candidate))?;
    consumed[index] = true;
    Some(index)
}

#[derive(Default)]
struct Matcher<'a> {
    result: MatchResult<'a>,
}

impl<'a> Matcher<'a> {
    fn finish(self) -> MatchResult<'a> {
        self.result
    }

    fn visit(&mut self, expected: &'a Node, actual: &'a Node, e_path: &NodePath, a_path: &NodePath) {
        if expected.kind() != actual.kind() || expected.value() != actual.value() {
            self.unmatched_expected(expected, e_path.clone());
            self.unmatched_actual(actual, a_path.clone());
            return;
        }
        match expected.kind().child_order() {
            ChildOrder::Leaf => {}
            ChildOrder::Ordered => self.align_ordered(expected, actual, e_path, a_path),
            ChildOrder::Unordered => self.align_unordered(expected, actual, e_path, a_path),
        }
    }

    fn align_ordered(
        &mut self,
        expected: &'a Node,
        actual: &'a Node,
        e_path: &NodePath,
        a_path: &NodePath,
    ) {
        let (left, right) = (expected.children(), actual.children());
        for (e, a) in left.iter().zip(right) {
            self.visit(e, a, &e_path.child(e), &a_path.child(a));
        }
        for e in left.iter().skip(right.len()) {
            self.unmatched_expected(e, e_path.child(e));
        }
        for a in right.iter().skip(left.len()) {
            self.unmatched_actual(a, a_path.child(a));
        }
    }

    fn align_unordered(
        &mut self,
        expected: &'a Node,
        actual: &'a Node,
        e_path: &NodePath,
        a_path: &NodePath,
    ) {
        let (left, right) = (expected.children(), actual.children());
        let mut consumed = vec![false; right.len()];

        let leftovers: Vec<&'a Node> = left
            .iter()
            .filter(|e| take_equivalent(e, right, &mut consumed).is_none())
            .collect();

        for e in leftovers {
            let counterpart = e.identity().and_then(|name| {
                right.iter().enumerate().position(|(i, a)| {
                    !consumed[i] && a.kind() == e.kind() && a.identity().as_deref() == Some(name.as_str())
                })
            });
            match counterpart {
                Some(index) => {
                    consumed[index] = true;
                    let a = &right[index];
                    self.visit(e, a, &e_path.child(e), &a_path.child(a));
                }
                None => self.unmatched_expected(e, e_path.child(e)),
            }
        }

        for (a, _) in right.iter().zip(&consumed).filter(|(_, taken)| !**taken) {
            self.unmatched_actual(a, a_path.child(a));
        }
    }

    fn unmatched_expected(&mut self, node: &'a Node, path: NodePath) {
        trace!(%path, "unmatched node in expected tree");
        self.result.unmatched_expected.push(Unmatched { path, node });
    }

    fn unmatched_actual(&mut self, node: &'a Node, path: NodePath) {
        trace!(%path, "unmatched node in actual tree");
        self.result.unmatched_actual.push(Unmatched { path, node });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::NodeKind;

    fn ident(name: &str) -> Node {
        Node::leaf(NodeKind::Identifier, name, None)
    }

    fn field(name: &str, ty: &str) -> Node {
        Node::branch(
            NodeKind::Field,
            vec![
                Node::branch(NodeKind::Modifiers, vec![], None),
                ident(name),
                Node::leaf(NodeKind::TypeRef, ty, None),
            ],
            None,
        )
    }

    fn strukt(name: &str, fields: Vec<Node>) -> Node {
        Node::branch(
            NodeKind::Struct,
            vec![
                Node::branch(NodeKind::Modifiers, vec![], None),
                ident(name),
                Node::branch(NodeKind::Generics, vec![], None),
                Node::branch(NodeKind::NamedFields, fields, None),
            ],
            None,
        )
    }

    fn tree(name: &str, items: Vec<Node>) -> SourceTree {
        SourceTree::new(name, "", Node::branch(NodeKind::File, items, None))
    }

    fn labels(unmatched: &[Unmatched<'_>]) -> Vec<String> {
        unmatched.iter().map(|u| u.node.label()).collect()
    }

    #[test]
    fn test_reflexive() {
        let t = tree("a.rs", vec![strukt("A", vec![field("x", "u8"), field("y", "String")])]);
        let result = compare(&t, &t);
        assert!(result.is_equivalent());
    }

    #[test]
    fn test_unordered_fields_are_permutable() {
        let expected = tree("e.rs", vec![strukt("A", vec![field("x", "u8"), field("y", "u16")])]);
        let actual = tree("a.rs", vec![strukt("A", vec![field("y", "u16"), field("x", "u8")])]);
        assert!(compare(&expected, &actual).is_equivalent());
    }

    #[test]
    fn test_renamed_declaration_is_unmatched_on_both_sides() {
        let expected = tree("e.rs", vec![strukt("TestClass", vec![])]);
        let actual = tree("a.rs", vec![strukt("TestClass2", vec![])]);
        let result = compare(&expected, &actual);
        assert!(!result.is_equivalent());
        assert_eq!(labels(&result.unmatched_expected), vec!["Struct TestClass"]);
        assert_eq!(labels(&result.unmatched_actual), vec!["Struct TestClass2"]);
        assert_eq!(result.unmatched_expected[0].path.to_string(), "File > Struct TestClass");
    }

    #[test]
    fn test_extra_field_in_expected_is_localized() {
        let expected = tree("e.rs", vec![strukt("A", vec![field("field", "Object")])]);
        let actual = tree("a.rs", vec![strukt("A", vec![])]);
        let result = compare(&expected, &actual);
        assert_eq!(labels(&result.unmatched_expected), vec!["Field field"]);
        assert!(result.unmatched_actual.is_empty());
        assert_eq!(
            result.unmatched_expected[0].path.to_string(),
            "File > Struct A > NamedFields > Field field"
        );
    }

    #[test]
    fn test_extra_field_in_actual_is_localized() {
        let expected = tree("e.rs", vec![strukt("A", vec![])]);
        let actual = tree("a.rs", vec![strukt("A", vec![field("field", "Object")])]);
        let result = compare(&expected, &actual);
        assert!(result.unmatched_expected.is_empty());
        assert_eq!(labels(&result.unmatched_actual), vec!["Field field"]);
    }

    #[test]
    fn test_kind_mismatch_records_whole_pair() {
        let expected = Node::branch(NodeKind::Block, vec![ident("x")], None);
        let actual = Node::branch(NodeKind::Block, vec![Node::leaf(NodeKind::Literal, "1", None)], None);
        let (e, a) = (
            SourceTree::new("e.rs", "", expected),
            SourceTree::new("a.rs", "", actual),
        );
        let result = compare(&e, &a);
        assert_eq!(labels(&result.unmatched_expected), vec!["Identifier `x`"]);
        assert_eq!(labels(&result.unmatched_actual), vec!["Literal `1`"]);
    }

    #[test]
    fn test_ordered_tail_is_unmatched() {
        let expected = Node::branch(NodeKind::Block, vec![ident("a"), ident("b"), ident("c")], None);
        let actual = Node::branch(NodeKind::Block, vec![ident("a")], None);
        let (e, a) = (
            SourceTree::new("e.rs", "", expected),
            SourceTree::new("a.rs", "", actual),
        );
        let result = compare(&e, &a);
        assert_eq!(
            labels(&result.unmatched_expected),
            vec!["Identifier `b`", "Identifier `c`"]
        );
        assert!(result.unmatched_actual.is_empty());
    }

    #[test]
    fn test_ordered_children_are_not_permutable() {
        let left = Node::branch(NodeKind::Block, vec![ident("a"), ident("b")], None);
        let right = Node::branch(NodeKind::Block, vec![ident("b"), ident("a")], None);
        assert!(!equivalent(&left, &right));
        let (e, a) = (SourceTree::new("e.rs", "", left), SourceTree::new("a.rs", "", right));
        let result = compare(&e, &a);
        assert_eq!(result.unmatched_expected.len(), 2);
        assert_eq!(result.unmatched_actual.len(), 2);
    }

    #[test]
    fn test_duplicate_siblings_only_counts_matter() {
        let expected = tree("e.rs", vec![strukt("A", vec![]), strukt("A", vec![])]);
        let actual = tree("a.rs", vec![strukt("A", vec![])]);
        let result = compare(&expected, &actual);
        assert_eq!(result.unmatched_expected.len(), 1);
        assert!(result.unmatched_actual.is_empty());
    }

    #[test]
    fn test_anonymous_leftovers_are_not_paired() {
        let modifiers = |names: &[&str]| {
            Node::branch(
                NodeKind::Modifiers,
                names
                    .iter()
                    .map(|n| Node::leaf(NodeKind::Modifier, *n, None))
                    .collect(),
                None,
            )
        };
        let (e, a) = (
            SourceTree::new("e.rs", "", modifiers(&["pub", "#[inline]"])),
            SourceTree::new("a.rs", "", modifiers(&["#[inline]", "pub(crate)"])),
        );
        let result = compare(&e, &a);
        assert_eq!(labels(&result.unmatched_expected), vec!["Modifier `pub`"]);
        assert_eq!(labels(&result.unmatched_actual), vec!["Modifier `pub(crate)`"]);
    }
}
