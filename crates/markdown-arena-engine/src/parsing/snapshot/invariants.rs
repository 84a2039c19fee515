use crate::tree::Tree;

/// Validates parser output invariants.
///
/// Asserts that:
/// - The arena is well formed (see [`Tree::check_invariants`])
/// - Every node span is ordered and within the source
/// - Child spans are contained within their parent's span
/// - Siblings do not overlap and appear in source order
///
/// Pre-order ids are not asserted here because an incrementally updated
/// tree only guarantees them after a full parse; use
/// [`Tree::check_pre_order`] for that.
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(tree: &Tree) {
    if let Err(e) = tree.check_invariants() {
        panic!("arena invariant violated: {e}");
    }
    let n = tree.source().len();
    for node in &tree.nodes {
        let sp = node.span;
        assert!(
            sp.start.offset <= sp.end.offset && sp.end.offset <= n,
            "{} span out of bounds: {:?} (source len: {})",
            node.id,
            sp.range(),
            n
        );
        let mut prev_end = sp.start.offset;
        for &child in &node.children {
            let c = tree.nodes[child.0].span;
            assert!(
                c.start.offset >= prev_end && c.end.offset <= sp.end.offset,
                "{child} span {:?} escapes parent {} span {:?} or overlaps its previous sibling",
                c.range(),
                node.id,
                sp.range()
            );
            prev_end = c.end.offset;
        }
    }
}
