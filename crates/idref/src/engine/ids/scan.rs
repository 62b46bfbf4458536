use super::{Direction, TokenSet, classify::is_id_attribute};
use crate::model::{NodeKind, XdmNode};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Pre-order walk over a subtree yielding ID owners or IDREF attributes.
///
/// Children are pushed in reverse so the explicit stack pops them in
/// document order. Matches of one element are buffered in `pending` before
/// the walk continues.
pub struct ScanCursor<N> {
    tokens: TokenSet,
    direction: Direction,
    stack: Vec<N>,
    pending: VecDeque<N>,
}

impl<N: XdmNode> ScanCursor<N> {
    pub fn new(root: N, tokens: TokenSet, direction: Direction) -> Self {
        // Nothing can match an empty set; skip the walk entirely.
        let stack = if tokens.is_empty() { Vec::new() } else { vec![root] };
        Self {
            tokens,
            direction,
            stack,
            pending: VecDeque::new(),
        }
    }

    fn visit(&mut self, node: &N) {
        for a in node.attributes() {
            let Some(name) = a.name() else { continue };
            if !is_id_attribute(&name.local, self.direction) {
                continue;
            }
            if self.tokens.matches_any(&a.string_value()) {
                match self.direction {
                    Direction::IdRef => self.pending.push_back(a),
                    Direction::Id => {
                        self.pending.push_back(node.clone());
                        // one entry per element, however many ID attributes match
                        return;
                    }
                }
            }
        }
    }
}

impl<N: XdmNode> Iterator for ScanCursor<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Some(hit);
            }
            let node = self.stack.pop()?;
            let children: SmallVec<[N; 8]> = node.children().collect();
            self.stack.extend(children.into_iter().rev());
            if node.kind() == NodeKind::Element {
                self.visit(&node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simple::{SimpleNode, attr, comment, doc, elem, text};

    fn sample() -> SimpleNode {
        // <r id="r1"><a id="x1" xml:id="x1"><c idref="x1"/></a>text<!--idref x1--><b idrefs="x2 x1" ref="x1"/></r>
        doc()
            .child(
                elem("r")
                    .attr(attr("id", "r1"))
                    .child(
                        elem("a")
                            .attr(attr("id", "x1"))
                            .attr(attr("xml:id", "x1"))
                            .child(elem("c").attr(attr("idref", "x1"))),
                    )
                    .child(text("text"))
                    .child(comment("idref x1"))
                    .child(elem("b").attr(attr("idrefs", "x2 x1")).attr(attr("ref", "x1"))),
            )
            .build()
    }

    fn names(nodes: &[SimpleNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| {
                let own = n.name().unwrap().local;
                match n.kind() {
                    NodeKind::Attribute => format!("{}@{own}", n.parent().unwrap().name().unwrap().local),
                    _ => own,
                }
            })
            .collect()
    }

    #[test]
    fn id_yields_each_owner_once_in_document_order() {
        let tokens: TokenSet = ["x1 r1"].into_iter().collect();
        let hits: Vec<_> = ScanCursor::new(sample(), tokens, Direction::Id).collect();
        assert_eq!(names(&hits), ["r", "a"]);
    }

    #[test]
    fn idref_yields_attributes_in_document_order() {
        let tokens: TokenSet = ["x1"].into_iter().collect();
        let hits: Vec<_> = ScanCursor::new(sample(), tokens, Direction::IdRef).collect();
        assert_eq!(names(&hits), ["c@idref", "b@idrefs"]);
    }

    #[test]
    fn idref_attribute_matching_several_tokens_is_reported_once() {
        let tokens: TokenSet = ["x1 x2"].into_iter().collect();
        let hits: Vec<_> = ScanCursor::new(sample(), tokens, Direction::IdRef).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(names(&hits), ["c@idref", "b@idrefs"]);
    }

    #[test]
    fn text_and_comment_content_never_matches() {
        let d = doc()
            .child(elem("r").child(text("x1")).child(comment("id x1")))
            .build();
        let tokens: TokenSet = ["x1"].into_iter().collect();
        for direction in [Direction::Id, Direction::IdRef] {
            assert_eq!(ScanCursor::new(d.clone(), tokens.clone(), direction).count(), 0);
        }
    }

    #[test]
    fn empty_tokens_yield_nothing() {
        let mut cursor = ScanCursor::new(sample(), TokenSet::new(), Direction::Id);
        assert!(cursor.next().is_none());
    }

    #[test]
    fn scan_from_subtree_stays_inside_it() {
        let d = sample();
        let r = d.children().next().unwrap();
        let a = r.children().next().unwrap();
        let tokens: TokenSet = ["x1"].into_iter().collect();
        let hits: Vec<_> = ScanCursor::new(a, tokens, Direction::IdRef).collect();
        assert_eq!(names(&hits), ["c@idref"]);
    }
}
