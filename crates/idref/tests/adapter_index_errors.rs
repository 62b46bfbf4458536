//! A custom store adapter with a fallible index: backend errors must reach
//! the caller unchanged, and rejected calls must not touch the tree.

use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use string_cache::DefaultAtom;
use xdm_idref::engine::runtime::{Error, ErrorCode, ResolverOptionsBuilder};
use xdm_idref::model::{DocumentKey, IndexKind, IndexRequest, IndexedDocument, NodeKind, QName, ValueIndex, XdmNode};
use xdm_idref::{Direction, IdResolver, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    None,
    Names,
    Lookup,
    SecondHit,
}

#[derive(Debug)]
struct NodeRec {
    kind: NodeKind,
    name: Option<&'static str>,
    value: &'static str,
    parent: Option<usize>,
    attributes: Vec<usize>,
    children: Vec<usize>,
}

#[derive(Debug)]
struct Dom {
    nodes: Vec<NodeRec>,
    failure: Failure,
    child_calls: AtomicUsize,
}

#[derive(Debug, Clone)]
struct Node {
    dom: Arc<Dom>,
    idx: usize,
}

impl PartialEq for Node {
    fn eq(&self, o: &Self) -> bool {
        Arc::ptr_eq(&self.dom, &o.dom) && self.idx == o.idx
    }
}
impl Eq for Node {}
impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

impl Node {
    fn at(&self, idx: usize) -> Node {
        Node { dom: self.dom.clone(), idx }
    }
}

impl XdmNode for Node {
    type Children<'a> = std::vec::IntoIter<Node>;
    type Attributes<'a> = std::vec::IntoIter<Node>;
    type Document = Doc;

    fn kind(&self) -> NodeKind {
        self.dom.nodes[self.idx].kind.clone()
    }
    fn name(&self) -> Option<QName> {
        self.dom.nodes[self.idx].name.map(QName::parse)
    }
    fn string_value(&self) -> String {
        self.dom.nodes[self.idx].value.to_string()
    }
    fn parent(&self) -> Option<Self> {
        self.dom.nodes[self.idx].parent.map(|i| self.at(i))
    }
    fn children(&self) -> Self::Children<'_> {
        self.dom.child_calls.fetch_add(1, Ordering::Relaxed);
        self.dom.nodes[self.idx].children.iter().map(|&i| self.at(i)).collect::<Vec<_>>().into_iter()
    }
    fn attributes(&self) -> Self::Attributes<'_> {
        self.dom.nodes[self.idx].attributes.iter().map(|&i| self.at(i)).collect::<Vec<_>>().into_iter()
    }
    fn document(&self) -> Option<Doc> {
        Some(Doc(self.dom.clone()))
    }
}

#[derive(Debug, Clone)]
struct Doc(Arc<Dom>);

impl IndexedDocument for Doc {
    type Node = Node;
    type Index = Index;

    fn key(&self) -> DocumentKey {
        DocumentKey::of(&self.0)
    }
    fn index_for(&self, kind: IndexKind) -> Option<Index> {
        (kind == IndexKind::Attribute).then(|| Index(self.0.clone()))
    }
}

struct Index(Arc<Dom>);

fn backend_error(msg: &str) -> Error {
    let cause: Arc<dyn std::error::Error + Send + Sync> = Arc::new(std::io::Error::other(format!("storage: {msg}")));
    Error::from_code(ErrorCode::FOER0000, msg).with_source(Some(cause))
}

fn cause_of(err: &Error) -> Option<String> {
    std::error::Error::source(err).map(ToString::to_string)
}

impl ValueIndex for Index {
    type Node = Node;
    type Hits = std::vec::IntoIter<Result<Node, Error>>;

    fn names(&self) -> Result<Vec<DefaultAtom>, Error> {
        if self.0.failure == Failure::Names {
            return Err(backend_error("index summary unavailable"));
        }
        Ok(vec![DefaultAtom::from("id")])
    }

    fn lookup(&self, request: &IndexRequest) -> Result<Self::Hits, Error> {
        if self.0.failure == Failure::Lookup {
            return Err(backend_error("index corrupted"));
        }
        let root = Node { dom: self.0.clone(), idx: 0 };
        let mut hits: Vec<Result<Node, Error>> = (0..self.0.nodes.len())
            .filter(|&i| self.0.nodes[i].kind == NodeKind::Attribute)
            .filter(|&i| request.keys.iter().any(|k| k.as_str() == self.0.nodes[i].value))
            .map(|i| Ok(root.at(i)))
            .collect();
        if self.0.failure == Failure::SecondHit {
            hits.insert(1, Err(backend_error("bad posting")));
        }
        Ok(hits.into_iter())
    }
}

fn rec(
    kind: NodeKind,
    name: Option<&'static str>,
    value: &'static str,
    parent: Option<usize>,
    attributes: Vec<usize>,
    children: Vec<usize>,
) -> NodeRec {
    NodeRec { kind, name, value, parent, attributes, children }
}

/// `<root><a id="x1"/><b id="x2" idref="x1"/></root>` under a document or element root.
fn build(failure: Failure, root_kind: NodeKind) -> Node {
    let nodes = vec![
        rec(root_kind, None, "", None, vec![], vec![1, 3]),
        rec(NodeKind::Element, Some("a"), "", Some(0), vec![2], vec![]),
        rec(NodeKind::Attribute, Some("id"), "x1", Some(1), vec![], vec![]),
        rec(NodeKind::Element, Some("b"), "", Some(0), vec![4, 5], vec![]),
        rec(NodeKind::Attribute, Some("id"), "x2", Some(3), vec![], vec![]),
        rec(NodeKind::Attribute, Some("idref"), "x1", Some(3), vec![], vec![]),
    ];
    Node {
        dom: Arc::new(Dom { nodes, failure, child_calls: AtomicUsize::new(0) }),
        idx: 0,
    }
}

fn located_resolver() -> (IdResolver<Node>, Location) {
    let loc = Location::new(Some("ids.xq"), "id(('x1', 'x2'))", 0);
    let resolver = IdResolver::new(ResolverOptionsBuilder::new().with_location(loc.clone()).build());
    (resolver, loc)
}

fn tokens(values: &[&'static str]) -> Vec<Result<&'static str, Error>> {
    values.iter().map(|v| Ok(*v)).collect()
}

#[rstest]
fn healthy_index_answers_lookups() {
    let d = build(Failure::None, NodeKind::Document);
    let (mut resolver, _) = located_resolver();
    let seq = resolver.resolve(tokens(&["x2", "x1"]), &d, Direction::Id).unwrap();
    assert!(!seq.is_scan());
    let names: Vec<_> = seq.map(|n| n.unwrap().name().unwrap().local).collect();
    // this adapter reports hits in arena order
    assert_eq!(names, ["a", "b"]);
}

#[rstest]
#[case(Failure::Names, "index summary unavailable")]
#[case(Failure::Lookup, "index corrupted")]
fn backend_errors_fail_the_call(#[case] failure: Failure, #[case] message: &str) {
    let d = build(failure, NodeKind::Document);
    let (mut resolver, loc) = located_resolver();
    let err = resolver.resolve(tokens(&["x1"]), &d, Direction::Id).err().unwrap();
    assert_eq!(err.code, ErrorCode::FOER0000);
    assert_eq!(err.message, message);
    assert_eq!(err.location, Some(loc));
    assert_eq!(cause_of(&err), Some(format!("storage: {message}")));
    // no fallback scan was attempted
    assert_eq!(d.dom.child_calls.load(Ordering::Relaxed), 0);
}

#[rstest]
fn hit_errors_surface_while_iterating() {
    let d = build(Failure::SecondHit, NodeKind::Document);
    let (mut resolver, loc) = located_resolver();
    let mut seq = resolver.resolve(tokens(&["x1", "x2"]), &d, Direction::Id).unwrap();
    assert_eq!(seq.next().unwrap().unwrap().name().unwrap().local, "a");
    let err = seq.next().unwrap().unwrap_err();
    assert_eq!(err.message, "bad posting");
    assert_eq!(err.location, Some(loc));
    assert_eq!(cause_of(&err).as_deref(), Some("storage: bad posting"));
}

#[rstest]
fn element_root_is_rejected_before_traversal(#[values(Direction::Id, Direction::IdRef)] dir: Direction) {
    let d = build(Failure::None, NodeKind::Element);
    let b = d.at(3);
    let (mut resolver, loc) = located_resolver();
    let err = resolver.resolve(tokens(&["x1"]), &b, dir).err().unwrap();
    assert_eq!(err.code, ErrorCode::FODC0001);
    assert_eq!(err.location, Some(loc));
    assert_eq!(d.dom.child_calls.load(Ordering::Relaxed), 0);
    assert_eq!(resolver.cached_documents(), 0);
}

#[rstest]
fn missing_index_direction_scans_the_adapter() {
    // the adapter has no token index, so idref walks the tree
    let d = build(Failure::Lookup, NodeKind::Document);
    let mut resolver = IdResolver::default();
    let seq = resolver.resolve(tokens(&["x1"]), &d, Direction::IdRef).unwrap();
    assert!(seq.is_scan());
    let out = seq.materialize().unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0], d.at(5));
    assert!(d.dom.child_calls.load(Ordering::Relaxed) > 0);
}
