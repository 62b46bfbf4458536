//! Arena-backed in-memory document store implementing `XdmNode` and
//! `IndexedDocument`, used by tests, benches and quick prototypes.
//!
//! Nodes live in one `Vec` per document, in document order (a node, its
//! attributes, then its children). Parent links are arena indices, so a
//! `SimpleNode` is just a shared tree handle plus a position.
//!
//! Indexes are built once, when the document is built:
//! - the attribute index maps each attribute value to its attributes,
//! - the token index maps each whitespace token of an attribute value to its attributes.
//!
//! ```
//! use xdm_idref::model::simple::{attr, doc, elem};
//! use xdm_idref::model::{IndexKind, IndexedDocument, XdmNode};
//!
//! // <r><a id="x1"/><b idref="x1 x2"/></r>
//! let document = doc()
//!     .child(
//!         elem("r")
//!             .child(elem("a").attr(attr("id", "x1")))
//!             .child(elem("b").attr(attr("idref", "x1 x2"))),
//!     )
//!     .with_token_index()
//!     .build();
//!
//! let r = document.children().next().unwrap();
//! assert_eq!(r.name().unwrap().local, "r");
//! let store = document.document().unwrap();
//! assert!(store.index_for(IndexKind::Token).is_some());
//! assert!(store.index_for(IndexKind::Attribute).is_none());
//! ```
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use compact_str::CompactString;
use itertools::Itertools;
use string_cache::DefaultAtom;

use crate::engine::ids::tokens::xml_tokens;
use crate::engine::runtime::Error;
use crate::model::{DocumentKey, IndexKind, IndexRequest, IndexedDocument, NodeKind, QName, ValueIndex, XdmNode};

#[derive(Debug)]
struct NodeRec {
    kind: NodeKind,
    name: Option<QName>,
    value: String, // text / attribute / comment content
    parent: Option<usize>,
    attributes: Range<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
struct IndexData {
    postings: HashMap<CompactString, Vec<usize>>,
    names: Vec<DefaultAtom>,
    probes: AtomicUsize,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeRec>,
    attribute_index: Option<IndexData>,
    token_index: Option<IndexData>,
}

impl Tree {
    fn index(&self, kind: IndexKind) -> Option<&IndexData> {
        match kind {
            IndexKind::Attribute => self.attribute_index.as_ref(),
            IndexKind::Token => self.token_index.as_ref(),
        }
    }
}

/// Handle to a node inside a built document.
#[derive(Clone)]
pub struct SimpleNode {
    tree: Arc<Tree>,
    idx: usize,
}

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.idx == other.idx
    }
}
impl Eq for SimpleNode {}
impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        DocumentKey::of(&self.tree).hash(state);
        self.idx.hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rec = self.rec();
        f.debug_struct("SimpleNode")
            .field("kind", &rec.kind)
            .field("name", &rec.name)
            .field("value", &rec.value)
            .finish()
    }
}

impl SimpleNode {
    fn at(&self, idx: usize) -> SimpleNode {
        SimpleNode { tree: Arc::clone(&self.tree), idx }
    }

    fn rec(&self) -> &NodeRec {
        &self.tree.nodes[self.idx]
    }

    /// Position of the node in document order.
    pub fn order(&self) -> usize {
        self.idx
    }

    /// First attribute with the given lexical name.
    pub fn attribute(&self, lexical: &str) -> Option<SimpleNode> {
        let wanted = QName::parse(lexical);
        self.attributes().find(|a| {
            a.rec()
                .name
                .as_ref()
                .is_some_and(|q| q.prefix == wanted.prefix && q.local == wanted.local)
        })
    }
}

/// Shared handle to a built document; identity is the allocation.
#[derive(Clone)]
pub struct SimpleDocument(Arc<Tree>);

impl fmt::Debug for SimpleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleDocument")
            .field("nodes", &self.0.nodes.len())
            .field("attribute_index", &self.0.attribute_index.is_some())
            .field("token_index", &self.0.token_index.is_some())
            .finish()
    }
}

impl SimpleDocument {
    /// Root node of the document.
    pub fn root(&self) -> SimpleNode {
        SimpleNode { tree: Arc::clone(&self.0), idx: 0 }
    }

    /// How often the name summary of the given index has been read.
    pub fn summary_probes(&self, kind: IndexKind) -> usize {
        self.0.index(kind).map_or(0, |i| i.probes.load(Ordering::Relaxed))
    }
}

impl IndexedDocument for SimpleDocument {
    type Node = SimpleNode;
    type Index = SimpleIndex;

    fn key(&self) -> DocumentKey {
        DocumentKey::of(&self.0)
    }

    fn index_for(&self, kind: IndexKind) -> Option<SimpleIndex> {
        self.0.index(kind).map(|_| SimpleIndex { tree: Arc::clone(&self.0), kind })
    }
}

/// Handle to one of the indexes of a `SimpleDocument`.
#[derive(Debug, Clone)]
pub struct SimpleIndex {
    tree: Arc<Tree>,
    kind: IndexKind,
}

impl SimpleIndex {
    fn data(&self) -> &IndexData {
        // Handles are only created for indexes that exist.
        self.tree.index(self.kind).unwrap_or_else(|| unreachable!("index handle without index"))
    }
}

impl ValueIndex for SimpleIndex {
    type Node = SimpleNode;
    type Hits = SimpleHits;

    fn names(&self) -> Result<Vec<DefaultAtom>, Error> {
        let data = self.data();
        data.probes.fetch_add(1, Ordering::Relaxed);
        Ok(data.names.clone())
    }

    fn lookup(&self, request: &IndexRequest) -> Result<SimpleHits, Error> {
        debug_assert_eq!(request.kind, self.kind);
        Ok(SimpleHits {
            index: self.clone(),
            keys: request.keys.clone().into_iter(),
            current: Vec::new().into_iter(),
        })
    }
}

/// Lazy iterator over the postings of the requested keys, key by key.
pub struct SimpleHits {
    index: SimpleIndex,
    keys: std::vec::IntoIter<CompactString>,
    current: std::vec::IntoIter<usize>,
}

impl Iterator for SimpleHits {
    type Item = Result<SimpleNode, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(idx) = self.current.next() {
                return Some(Ok(SimpleNode { tree: Arc::clone(&self.index.tree), idx }));
            }
            let key = self.keys.next()?;
            if let Some(postings) = self.index.data().postings.get(&key) {
                self.current = postings.clone().into_iter();
            }
        }
    }
}

pub struct Siblings<'a> {
    node: &'a SimpleNode,
    ids: core::slice::Iter<'a, usize>,
}

impl Iterator for Siblings<'_> {
    type Item = SimpleNode;

    fn next(&mut self) -> Option<SimpleNode> {
        self.ids.next().map(|&i| self.node.at(i))
    }
}

pub struct AttributeIter<'a> {
    node: &'a SimpleNode,
    range: Range<usize>,
}

impl Iterator for AttributeIter<'_> {
    type Item = SimpleNode;

    fn next(&mut self) -> Option<SimpleNode> {
        self.range.next().map(|i| self.node.at(i))
    }
}

impl XdmNode for SimpleNode {
    type Children<'a> = Siblings<'a>;
    type Attributes<'a> = AttributeIter<'a>;
    type Document = SimpleDocument;

    fn kind(&self) -> NodeKind {
        self.rec().kind.clone()
    }

    fn name(&self) -> Option<QName> {
        self.rec().name.clone()
    }

    fn string_value(&self) -> String {
        match self.rec().kind {
            NodeKind::Element | NodeKind::Document => {
                fn dfs(tree: &Tree, idx: usize, out: &mut String) {
                    let rec = &tree.nodes[idx];
                    if rec.kind == NodeKind::Text {
                        out.push_str(&rec.value);
                    }
                    for &c in &rec.children {
                        dfs(tree, c, out);
                    }
                }
                let mut out = String::new();
                dfs(&self.tree, self.idx, &mut out);
                out
            }
            _ => self.rec().value.clone(),
        }
    }

    fn parent(&self) -> Option<Self> {
        self.rec().parent.map(|p| self.at(p))
    }

    fn children(&self) -> Siblings<'_> {
        Siblings { node: self, ids: self.rec().children.iter() }
    }

    fn attributes(&self) -> AttributeIter<'_> {
        AttributeIter { node: self, range: self.rec().attributes.clone() }
    }

    fn document(&self) -> Option<SimpleDocument> {
        Some(SimpleDocument(Arc::clone(&self.tree)))
    }
}

/// Attribute definition for `SimpleNodeBuilder::attr`.
#[derive(Debug, Clone)]
pub struct Attr {
    name: QName,
    value: String,
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    value: String,
    attrs: Vec<Attr>,
    children: Vec<SimpleNodeBuilder>,
    attribute_index: bool,
    token_index: bool,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>, value: String) -> Self {
        Self {
            kind,
            name,
            value,
            attrs: Vec::new(),
            children: Vec::new(),
            attribute_index: false,
            token_index: false,
        }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeBuilder>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        debug_assert!(self.kind == NodeKind::Element);
        self.attrs.push(attr);
        self
    }

    /// Build an attribute-value index with the document.
    pub fn with_attribute_index(mut self) -> Self {
        self.attribute_index = true;
        self
    }

    /// Build a token index with the document.
    pub fn with_token_index(mut self) -> Self {
        self.token_index = true;
        self
    }

    pub fn with_indexes(self) -> Self {
        self.with_attribute_index().with_token_index()
    }

    /// Builds the tree and returns its topmost node.
    pub fn build(self) -> SimpleNode {
        let (attribute_index, token_index) = (self.attribute_index, self.token_index);
        let mut nodes = Vec::new();
        flatten(self, None, &mut nodes);
        let tree = Tree {
            attribute_index: attribute_index.then(|| build_index(&nodes, IndexKind::Attribute)),
            token_index: token_index.then(|| build_index(&nodes, IndexKind::Token)),
            nodes,
        };
        SimpleNode { tree: Arc::new(tree), idx: 0 }
    }
}

fn flatten(b: SimpleNodeBuilder, parent: Option<usize>, nodes: &mut Vec<NodeRec>) -> usize {
    let idx = nodes.len();
    nodes.push(NodeRec {
        kind: b.kind,
        name: b.name,
        value: b.value,
        parent,
        attributes: 0..0,
        children: Vec::with_capacity(b.children.len()),
    });
    let start = nodes.len();
    for a in b.attrs {
        nodes.push(NodeRec {
            kind: NodeKind::Attribute,
            name: Some(a.name),
            value: a.value,
            parent: Some(idx),
            attributes: 0..0,
            children: Vec::new(),
        });
    }
    nodes[idx].attributes = start..nodes.len();
    for c in b.children {
        let cidx = flatten(c, Some(idx), nodes);
        nodes[idx].children.push(cidx);
    }
    idx
}

fn build_index(nodes: &[NodeRec], kind: IndexKind) -> IndexData {
    let mut data = IndexData::default();
    let mut names: Vec<DefaultAtom> = Vec::new();
    for (i, rec) in nodes.iter().enumerate().filter(|(_, r)| r.kind == NodeKind::Attribute) {
        let keys: Vec<&str> = match kind {
            IndexKind::Attribute => vec![rec.value.as_str()],
            IndexKind::Token => xml_tokens(&rec.value).unique().collect(),
        };
        if keys.is_empty() {
            continue;
        }
        for k in keys {
            data.postings.entry(CompactString::from(k)).or_default().push(i);
        }
        if let Some(q) = &rec.name {
            names.push(DefaultAtom::from(q.local.as_str()));
        }
    }
    data.names = names.into_iter().unique().collect();
    data
}

// Convenience helper functions for concise test code
pub fn doc() -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Document, None, String::new())
}
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Element, Some(QName::parse(name)), String::new())
}
pub fn text(v: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Text, None, v.to_string())
}
pub fn comment(v: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Comment, None, v.to_string())
}
pub fn attr(name: &str, v: &str) -> Attr {
    Attr { name: QName::parse(name), value: v.to_string() }
}
