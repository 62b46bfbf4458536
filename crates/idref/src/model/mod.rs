use crate::engine::runtime::Error;
use compact_str::CompactString;
use core::hash::Hash;
use core::marker::PhantomData;
use std::sync::Arc;
use string_cache::DefaultAtom;

pub mod simple;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    /// Splits a lexical `prefix:local` name. The `xml` prefix is bound to its
    /// reserved namespace; other prefixes stay unbound.
    pub fn parse(lexical: &str) -> Self {
        match lexical.split_once(':') {
            Some((prefix, local)) => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
                ns_uri: (prefix == "xml").then(|| crate::consts::XML_URI.to_string()),
            },
            None => QName {
                prefix: None,
                local: lexical.to_string(),
                ns_uri: None,
            },
        }
    }
}

/// A node borrowed from an external document store.
///
/// Handles are cheap to clone. `parent()` is a lookup, never an owning link;
/// equality and hashing must reflect node identity, not content.
pub trait XdmNode: Clone + Eq + Hash + core::fmt::Debug + Send + Sync + 'static {
    type Children<'a>: Iterator<Item = Self> + Send + 'a
    where
        Self: 'a;
    type Attributes<'a>: Iterator<Item = Self> + Send + 'a
    where
        Self: 'a;
    /// The indexed document this node belongs to. Adapters without indexes
    /// use [`Detached`].
    type Document: IndexedDocument<Node = Self>;

    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Self::Children<'_>;
    fn attributes(&self) -> Self::Attributes<'_>;

    /// Owning indexed document, if the node lives in one.
    fn document(&self) -> Option<Self::Document> {
        None
    }

    /// Topmost ancestor (or the node itself).
    fn root(&self) -> Self {
        let mut n = self.clone();
        while let Some(p) = n.parent() {
            n = p;
        }
        n
    }
}

/// The two index structures a document may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Full attribute values mapped to the attributes carrying them.
    Attribute,
    /// Whitespace-separated tokens of attribute values mapped to the attributes carrying them.
    Token,
}

/// Identity of a document handle.
///
/// Two handles compare equal only if they refer to the same document
/// instance. The key is only stable while some handle to the document is
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey(usize);

impl DocumentKey {
    /// Key derived from the address of a shared document allocation.
    pub fn of<T>(shared: &Arc<T>) -> Self {
        DocumentKey(Arc::as_ptr(shared).cast::<()>() as usize)
    }
}

pub trait IndexedDocument: Clone + Send + Sync {
    type Node: XdmNode;
    type Index: ValueIndex<Node = Self::Node>;

    fn key(&self) -> DocumentKey;
    fn index_for(&self, kind: IndexKind) -> Option<Self::Index>;
}

/// Keys of a single index lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    pub kind: IndexKind,
    pub keys: Vec<CompactString>,
}

pub trait ValueIndex {
    type Node: XdmNode;
    type Hits: Iterator<Item = Result<Self::Node, Error>>;

    /// Local names of the attributes that contributed entries to the index.
    fn names(&self) -> Result<Vec<DefaultAtom>, Error>;

    /// Attribute nodes whose value (or one of its tokens) equals one of the keys.
    fn lookup(&self, request: &IndexRequest) -> Result<Self::Hits, Error>;
}

/// Document type for adapters whose nodes never belong to an indexed document.
#[derive(Debug, Clone)]
pub enum Detached<N> {
    #[doc(hidden)]
    Never(core::convert::Infallible, PhantomData<N>),
}

impl<N: XdmNode> IndexedDocument for Detached<N> {
    type Node = N;
    type Index = NoIndex<N>;

    fn key(&self) -> DocumentKey {
        match self {
            Detached::Never(never, _) => match *never {},
        }
    }

    fn index_for(&self, _kind: IndexKind) -> Option<Self::Index> {
        None
    }
}

/// Index type of [`Detached`]; never constructed.
#[derive(Debug, Clone)]
pub enum NoIndex<N> {
    #[doc(hidden)]
    Never(core::convert::Infallible, PhantomData<N>),
}

impl<N: XdmNode> ValueIndex for NoIndex<N> {
    type Node = N;
    type Hits = core::iter::Empty<Result<N, Error>>;

    fn names(&self) -> Result<Vec<DefaultAtom>, Error> {
        match self {
            NoIndex::Never(never, _) => match *never {},
        }
    }

    fn lookup(&self, _request: &IndexRequest) -> Result<Self::Hits, Error> {
        match self {
            NoIndex::Never(never, _) => match *never {},
        }
    }
}
