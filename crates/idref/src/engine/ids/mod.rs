//! Identifier resolution: the engine behind `fn:id` and `fn:idref`.
//!
//! A resolution builds a [`TokenSet`] from the requested values, checks that
//! the context node sits in a document, and then either walks the document
//! ([`scan::ScanCursor`]) or queries one of its indexes
//! ([`lookup::LookupCursor`]). Which path is taken is decided per document by
//! [`strategy::select`], backed by an [`metadata::IndexMetadataCache`] that
//! lives as long as the resolver.

pub mod classify;
pub mod lookup;
pub mod metadata;
pub mod scan;
pub mod strategy;
pub mod tokens;

pub use classify::is_id_attribute;
pub use lookup::LookupCursor;
pub use metadata::IndexMetadataCache;
pub use scan::ScanCursor;
pub use strategy::Strategy;
pub use tokens::TokenSet;

use crate::engine::runtime::{Error, ResolverOptions};
use crate::model::{IndexKind, IndexedDocument, NodeKind, ValueIndex, XdmNode};
use tracing::{debug, trace};

/// Which side of an ID/IDREF relation is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Elements owning an ID attribute with one of the tokens.
    Id,
    /// IDREF attributes referencing one of the tokens.
    IdRef,
}

impl Direction {
    /// Index able to answer lookups in this direction.
    pub fn index_kind(self) -> IndexKind {
        match self {
            Direction::Id => IndexKind::Attribute,
            Direction::IdRef => IndexKind::Token,
        }
    }
}

type DocOf<N> = <N as XdmNode>::Document;
type IndexOf<N> = <DocOf<N> as IndexedDocument>::Index;
pub type IndexHits<N> = <IndexOf<N> as ValueIndex>::Hits;

/// Lazily produced result of one resolution.
pub enum IdSequence<N: XdmNode> {
    Scan(ScanCursor<N>),
    Lookup(LookupCursor<N, IndexHits<N>>),
}

impl<N: XdmNode> IdSequence<N> {
    pub fn is_scan(&self) -> bool {
        matches!(self, IdSequence::Scan(_))
    }

    /// Drains the sequence, stopping at the first error.
    pub fn materialize(self) -> Result<Vec<N>, Error> {
        self.collect()
    }
}

impl<N: XdmNode> Iterator for IdSequence<N> {
    type Item = Result<N, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            IdSequence::Scan(c) => c.next().map(Ok),
            IdSequence::Lookup(c) => c.next(),
        }
    }
}

/// Resolves identifier tokens against the documents of one query evaluation.
///
/// The resolver remembers, per document, whether its indexes can answer
/// lookups. It is meant to be short-lived and used from one thread; run
/// concurrent evaluations with separate resolvers.
pub struct IdResolver<N: XdmNode> {
    options: ResolverOptions,
    metadata: IndexMetadataCache<N::Document>,
}

impl<N: XdmNode> Default for IdResolver<N> {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl<N: XdmNode> IdResolver<N> {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            metadata: IndexMetadataCache::new(),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Number of documents with cached index metadata.
    pub fn cached_documents(&self) -> usize {
        self.metadata.len()
    }

    /// Resolves the tokens of `token_source` relative to the document containing `context`.
    ///
    /// Fails with `err:FODC0001` before any traversal if the root of `context`
    /// is not a document node. Errors from the token source and from index
    /// summaries are returned as is, with the resolver's location attached.
    pub fn resolve<I, S>(&mut self, token_source: I, context: &N, direction: Direction) -> Result<IdSequence<N>, Error>
    where
        I: IntoIterator<Item = Result<S, Error>>,
        S: AsRef<str>,
    {
        let location = self.options.location.as_ref();
        let tokens = TokenSet::from_source(token_source).map_err(|e| e.located(location))?;
        let root = context.root();
        if root.kind() != NodeKind::Document {
            return Err(Error::root_not_document().located(location));
        }
        trace!(?direction, tokens = tokens.len(), "resolving identifiers");

        let document = root.document();
        let strategy = strategy::select(document.as_ref(), direction, self.options.strategy, &mut self.metadata)
            .map_err(|e| e.located(location))?;
        debug!(?direction, strategy = strategy.label(), "identifier resolution");
        match strategy {
            Strategy::Scan => Ok(IdSequence::Scan(ScanCursor::new(root, tokens, direction))),
            Strategy::IndexLookup(index) => {
                let cursor = LookupCursor::open(&index, &tokens, direction, self.options.location.clone())
                    .map_err(|e| e.located(location))?;
                Ok(IdSequence::Lookup(cursor))
            }
        }
    }
}
