use super::{Direction, TokenSet, classify::is_id_attribute};
use crate::engine::location::Location;
use crate::engine::runtime::Error;
use crate::model::{IndexRequest, NodeKind, ValueIndex, XdmNode};
use std::collections::HashSet;
use tracing::trace;

/// Filters index hits down to ID owners or IDREF attributes.
///
/// The index matches on values only; names are checked here. Results come
/// out in index order and each node at most once.
pub struct LookupCursor<N, H> {
    hits: H,
    direction: Direction,
    seen: HashSet<N>,
    location: Option<Location>,
}

impl<N: XdmNode, H: Iterator<Item = Result<N, Error>>> LookupCursor<N, H> {
    /// Issues the lookup for `tokens` against `index`.
    pub fn open<I>(index: &I, tokens: &TokenSet, direction: Direction, location: Option<Location>) -> Result<Self, Error>
    where
        I: ValueIndex<Node = N, Hits = H>,
    {
        let request = IndexRequest {
            kind: direction.index_kind(),
            keys: tokens.request_keys(),
        };
        trace!(kind = ?request.kind, keys = request.keys.len(), "index lookup");
        let hits = index.lookup(&request)?;
        Ok(Self {
            hits,
            direction,
            seen: HashSet::new(),
            location,
        })
    }

    fn accept(&self, attr: N) -> Option<N> {
        if attr.kind() != NodeKind::Attribute {
            return None;
        }
        let name = attr.name()?;
        if !is_id_attribute(&name.local, self.direction) {
            return None;
        }
        match self.direction {
            Direction::IdRef => Some(attr),
            Direction::Id => attr.parent(),
        }
    }
}

impl<N: XdmNode, H: Iterator<Item = Result<N, Error>>> Iterator for LookupCursor<N, H> {
    type Item = Result<N, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let attr = match self.hits.next()? {
                Ok(a) => a,
                Err(e) => return Some(Err(e.located(self.location.as_ref()))),
            };
            if let Some(result) = self.accept(attr)
                && self.seen.insert(result.clone())
            {
                return Some(Ok(result));
            }
        }
    }
}
