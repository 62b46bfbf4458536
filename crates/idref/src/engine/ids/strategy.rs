use super::Direction;
use super::metadata::IndexMetadataCache;
use crate::engine::runtime::{Error, StrategyPreference};
use crate::model::IndexedDocument;
use tracing::debug;

/// How a resolution is executed against one document.
#[derive(Debug, Clone)]
pub enum Strategy<I> {
    /// Walk the tree from the document root.
    Scan,
    /// Query the given index and filter its hits by attribute name.
    IndexLookup(I),
}

impl<I> Strategy<I> {
    pub fn is_scan(&self) -> bool {
        matches!(self, Strategy::Scan)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Scan => "scan",
            Strategy::IndexLookup(_) => "index",
        }
    }
}

/// Picks the strategy for resolving `direction` in `doc`.
///
/// Scans when there is no owning document, no index for the direction, or
/// an index whose name summary holds no attribute classified for the
/// direction. Summary errors are returned as is.
pub fn select<D: IndexedDocument>(
    doc: Option<&D>,
    direction: Direction,
    preference: StrategyPreference,
    cache: &mut IndexMetadataCache<D>,
) -> Result<Strategy<D::Index>, Error> {
    if preference == StrategyPreference::ScanOnly {
        debug!(?direction, "scan forced by options");
        return Ok(Strategy::Scan);
    }
    let Some(doc) = doc else {
        debug!(?direction, "no owning document, scanning");
        return Ok(Strategy::Scan);
    };
    let Some(index) = doc.index_for(direction.index_kind()) else {
        debug!(?direction, kind = ?direction.index_kind(), "no index, scanning");
        return Ok(Strategy::Scan);
    };
    if cache.contains_ids(doc, &index, direction)? {
        Ok(Strategy::IndexLookup(index))
    } else {
        debug!(?direction, "index holds no id attributes, scanning");
        Ok(Strategy::Scan)
    }
}
