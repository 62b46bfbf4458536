use super::{Direction, classify::is_id_attribute};
use crate::engine::runtime::Error;
use crate::model::{DocumentKey, IndexedDocument, ValueIndex};
use std::collections::HashMap;
use tracing::debug;

struct Entry<D> {
    // Keeps the document alive so its key cannot be handed to another document.
    _pinned: D,
    ids: Option<bool>,
    idrefs: Option<bool>,
}

impl<D> Entry<D> {
    fn slot(&mut self, direction: Direction) -> &mut Option<bool> {
        match direction {
            Direction::Id => &mut self.ids,
            Direction::IdRef => &mut self.idrefs,
        }
    }
}

/// Per-document record of whether an index carries id-like attribute names.
///
/// Keyed by document identity. Entries are filled on first use and never
/// invalidated; the cache lives as long as the resolver that owns it.
pub struct IndexMetadataCache<D> {
    entries: HashMap<DocumentKey, Entry<D>>,
}

impl<D> Default for IndexMetadataCache<D> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<D: IndexedDocument> IndexMetadataCache<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer for `doc`, if one was computed.
    pub fn get(&self, doc: &D, direction: Direction) -> Option<bool> {
        let entry = self.entries.get(&doc.key())?;
        match direction {
            Direction::Id => entry.ids,
            Direction::IdRef => entry.idrefs,
        }
    }

    /// Whether `index` (belonging to `doc`) lists any attribute name
    /// classified for `direction`. The name summary is read at most once per
    /// document and direction.
    pub fn contains_ids(&mut self, doc: &D, index: &D::Index, direction: Direction) -> Result<bool, Error> {
        let entry = self.entries.entry(doc.key()).or_insert_with(|| Entry {
            _pinned: doc.clone(),
            ids: None,
            idrefs: None,
        });
        let slot = entry.slot(direction);
        if let Some(known) = *slot {
            return Ok(known);
        }
        let names = index.names()?;
        let found = names.iter().any(|n| is_id_attribute(n, direction));
        debug!(?direction, names = names.len(), found, "index name summary cached");
        *slot = Some(found);
        Ok(found)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
