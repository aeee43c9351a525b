//! Track catalog: category -> ordered list of bundled tracks

use crate::error::{MusicError, Result};
use crate::types::{TrackCategory, TrackHandle, TrackRegistration};
use std::collections::HashMap;

/// Mapping from category to the tracks registered under it
///
/// Built once per initialize/destroy cycle and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct Catalog {
    tracks: HashMap<TrackCategory, Vec<TrackHandle>>,
}

impl Catalog {
    /// Build a catalog by registering every track in order
    pub fn from_registrations<'a>(
        registrations: impl IntoIterator<Item = &'a TrackRegistration>,
    ) -> Self {
        let mut catalog = Self::default();
        for registration in registrations {
            catalog.insert_or_append(registration.category, registration.handle);
        }
        catalog
    }

    fn insert_or_append(&mut self, category: TrackCategory, handle: TrackHandle) {
        self.tracks.entry(category).or_default().push(handle);
    }

    /// Tracks registered for a category
    ///
    /// Fails with `InvalidArgument` when nothing is registered under it.
    pub fn tracks(&self, category: TrackCategory) -> Result<&[TrackHandle]> {
        self.tracks
            .get(&category)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                MusicError::invalid_argument(format!("no tracks registered for {}", category))
            })
    }

    pub fn count(&self, category: TrackCategory) -> Result<usize> {
        self.tracks(category).map(<[TrackHandle]>::len)
    }

    /// Look up one track by position
    pub fn track(&self, category: TrackCategory, index: usize) -> Result<TrackHandle> {
        let tracks = self.tracks(category)?;
        tracks
            .get(index)
            .copied()
            .ok_or(MusicError::IndexOutOfRange {
                category,
                index,
                count: tracks.len(),
            })
    }
}
