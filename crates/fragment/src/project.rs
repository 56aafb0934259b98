//! The owning collection of fragments.
//!
//! One [`Project`] owns every [`FragmentRecord`] of a working session;
//! nothing else holds records longer than the project does. The
//! collection preserves insertion order, which is the order the list UI
//! presents fragments in.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{FragmentError, Result},
    fragment::{FragmentRecord, SerializedFragment, UNGROUPED},
};

/// Which fragments a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Ungrouped,
    Group(i32),
}

impl GroupFilter {
    fn matches(&self, record: &FragmentRecord) -> bool {
        match *self {
            GroupFilter::All => true,
            GroupFilter::Ungrouped => record.group_id == UNGROUPED,
            GroupFilter::Group(id) => record.group_id == id,
        }
    }
}

/// What a bulk load does with a fragment whose geometry setup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Drop the failing fragment, keep loading.
    Skip,
    /// Keep the failing fragment as a geometry-less placeholder.
    Placeholder,
    /// Fail the whole load on the first error.
    Abort,
}

/// Owning collection of fragments.
#[derive(Debug, Clone, Default)]
pub struct Project {
    fragments: Vec<FragmentRecord>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Smallest id not yet in use.
    pub fn next_id(&self) -> u32 {
        self.fragments.iter().map(|f| f.id + 1).max().unwrap_or(0)
    }

    pub fn add(&mut self, record: FragmentRecord) {
        self.fragments.push(record);
    }

    /// Remove and return the fragment with the given id.
    pub fn remove(&mut self, id: u32) -> Result<FragmentRecord> {
        let idx = self
            .fragments
            .iter()
            .position(|f| f.id == id)
            .ok_or(FragmentError::UnknownFragment(id))?;
        Ok(self.fragments.remove(idx))
    }

    pub fn get(&self, id: u32) -> Option<&FragmentRecord> {
        self.fragments.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut FragmentRecord> {
        self.fragments.iter_mut().find(|f| f.id == id)
    }

    /// Fragments matching the filter, in insertion order.
    pub fn fragments(&self, filter: GroupFilter) -> impl Iterator<Item = &FragmentRecord> {
        self.fragments.iter().filter(move |f| filter.matches(f))
    }

    /// Ids of the groups currently in use, ascending, without duplicates.
    pub fn group_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .fragments
            .iter()
            .map(|f| f.group_id)
            .filter(|&g| g != UNGROUPED)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Snapshot every fragment into the persistence schema.
    pub fn to_records(&self) -> Vec<SerializedFragment> {
        self.fragments.iter().map(FragmentRecord::to_record).collect()
    }

    /// Restore a project from serialized records.
    ///
    /// Stored geometry is trusted as-is; no rasters are touched. See
    /// [`load_records_with_rasters`](Self::load_records_with_rasters) for
    /// the re-deriving variant.
    pub fn from_records(records: Vec<SerializedFragment>) -> Self {
        Self {
            fragments: records.into_iter().map(FragmentRecord::from_record).collect(),
        }
    }

    /// Restore a project, reloading rasters and re-deriving geometry from
    /// pixels. Per-fragment geometry failures are handled according to
    /// `policy`; fragments without a filename are kept as stored.
    pub fn load_records_with_rasters(
        records: Vec<SerializedFragment>,
        policy: LoadPolicy,
    ) -> Result<Self> {
        let mut project = Self::new();

        for record in records {
            let mut fragment = FragmentRecord::from_record(record);
            if fragment.source_path.is_empty() {
                project.add(fragment);
                continue;
            }

            let outcome = fragment
                .reload_rasters()
                .and_then(|_| fragment.rebuild_geometry());

            match outcome {
                Ok(()) => project.add(fragment),
                Err(err) => match policy {
                    LoadPolicy::Abort => return Err(err),
                    LoadPolicy::Skip => {
                        warn!(id = fragment.id, %err, "skipping fragment with failed geometry");
                    }
                    LoadPolicy::Placeholder => {
                        warn!(id = fragment.id, %err, "keeping fragment as placeholder");
                        let mut placeholder =
                            FragmentRecord::placeholder(fragment.bbox.x, fragment.bbox.y, fragment.id);
                        placeholder.source_path = fragment.source_path.clone();
                        placeholder.group_id = fragment.group_id;
                        placeholder.note = fragment.note.clone();
                        project.add(placeholder);
                    }
                },
            }
        }

        Ok(project)
    }
}
