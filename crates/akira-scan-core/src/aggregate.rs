use crate::identity::NonceIdentity;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub path: PathBuf,
    pub size: u64,
}

/// Files sharing one nonce identity. Members accumulate during the scan and
/// are never removed; the group is read-only once the scan completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Group {
    pub members: Vec<GroupMember>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Counter snapshot taken when the scan finishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCounts {
    pub total_entries: usize,
    pub candidate_files: usize,
    pub valid_footers: usize,
    pub extraction_anomalies: usize,
    pub read_errors: usize,
}

/// Identity → group mapping built incrementally by scan workers.
///
/// Insertion for a given identity is serialized by the map's shard locks, so
/// two workers discovering the same identity concurrently both land in the
/// same group. Owned by one scan invocation; `finalize` converts it into the
/// immutable, deterministically ordered form consumers read.
#[derive(Default)]
pub struct NonceGroups {
    groups: DashMap<NonceIdentity, Vec<GroupMember>>,
    total_entries: AtomicUsize,
    candidate_files: AtomicUsize,
    valid_footers: AtomicUsize,
    extraction_anomalies: AtomicUsize,
    read_errors: AtomicUsize,
}

impl NonceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entry(&self) {
        self.total_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_candidate(&self) {
        self.candidate_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly(&self) {
        self.extraction_anomalies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn insert(&self, identity: NonceIdentity, member: GroupMember) {
        self.groups.entry(identity).or_default().push(member);
        self.valid_footers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_files.load(Ordering::Relaxed)
    }

    /// Consume the concurrent map into a `BTreeMap` ordered by identity,
    /// with members sorted by path so repeated scans of an unmodified tree
    /// produce byte-identical output.
    pub fn finalize(self) -> (BTreeMap<NonceIdentity, Group>, RawCounts) {
        let NonceGroups {
            groups,
            total_entries,
            candidate_files,
            valid_footers,
            extraction_anomalies,
            read_errors,
        } = self;

        let mut ordered = BTreeMap::new();
        for (identity, mut members) in groups {
            members.sort_by(|a, b| a.path.cmp(&b.path));
            ordered.insert(identity, Group { members });
        }

        let counts = RawCounts {
            total_entries: total_entries.into_inner(),
            candidate_files: candidate_files.into_inner(),
            valid_footers: valid_footers.into_inner(),
            extraction_anomalies: extraction_anomalies.into_inner(),
            read_errors: read_errors.into_inner(),
        };

        (ordered, counts)
    }
}
