use crate::aggregate::{Group, GroupMember};
use crate::identity::NonceIdentity;
use serde::Serialize;
use std::collections::BTreeMap;

/// A group is an attack surface once two ciphertexts share a keystream.
pub const EXPLOITABLE_MIN_MEMBERS: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct ExploitableGroup {
    pub identity: NonceIdentity,
    pub file_count: usize,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub unique_nonces: usize,
    pub exploitable_groups: usize,
    pub max_group_size: usize,
}

pub fn summarize(groups: &BTreeMap<NonceIdentity, Group>) -> GroupSummary {
    GroupSummary {
        unique_nonces: groups.len(),
        exploitable_groups: groups
            .values()
            .filter(|group| group.len() >= EXPLOITABLE_MIN_MEMBERS)
            .count(),
        max_group_size: groups.values().map(Group::len).max().unwrap_or(0),
    }
}

/// The groups with observed nonce reuse, ordered by descending member count;
/// ties broken by ascending identity so the listing is reproducible.
pub fn exploitable_groups(groups: &BTreeMap<NonceIdentity, Group>) -> Vec<ExploitableGroup> {
    let mut exploitable: Vec<ExploitableGroup> = groups
        .iter()
        .filter(|(_, group)| group.len() >= EXPLOITABLE_MIN_MEMBERS)
        .map(|(identity, group)| ExploitableGroup {
            identity: *identity,
            file_count: group.len(),
            members: group.members.clone(),
        })
        .collect();

    exploitable.sort_by(|a, b| {
        b.file_count
            .cmp(&a.file_count)
            .then_with(|| a.identity.cmp(&b.identity))
    });

    exploitable
}
