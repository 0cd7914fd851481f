//! Allowed handoff edges between role kinds.

use homescout_core::{Result, RoleKind, ScoutError};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph of permitted handoffs.
///
/// Every non-coordinator role must have a path back to the coordinator, since
/// only the coordinator may complete a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoffGraph {
    edges: BTreeMap<RoleKind, BTreeSet<RoleKind>>,
}

impl HandoffGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator fans out to each specialist, each specialist returns to it.
    pub fn standard() -> Self {
        Self::new()
            .with_handoffs(RoleKind::Coordinator, [RoleKind::Retrieval, RoleKind::Translation])
            .with_handoffs(RoleKind::Retrieval, [RoleKind::Coordinator])
            .with_handoffs(RoleKind::Translation, [RoleKind::Coordinator])
    }

    #[must_use]
    pub fn with_handoffs(
        mut self,
        from: RoleKind,
        targets: impl IntoIterator<Item = RoleKind>,
    ) -> Self {
        self.edges.entry(from).or_default().extend(targets);
        self
    }

    /// Copy of the graph keeping only edges between `kinds`.
    pub fn restricted_to(&self, kinds: &BTreeSet<RoleKind>) -> Self {
        let edges = self
            .edges
            .iter()
            .filter(|(from, _)| kinds.contains(from))
            .map(|(from, targets)| (*from, targets.intersection(kinds).copied().collect()))
            .collect();
        Self { edges }
    }

    pub fn allows(&self, from: RoleKind, to: RoleKind) -> bool {
        self.edges.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    pub fn targets(&self, from: RoleKind) -> impl Iterator<Item = RoleKind> + '_ {
        self.edges.get(&from).into_iter().flatten().copied()
    }

    /// Every kind that appears in the graph, as a source or a target.
    pub fn kinds(&self) -> BTreeSet<RoleKind> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| std::iter::once(*from).chain(targets.iter().copied()))
            .collect()
    }

    pub fn reaches_coordinator(&self, from: RoleKind) -> bool {
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(kind) = queue.pop_front() {
            if kind.is_coordinator() {
                return true;
            }
            for next in self.targets(kind) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Checks that every role in the graph can get back to the coordinator.
    pub fn validate(&self) -> Result<()> {
        for kind in self.kinds() {
            if !self.reaches_coordinator(kind) {
                return Err(ScoutError::Config(format!(
                    "role '{kind}' has no handoff path back to the coordinator"
                )));
            }
        }
        Ok(())
    }
}
