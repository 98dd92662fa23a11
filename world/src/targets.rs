use gem_cascade_core::{TargetKey, TargetProgress, TargetSpec};

/// Remaining counts for the level's collection targets, in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TargetLedger {
    entries: Vec<TargetProgress>,
}

impl TargetLedger {
    pub(crate) fn new(specs: &[TargetSpec]) -> Self {
        Self {
            entries: specs
                .iter()
                .map(|spec| TargetProgress {
                    key: spec.key,
                    remaining: spec.count,
                })
                .collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts `amount` collected items against the target, saturating at zero.
    pub(crate) fn collect(&mut self, key: TargetKey, amount: u32) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.remaining = entry.remaining.saturating_sub(amount);
        }
    }

    /// Adds one required item to a tracked target.
    pub(crate) fn raise(&mut self, key: TargetKey) -> bool {
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.remaining = entry.remaining.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub(crate) fn all_met(&self) -> bool {
        self.entries.iter().all(|entry| entry.remaining == 0)
    }

    pub(crate) fn progress(&self) -> Vec<TargetProgress> {
        self.entries.clone()
    }
}
