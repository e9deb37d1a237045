use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use upgrade_extractor::ChangeType;

/// Restriction of a structural query to a set of change types.
///
/// `None` at a call site means "all types"; a `TypeFilter` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeFilter(BTreeSet<ChangeType>);

impl TypeFilter {
    #[must_use]
    pub fn single(change_type: ChangeType) -> Self {
        Self(BTreeSet::from([change_type]))
    }

    /// `None` when `types` is empty.
    pub fn from_types(types: impl IntoIterator<Item = ChangeType>) -> Option<Self> {
        let set: BTreeSet<ChangeType> = types.into_iter().collect();
        (!set.is_empty()).then_some(Self(set))
    }

    #[must_use]
    pub fn contains(&self, change_type: ChangeType) -> bool {
        self.0.contains(&change_type)
    }

    /// Types in priority order.
    pub fn types(&self) -> impl Iterator<Item = ChangeType> + '_ {
        self.0.iter().copied()
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.types().map(ChangeType::as_str).collect();
        f.write_str(&names.join(","))
    }
}
