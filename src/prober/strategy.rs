//! Ownership-heuristic strategy selection.
//!
//! Selection is a decision table keyed on two capability booleans,
//! evaluated once. Exactly one strategy runs per probe, and selection
//! depends only on capability availability, never on the verdict.

use serde::Serialize;

use crate::capability::{Capability, CapabilityMatrix};

/// The three mutually exclusive ownership heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Compare process uid/euid against the executable's owner uid.
    PosixIdentity,
    /// Attempt a reversible chmod of the probe directory.
    ChmodProbe,
    /// Empirical write test with a temporary file.
    WriteTest,
}

impl Strategy {
    /// Select a strategy from the capability matrix.
    ///
    /// | identity introspection | permission change | strategy      |
    /// |------------------------|-------------------|---------------|
    /// | available              | any               | PosixIdentity |
    /// | unavailable            | available         | ChmodProbe    |
    /// | unavailable            | unavailable       | WriteTest     |
    pub fn select(caps: &CapabilityMatrix) -> Self {
        let identity = caps.has(Capability::IdentityIntrospection);
        let chmod = caps.has(Capability::PermissionChange);
        match (identity, chmod) {
            (true, _) => Strategy::PosixIdentity,
            (false, true) => Strategy::ChmodProbe,
            (false, false) => Strategy::WriteTest,
        }
    }

    /// Report name for this strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::PosixIdentity => "posix_identity",
            Strategy::ChmodProbe => "chmod_probe",
            Strategy::WriteTest => "write_test",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(identity: bool, chmod: bool) -> CapabilityMatrix {
        CapabilityMatrix::from_entries([
            (Capability::IdentityIntrospection, identity),
            (Capability::PermissionChange, chmod),
        ])
    }

    #[test]
    fn identity_available_selects_posix() {
        assert_eq!(Strategy::select(&matrix(true, true)), Strategy::PosixIdentity);
        assert_eq!(
            Strategy::select(&matrix(true, false)),
            Strategy::PosixIdentity
        );
    }

    #[test]
    fn chmod_only_selects_chmod_probe() {
        assert_eq!(Strategy::select(&matrix(false, true)), Strategy::ChmodProbe);
    }

    #[test]
    fn neither_selects_write_test() {
        assert_eq!(Strategy::select(&matrix(false, false)), Strategy::WriteTest);
    }

    #[test]
    fn selection_is_total_over_the_decision_table() {
        // Every combination of the two booleans yields exactly one strategy.
        for identity in [false, true] {
            for chmod in [false, true] {
                let _ = Strategy::select(&matrix(identity, chmod));
            }
        }
    }

    #[test]
    fn empty_matrix_falls_back_to_write_test() {
        let empty = CapabilityMatrix::from_entries([]);
        assert_eq!(Strategy::select(&empty), Strategy::WriteTest);
    }
}
