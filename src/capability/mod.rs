//! Capability model for the host probe.
//!
//! A capability is an OS- or runtime-exposed primitive (spawning processes,
//! changing file ownership, ...) whose mere availability is part of the
//! security report, independent of whether it is exercised. Detection is
//! registry-driven: each capability maps to a guarded probe that reports
//! availability without invoking the primitive — absence is a reportable
//! fact, never an error.

pub mod registry;

pub use registry::CapabilityRegistry;

use std::collections::BTreeMap;

use serde::Serialize;

/// The fixed set of probed capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Running a command line through the system shell.
    ShellExecution,
    /// Evaluating code at runtime. Always absent in a compiled binary;
    /// reported so the output stays comparable across probe implementations.
    CodeEvaluation,
    /// Spawning and waiting on child processes.
    ProcessSpawning,
    /// Mutating the process environment.
    EnvMutation,
    /// Changing file ownership (`chown`).
    OwnershipChange,
    /// Changing file permission bits (`chmod`).
    PermissionChange,
    /// Reading the process's real/effective uid and gid.
    IdentityIntrospection,
    /// Reading file metadata (`stat`).
    FileStat,
}

impl Capability {
    /// All capabilities, in report order.
    pub const ALL: &'static [Capability] = &[
        Capability::ShellExecution,
        Capability::CodeEvaluation,
        Capability::ProcessSpawning,
        Capability::EnvMutation,
        Capability::OwnershipChange,
        Capability::PermissionChange,
        Capability::IdentityIntrospection,
        Capability::FileStat,
    ];

    /// Parse a capability from its report name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shell_execution" => Some(Self::ShellExecution),
            "code_evaluation" => Some(Self::CodeEvaluation),
            "process_spawning" => Some(Self::ProcessSpawning),
            "env_mutation" => Some(Self::EnvMutation),
            "ownership_change" => Some(Self::OwnershipChange),
            "permission_change" => Some(Self::PermissionChange),
            "identity_introspection" => Some(Self::IdentityIntrospection),
            "file_stat" => Some(Self::FileStat),
            _ => None,
        }
    }

    /// Report name for this capability.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShellExecution => "shell_execution",
            Self::CodeEvaluation => "code_evaluation",
            Self::ProcessSpawning => "process_spawning",
            Self::EnvMutation => "env_mutation",
            Self::OwnershipChange => "ownership_change",
            Self::PermissionChange => "permission_change",
            Self::IdentityIntrospection => "identity_introspection",
            Self::FileStat => "file_stat",
        }
    }
}

/// Availability of every probed capability for the current runtime.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CapabilityMatrix {
    entries: BTreeMap<Capability, bool>,
}

impl CapabilityMatrix {
    /// Probe the current runtime via the default registry.
    pub fn detect() -> Self {
        CapabilityRegistry::builtin().detect()
    }

    /// Build a matrix from explicit entries.
    ///
    /// Used by the heuristic tests to simulate runtimes where introspection
    /// or permission mutation is unavailable.
    pub fn from_entries(entries: impl IntoIterator<Item = (Capability, bool)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Whether a capability is available. Missing entries are unavailable.
    pub fn has(&self, capability: Capability) -> bool {
        self.entries.get(&capability).copied().unwrap_or(false)
    }

    /// Whether a capability named `name` is available.
    ///
    /// Unknown names are unavailable, never an error.
    pub fn is_available(&self, name: &str) -> bool {
        Capability::from_name(name).is_some_and(|cap| self.has(cap))
    }

    /// Iterate entries in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.entries.iter().map(|(cap, avail)| (*cap, *avail))
    }

    pub(crate) fn insert(&mut self, capability: Capability, available: bool) {
        self.entries.insert(capability, available);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_name(cap.as_str()), Some(*cap));
        }
    }

    #[test]
    fn unknown_capability_name_is_unavailable_not_an_error() {
        let matrix = CapabilityMatrix::detect();
        assert!(!matrix.is_available("telepathy"));
        assert!(!matrix.is_available(""));
    }

    #[test]
    fn detect_covers_the_whole_fixed_set() {
        let matrix = CapabilityMatrix::detect();
        assert_eq!(matrix.iter().count(), Capability::ALL.len());
    }

    #[test]
    fn missing_entry_reads_as_unavailable() {
        let matrix = CapabilityMatrix::from_entries([(Capability::FileStat, true)]);
        assert!(matrix.has(Capability::FileStat));
        assert!(!matrix.has(Capability::ShellExecution));
    }

    #[test]
    fn code_evaluation_is_never_available() {
        // Compiled binary: no runtime eval primitive exists.
        let matrix = CapabilityMatrix::detect();
        assert!(!matrix.has(Capability::CodeEvaluation));
    }

    #[cfg(unix)]
    #[test]
    fn unix_runtime_has_identity_introspection() {
        let matrix = CapabilityMatrix::detect();
        assert!(matrix.has(Capability::IdentityIntrospection));
        assert!(matrix.has(Capability::PermissionChange));
    }
}
