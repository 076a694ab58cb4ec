//! Capability detection registry.
//!
//! Each capability is paired with a probe function that checks whether the
//! underlying primitive exists without calling it. Probes must be side
//! effect free: detection is availability-only, and the invocation paths
//! (in [`crate::prober`]) are only reached after an availability check.

use std::path::Path;

use super::{Capability, CapabilityMatrix};

/// A capability paired with its availability probe.
struct CapabilityProbe {
    capability: Capability,
    probe: fn() -> bool,
}

/// Registry of availability probes for the fixed capability set.
pub struct CapabilityRegistry {
    probes: Vec<CapabilityProbe>,
}

impl CapabilityRegistry {
    /// The default registry covering every [`Capability`].
    pub fn builtin() -> Self {
        Self {
            probes: vec![
                CapabilityProbe {
                    capability: Capability::ShellExecution,
                    probe: shell_available,
                },
                CapabilityProbe {
                    capability: Capability::CodeEvaluation,
                    probe: || false,
                },
                CapabilityProbe {
                    capability: Capability::ProcessSpawning,
                    probe: || true,
                },
                CapabilityProbe {
                    capability: Capability::EnvMutation,
                    probe: || true,
                },
                CapabilityProbe {
                    capability: Capability::OwnershipChange,
                    probe: || cfg!(unix),
                },
                CapabilityProbe {
                    capability: Capability::PermissionChange,
                    probe: permission_change_available,
                },
                CapabilityProbe {
                    capability: Capability::IdentityIntrospection,
                    probe: || cfg!(unix),
                },
                CapabilityProbe {
                    capability: Capability::FileStat,
                    probe: || true,
                },
            ],
        }
    }

    /// Run every probe and collect the availability matrix.
    pub fn detect(&self) -> CapabilityMatrix {
        let mut matrix = CapabilityMatrix::default();
        for entry in &self.probes {
            let available = (entry.probe)();
            tracing::debug!(
                capability = entry.capability.as_str(),
                available,
                "capability probed"
            );
            matrix.insert(entry.capability, available);
        }
        matrix
    }
}

/// A shell is available if the conventional interpreter exists on disk.
fn shell_available() -> bool {
    if cfg!(windows) {
        std::env::var_os("COMSPEC").is_some()
    } else {
        Path::new("/bin/sh").exists()
    }
}

/// Mode-bit mutation exists on Unix; elsewhere only the readonly flag does,
/// which cannot express the 0777 probe, so it counts as unavailable.
fn permission_change_available() -> bool {
    cfg!(unix)
}
