//! The diagnostic pass.
//!
//! One linear run: runtime identification, capability report, permission
//! report, then the ownership heuristic. The only resources a run acquires
//! are transient — a temporary file (write test) or a temporarily widened
//! directory mode (chmod probe) — and each is released on the same control
//! path that acquired it.
//!
//! # Architecture
//!
//! - [`strategy`] - Decision table selecting one of the three heuristics
//! - [`Prober`] - Drives the pass and collects the [`HostReport`]
//! - `run_posix_identity` / `run_chmod_probe` / `run_write_test` - The
//!   independently testable heuristic branches

pub mod strategy;

pub use strategy::Strategy;

use std::fs;
use std::path::{Path, PathBuf};

use crate::capability::CapabilityMatrix;
use crate::config::ProbeConfig;
use crate::error::{HostProbeError, Result};
use crate::identity::{self, ProcessIdentity};
use crate::perms::{self, FilePermissions, PermClass};
use crate::report::{self, HostReport, PathEntry, Reporter, RuntimeInfo, ScriptInfo};

/// Drives one diagnostic pass.
pub struct Prober<'a> {
    config: &'a ProbeConfig,
}

impl<'a> Prober<'a> {
    /// Create a prober against a validated configuration.
    pub fn new(config: &'a ProbeConfig) -> Self {
        Self { config }
    }

    /// Run the full pass: report runtime, capabilities, and permissions,
    /// then apply the ownership heuristic and report the verdict.
    ///
    /// Returns the collected report on completion; the verdict itself is
    /// informational and never turns into an error. Fatal conditions
    /// (globally writable probe directory, failed permission restoration,
    /// undeletable write-test artifact) surface as errors.
    pub fn run(&self, reporter: &Reporter) -> Result<HostReport> {
        let runtime = RuntimeInfo::collect();
        reporter.info(&runtime.banner());
        reporter.blank();

        let capabilities = CapabilityMatrix::detect();
        reporter.info("Let's check some capabilities first:");
        for (cap, available) in capabilities.iter() {
            reporter.info(&format!(
                "Is '{}' available? {}",
                cap.as_str(),
                if available { "T" } else { "F" }
            ));
        }
        reporter.blank();

        let script = script_info(&self.config.script_path)?;
        reporter.info(&format!("Script permissions: {}", script.perms));
        reporter.blank();

        let restricted_paths = self.report_restricted_paths(reporter)?;

        reporter.info("Starting process owner detection:");
        let strategy = self
            .config
            .forced_strategy
            .unwrap_or_else(|| Strategy::select(&capabilities));
        tracing::debug!(strategy = strategy.as_str(), "heuristic selected");

        let owner_match = match strategy {
            Strategy::PosixIdentity => run_posix_identity(&self.config.script_path, reporter),
            Strategy::ChmodProbe => run_chmod_probe(&self.config.probe_dir, reporter)?,
            Strategy::WriteTest => {
                let outcome = run_write_test(&self.config.probe_dir, reporter)?;
                finish_write_test(outcome, reporter)?
            }
        };

        reporter.blank();
        reporter.info(report::verdict_line(owner_match));

        Ok(HostReport {
            runtime,
            capabilities,
            script,
            restricted_paths,
            identity: ProcessIdentity::current(),
            strategy: strategy.as_str().to_string(),
            owner_match,
        })
    }

    /// Report owner and permissions for every entry of each restricted path.
    ///
    /// A configured directory that cannot be listed is fatal, like the
    /// probe directory itself.
    fn report_restricted_paths(&self, reporter: &Reporter) -> Result<Vec<PathEntry>> {
        let mut entries = Vec::new();
        if self.config.restricted_paths.is_empty() {
            return Ok(entries);
        }

        reporter.info("Restricted path permissions:");
        for dir in &self.config.restricted_paths {
            for path in perms::list_dir(dir)? {
                let entry = report::path_entry(&path);
                reporter.info(&format!(
                    "'{}'\t{}\t{}",
                    entry.path,
                    entry
                        .owner_uid
                        .map(|uid| uid.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    entry.perms
                ));
                entries.push(entry);
            }
        }
        reporter.blank();
        Ok(entries)
    }
}

/// Snapshot the probe executable's permissions and owner.
fn script_info(script_path: &Path) -> Result<ScriptInfo> {
    let perms = FilePermissions::query(script_path)?;
    let owner_uid = perms::owner_uid(script_path);
    Ok(ScriptInfo {
        path: script_path.display().to_string(),
        perms: perms.octal(),
        owner_uid,
        owner_name: owner_uid
            .and_then(identity::resolve_user)
            .map(|user| user.name),
    })
}

/// Resolve a write-test outcome into the verdict.
///
/// A cleanup failure still reports the verdict first — in every format,
/// since no JSON document follows a fatal condition — and only then
/// escalates to [`HostProbeError::CleanupFailed`].
fn finish_write_test(outcome: WriteTestOutcome, reporter: &Reporter) -> Result<bool> {
    if let Some(orphan) = outcome.cleanup_failure {
        reporter.blank();
        reporter.verdict(report::verdict_line(outcome.writable));
        return Err(HostProbeError::CleanupFailed { path: orphan });
    }
    Ok(outcome.writable)
}

/// Whether the file owner matches the process's real or effective uid.
pub fn owner_matches(identity: &ProcessIdentity, owner_uid: u32) -> bool {
    owner_uid == identity.uid || owner_uid == identity.euid
}

/// The identity lines Branch A reports: the real uid always, the effective
/// uid when translated, and the gid/egid only when they differ from the
/// uid and gid respectively.
fn identity_report_lines(id: &ProcessIdentity) -> Vec<String> {
    let mut lines = vec![format!("Running as: {}", identity::describe_uid(id.uid))];
    if id.uid != id.euid {
        lines.push(format!(
            "Effective UID: {}",
            identity::describe_uid(id.euid)
        ));
    }
    if id.gid != id.uid {
        lines.push(format!("GID: {}", identity::describe_gid(id.gid)));
    }
    if id.gid != id.egid {
        lines.push(format!(
            "Effective GID: {}",
            identity::describe_gid(id.egid)
        ));
    }
    lines
}

/// Branch A: compare the executable's owner against process uid/euid.
///
/// Reports the real identity, the effective identity when it differs, and
/// the gid/egid resolved against the group database.
pub fn run_posix_identity(script_path: &Path, reporter: &Reporter) -> bool {
    reporter.info("Using POSIX identity to compare file and process owner.");

    let Some(id) = ProcessIdentity::current() else {
        reporter.debug("Identity introspection unavailable; treating owners as distinct.");
        return false;
    };

    for line in identity_report_lines(&id) {
        reporter.info(&line);
    }

    match perms::owner_uid(script_path) {
        Some(owner) => {
            reporter.info(&format!("Script owner: {}", identity::describe_uid(owner)));
            owner_matches(&id, owner)
        }
        None => {
            reporter.debug("Script owner unobtainable; treating owners as distinct.");
            false
        }
    }
}

/// Branch B: attempt a fully-open chmod of the probe directory.
///
/// Success means the process owns the directory (or is privileged), so the
/// verdict is true. The original mode is restored immediately; a failed
/// restoration is fatal — a directory left world-writable is a security
/// regression.
#[cfg(unix)]
pub fn run_chmod_probe(probe_dir: &Path, reporter: &Reporter) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    reporter.info("POSIX identity is not available -> falling back to a chmod test.");

    let original = FilePermissions::query(probe_dir)?;
    reporter.debug(&format!("Trying to `chmod 0777 {}`.", probe_dir.display()));

    if fs::set_permissions(probe_dir, fs::Permissions::from_mode(0o777)).is_err() {
        reporter.debug(&format!("Could not `chmod 0777 {}`.", probe_dir.display()));
        return Ok(false);
    }
    reporter.debug("Chmod successful.");

    reporter.debug(&format!(
        "Reverting original permissions ({}) on dir '{}'.",
        original.octal(),
        probe_dir.display()
    ));
    let restore_failed = || HostProbeError::PermissionRestoreFailed {
        path: probe_dir.to_path_buf(),
        mode: original.mode(),
    };
    if fs::set_permissions(probe_dir, fs::Permissions::from_mode(original.mode())).is_err() {
        return Err(restore_failed());
    }
    if FilePermissions::query(probe_dir)? != original {
        return Err(restore_failed());
    }

    Ok(true)
}

/// Mode-bit mutation does not exist off Unix, so the probe always fails.
#[cfg(not(unix))]
pub fn run_chmod_probe(probe_dir: &Path, reporter: &Reporter) -> Result<bool> {
    reporter.info("POSIX identity is not available -> falling back to a chmod test.");
    reporter.debug(&format!(
        "Mode-bit mutation is unsupported on this target; `chmod 0777 {}` not attempted.",
        probe_dir.display()
    ));
    Ok(false)
}

/// What the write test found.
#[derive(Debug)]
pub struct WriteTestOutcome {
    /// The process could create a file in the probe directory.
    pub writable: bool,
    /// The artifact that could not be removed, if cleanup failed.
    pub cleanup_failure: Option<PathBuf>,
}

/// Branch C: empirical write test.
///
/// Refuses to run when the probe directory is group- or world-writable —
/// in that case a successful write proves nothing about ownership. The
/// temporary file is uniquely named and always deleted afterward; when
/// deletion fails the outcome carries the orphaned path so the caller can
/// report the verdict before escalating.
pub fn run_write_test(probe_dir: &Path, reporter: &Reporter) -> Result<WriteTestOutcome> {
    reporter.info("Neither POSIX identity nor chmod are available -> falling back to a write test.");

    let dir_perms = FilePermissions::query(probe_dir)?;
    if dir_perms.class_can_write(PermClass::Group) || dir_perms.class_can_write(PermClass::Other) {
        return Err(HostProbeError::GloballyWritableDir {
            path: probe_dir.to_path_buf(),
        });
    }
    reporter.debug(&format!(
        "Dir '{}' is NOT writable for group and world.",
        probe_dir.display()
    ));

    let test_file = probe_dir.join(format!("__writable-{}.tmp", std::process::id()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&test_file)
    {
        Ok(file) => {
            drop(file);
            let file_perms = FilePermissions::query(&test_file)
                .map(|p| p.octal())
                .unwrap_or_else(|_| "????".to_string());
            reporter.debug(&format!(
                "File '{}' (ugo {}) was created.",
                test_file.display(),
                file_perms
            ));
            reporter.debug(&format!(
                "Dir '{}' (ugo {}) IS writable by this process.",
                probe_dir.display(),
                dir_perms.octal()
            ));

            let cleanup_failure = match fs::remove_file(&test_file) {
                Ok(()) => {
                    reporter.debug(&format!("Test file '{}' was removed.", test_file.display()));
                    None
                }
                Err(err) => {
                    tracing::debug!(error = %err, "write-test cleanup failed");
                    Some(test_file)
                }
            };
            Ok(WriteTestOutcome {
                writable: true,
                cleanup_failure,
            })
        }
        Err(_) => {
            reporter.debug(&format!(
                "Dir '{}' (ugo {}) is NOT writable by this process.",
                probe_dir.display(),
                dir_perms.octal()
            ));
            Ok(WriteTestOutcome {
                writable: false,
                cleanup_failure: None,
            })
        }
    }
}
