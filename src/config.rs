//! Probe configuration.
//!
//! All knobs are resolved once at startup into an explicit [`ProbeConfig`]
//! that is passed to the prober — there are no module-level globals, so
//! tests can point the probe at throwaway directories.

use std::path::{Path, PathBuf};

use crate::error::{HostProbeError, Result};
use crate::prober::Strategy;

/// Environment variable overriding the probe directory.
///
/// A test hook: the operator surface has no way to pick a directory, the
/// probe always targets the directory containing the executable.
pub const PROBE_DIR_ENV: &str = "HOSTPROBE_DIR";

/// Environment variable holding the restricted-path list, separated by the
/// platform path separator.
pub const RESTRICTED_PATHS_ENV: &str = "HOSTPROBE_RESTRICTED_PATHS";

/// Configuration for one probe run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Directory the permission/write heuristics run against.
    pub probe_dir: PathBuf,
    /// The probe's own executable, whose owner the heuristic compares.
    pub script_path: PathBuf,
    /// Directories whose entries get a permission/owner listing.
    pub restricted_paths: Vec<PathBuf>,
    /// Emit `[#]` debug lines.
    pub debug: bool,
    /// Force a heuristic branch instead of selecting from the capability
    /// matrix. `None` means automatic selection.
    pub forced_strategy: Option<Strategy>,
}

impl ProbeConfig {
    /// Resolve configuration from the process environment.
    ///
    /// The probe directory is the directory containing the running
    /// executable, unless `HOSTPROBE_DIR` overrides it. Fails fast when the
    /// directory is missing or not a directory — no probing is meaningful
    /// without a valid target.
    pub fn from_environment(debug: bool, forced_strategy: Option<Strategy>) -> Result<Self> {
        let script_path = std::env::current_exe()?;
        let probe_dir = match std::env::var_os(PROBE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => script_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let restricted_paths = std::env::var_os(RESTRICTED_PATHS_ENV)
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();

        Self::new(
            probe_dir,
            script_path,
            restricted_paths,
            debug,
            forced_strategy,
        )
    }

    /// Build a configuration against explicit paths.
    pub fn new(
        probe_dir: PathBuf,
        script_path: PathBuf,
        restricted_paths: Vec<PathBuf>,
        debug: bool,
        forced_strategy: Option<Strategy>,
    ) -> Result<Self> {
        if !probe_dir.is_dir() {
            return Err(HostProbeError::ProbeDirInvalid { path: probe_dir });
        }
        Ok(Self {
            probe_dir,
            script_path,
            restricted_paths,
            debug,
            forced_strategy,
        })
    }
}
