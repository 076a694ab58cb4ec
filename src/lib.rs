//! hostprobe - Host privilege and file-ownership diagnostic probe.
//!
//! hostprobe inspects the running process's privileges, the permission
//! posture of its own files, and the OS-interaction primitives available to
//! it, then reports whether the process owner matches the owner of the
//! executable — a security smell indicating a writable deployment root.
//!
//! # Modules
//!
//! - [`capability`] - Capability registry and availability matrix
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Probe configuration resolved once at startup
//! - [`error`] - Error types and result aliases
//! - [`identity`] - Process identity and user/group database lookups
//! - [`perms`] - File permission snapshots and classes
//! - [`prober`] - Strategy selection and the single diagnostic pass
//! - [`report`] - Line-oriented and JSON report rendering
//!
//! # Example
//!
//! ```no_run
//! use hostprobe::config::ProbeConfig;
//! use hostprobe::prober::Prober;
//! use hostprobe::report::{Reporter, ReportFormat};
//!
//! let config = ProbeConfig::from_environment(false, None).unwrap();
//! let reporter = Reporter::new(ReportFormat::Human, config.debug);
//! let report = Prober::new(&config).run(&reporter).unwrap();
//! assert!(!report.strategy.is_empty());
//! ```

pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod perms;
pub mod prober;
pub mod report;

pub use error::{HostProbeError, Result};
