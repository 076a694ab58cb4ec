//! Report rendering.
//!
//! The line report goes to stdout as it is produced, one severity-prefixed
//! line at a time: `[+]` informational, `[#]` debug (only with `--debug`),
//! `[-]` error. With `--format json` the line report is suppressed and the
//! collected [`HostReport`] is serialized instead; errors keep their `[-]`
//! line in both formats.

use std::path::Path;

use serde::Serialize;

use crate::capability::CapabilityMatrix;
use crate::identity::ProcessIdentity;

/// Report rendering format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Severity-prefixed lines, printed as the probe runs.
    #[default]
    Human,
    /// One JSON document on completion.
    Json,
}

/// Severity-prefixed line writer.
///
/// Debug lines are dropped unless the debug flag is set; informational and
/// debug lines are dropped entirely in JSON mode. Lines go to stdout by
/// default; [`Reporter::in_memory`] captures them instead so tests can
/// assert on emission order.
#[derive(Debug)]
pub struct Reporter {
    format: ReportFormat,
    debug: bool,
    sink: Sink,
}

#[derive(Debug)]
enum Sink {
    Stdout,
    Memory(std::sync::Mutex<Vec<String>>),
}

impl Reporter {
    /// Create a stdout reporter for the given format and debug flag.
    pub fn new(format: ReportFormat, debug: bool) -> Self {
        Self {
            format,
            debug,
            sink: Sink::Stdout,
        }
    }

    /// Create a reporter that captures lines in memory instead of stdout.
    pub fn in_memory(format: ReportFormat, debug: bool) -> Self {
        Self {
            format,
            debug,
            sink: Sink::Memory(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Lines captured by an in-memory reporter, in emission order.
    /// Empty for a stdout reporter.
    pub fn captured_lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Stdout => Vec::new(),
            Sink::Memory(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
        }
    }

    fn write_line(&self, line: String) {
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }

    /// Whether the line report is being emitted.
    pub fn is_line_oriented(&self) -> bool {
        self.format == ReportFormat::Human
    }

    /// Write an informational `[+]` line.
    pub fn info(&self, msg: &str) {
        if self.is_line_oriented() {
            self.write_line(format!("[+] {}", msg));
        }
    }

    /// Write a `[#]` debug line. Dropped unless the debug flag is set.
    pub fn debug(&self, msg: &str) {
        if self.is_line_oriented() && self.debug {
            self.write_line(format!("[#] {}", msg));
        }
    }

    /// Write an error `[-]` line. Emitted in every format.
    pub fn error(&self, msg: &str) {
        self.write_line(format!("[-] {}", msg));
    }

    /// Write the verdict line. Emitted in every format: when a fatal
    /// condition follows the verdict, no JSON document is produced and
    /// this line is the only carrier of the result.
    pub fn verdict(&self, msg: &str) {
        self.write_line(format!("[+] {}", msg));
    }

    /// Blank separator line between report sections.
    pub fn blank(&self) {
        if self.is_line_oriented() {
            self.write_line(String::new());
        }
    }
}

/// Runtime identification for the report header.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    /// hostprobe version.
    pub version: String,
    /// Compile-time target OS.
    pub os: String,
    /// Compile-time target architecture.
    pub arch: String,
    /// Kernel identification from `uname`, when obtainable.
    pub kernel: Option<String>,
}

impl RuntimeInfo {
    /// Collect runtime identification, best-effort.
    pub fn collect() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            kernel: kernel_banner(),
        }
    }

    /// One-line header, with "???" standing in for missing pieces.
    pub fn banner(&self) -> String {
        format!(
            "Running hostprobe {} ({}/{}) on {}",
            self.version,
            self.os,
            self.arch,
            self.kernel.as_deref().unwrap_or("???")
        )
    }
}

/// Permission/owner snapshot of the probe's own executable.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptInfo {
    pub path: String,
    /// 4-character octal permission string.
    pub perms: String,
    pub owner_uid: Option<u32>,
    pub owner_name: Option<String>,
}

/// One entry of a restricted-path listing.
#[derive(Debug, Clone, Serialize)]
pub struct PathEntry {
    pub path: String,
    pub owner_uid: Option<u32>,
    /// 4-character octal permission string.
    pub perms: String,
}

/// Everything one probe run learned about the host.
#[derive(Debug, Serialize)]
pub struct HostReport {
    pub runtime: RuntimeInfo,
    pub capabilities: CapabilityMatrix,
    pub script: ScriptInfo,
    pub restricted_paths: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ProcessIdentity>,
    /// Name of the heuristic branch that ran.
    pub strategy: String,
    /// The ownership heuristic's verdict. A match is the bad outcome.
    pub owner_match: bool,
}

/// The verdict line. An owner match is the security concern; a mismatch
/// means the test passed.
pub fn verdict_line(owner_match: bool) -> &'static str {
    if owner_match {
        "Oh no. This looks bad :( File owner == Process owner"
    } else {
        "Test passed."
    }
}

/// `uname`-style kernel banner.
#[cfg(unix)]
fn kernel_banner() -> Option<String> {
    use std::ffi::CStr;

    let mut name: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: uname fills the buffer and returns non-zero only on failure
    if unsafe { libc::uname(&mut name) } != 0 {
        return None;
    }
    // SAFETY: on success each field is a NUL-terminated string
    let field = |ptr: &[libc::c_char]| unsafe {
        CStr::from_ptr(ptr.as_ptr()).to_string_lossy().into_owned()
    };
    Some(format!(
        "{} {} {} {}",
        field(&name.sysname),
        field(&name.nodename),
        field(&name.release),
        field(&name.machine)
    ))
}

#[cfg(not(unix))]
fn kernel_banner() -> Option<String> {
    None
}

/// Helper shared by the prober for per-path report rows.
pub fn path_entry(path: &Path) -> PathEntry {
    let perms = crate::perms::FilePermissions::query(path)
        .map(|p| p.octal())
        .unwrap_or_else(|_| "????".to_string());
    PathEntry {
        path: path.display().to_string(),
        owner_uid: crate::perms::owner_uid(path),
        perms,
    }
}
