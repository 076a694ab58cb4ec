//! File permission snapshots and permission classes.
//!
//! Permissions are derived, never stored: every query hits the filesystem
//! again so the report reflects the state at the moment it is printed.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{HostProbeError, Result};

/// Snapshot of a file's mode bits at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePermissions {
    mode: u32,
}

impl FilePermissions {
    /// Query the current mode bits of a path.
    pub fn query(path: &Path) -> Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(Self::from_mode(mode_bits(&metadata)))
    }

    /// Build a snapshot from raw mode bits (permission bits only).
    pub fn from_mode(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// Raw permission bits (suid/sgid/sticky + rwx classes).
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Format as a 4-character octal string, e.g. mode 0o755 → "0755".
    pub fn octal(&self) -> String {
        format!("{:04o}", self.mode)
    }

    /// Whether the given permission class has its write bit set.
    pub fn class_can_write(&self, class: PermClass) -> bool {
        self.mode & class.write_bit() != 0
    }
}

/// One of the three POSIX permission classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermClass {
    Owner,
    Group,
    Other,
}

impl PermClass {
    /// The write bit for this class.
    pub fn write_bit(self) -> u32 {
        match self {
            PermClass::Owner => 0o200,
            PermClass::Group => 0o020,
            PermClass::Other => 0o002,
        }
    }

    /// Canonical name for reporting.
    pub fn as_str(self) -> &'static str {
        match self {
            PermClass::Owner => "owner",
            PermClass::Group => "group",
            PermClass::Other => "other",
        }
    }
}

impl FromStr for PermClass {
    type Err = HostProbeError;

    /// Accepts the canonical names and the single-letter `ugo` shorthand.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "owner" | "u" => Ok(PermClass::Owner),
            "group" | "g" => Ok(PermClass::Group),
            "other" | "o" => Ok(PermClass::Other),
            _ => Err(HostProbeError::InvalidPermClass {
                class: s.to_string(),
            }),
        }
    }
}

/// Check whether the named permission class can write to a path.
///
/// A class outside {owner, group, other} is a configuration error — the
/// function never maps an unknown class to a boolean.
pub fn has_write_perm_to(path: &Path, class: &str) -> Result<bool> {
    let class = PermClass::from_str(class)?;
    Ok(FilePermissions::query(path)?.class_can_write(class))
}

/// File owner uid, or `None` where ownership is not obtainable.
pub fn owner_uid(path: &Path) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        fs::symlink_metadata(path).map(|m| m.uid()).ok()
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        None
    }
}

/// List a directory as the directory itself plus its entries.
///
/// The parent (`..`) is excluded; the directory's own path stands in for
/// `.` so its permissions appear alongside its contents in the report.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = vec![dir.to_path_buf()];
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(unix)]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

/// On non-Unix targets only the readonly bit is meaningful; approximate
/// with conventional modes so the octal report stays well-formed.
#[cfg(not(unix))]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
