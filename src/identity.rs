//! Process identity and user/group database lookups.
//!
//! Identity introspection is a capability, not a given: on targets without
//! it, [`ProcessIdentity::current`] returns `None` and the prober falls back
//! to a mutation- or write-based heuristic.
//!
//! Numeric ids are resolved to names best-effort: a uid with no passwd entry
//! is still reported, just without a name. Note that gids resolve against
//! the group database, not passwd.

use serde::Serialize;

/// Real and effective uid/gid of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    pub uid: u32,
    pub gid: u32,
    pub euid: u32,
    pub egid: u32,
}

impl ProcessIdentity {
    /// Read the current process identity, when introspection is available.
    #[cfg(unix)]
    pub fn current() -> Option<Self> {
        // SAFETY: these four getters read process credentials, cannot fail,
        // and have no side effects
        unsafe {
            Some(Self {
                uid: libc::getuid(),
                gid: libc::getgid(),
                euid: libc::geteuid(),
                egid: libc::getegid(),
            })
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Option<Self> {
        None
    }

    /// Whether the process runs with an effective identity differing from
    /// its real one (setuid/setgid execution).
    pub fn is_translated(&self) -> bool {
        self.uid != self.euid || self.gid != self.egid
    }
}

/// A passwd database entry for a uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

impl UserRecord {
    /// Human-readable form for the line report, e.g. `www-data (33)`.
    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.uid)
    }
}

/// Look up a uid in the passwd database.
#[cfg(unix)]
pub fn resolve_user(uid: u32) -> Option<UserRecord> {
    use std::ffi::CStr;

    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut buf = vec![0u8; 1024];
    loop {
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        // SAFETY: pwd and buf outlive the call; getpwuid_r writes the entry
        // into buf and points result at pwd on success
        let rc = unsafe {
            libc::getpwuid_r(
                uid,
                &mut pwd,
                buf.as_mut_ptr() as *mut libc::c_char,
                buf.len(),
                &mut result,
            )
        };
        if rc == libc::ERANGE && buf.len() < 1 << 16 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success pw_name points at a NUL-terminated string in buf
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(UserRecord {
            name: name.to_string_lossy().into_owned(),
            uid: pwd.pw_uid,
            gid: pwd.pw_gid,
        });
    }
}

#[cfg(not(unix))]
pub fn resolve_user(_uid: u32) -> Option<UserRecord> {
    None
}

/// Look up a gid in the group database.
#[cfg(unix)]
pub fn resolve_group(gid: u32) -> Option<String> {
    use std::ffi::CStr;

    let mut grp: libc::group = unsafe { std::mem::zeroed() };
    let mut buf = vec![0u8; 1024];
    loop {
        let mut result: *mut libc::group = std::ptr::null_mut();
        // SAFETY: grp and buf outlive the call; getgrgid_r writes the entry
        // into buf and points result at grp on success
        let rc = unsafe {
            libc::getgrgid_r(
                gid,
                &mut grp,
                buf.as_mut_ptr() as *mut libc::c_char,
                buf.len(),
                &mut result,
            )
        };
        if rc == libc::ERANGE && buf.len() < 1 << 16 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success gr_name points at a NUL-terminated string in buf
        let name = unsafe { CStr::from_ptr(grp.gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(not(unix))]
pub fn resolve_group(_gid: u32) -> Option<String> {
    None
}

/// Format an id with its resolved name when one exists, e.g. `root (0)`
/// or bare `4294967294` for an unmapped id.
pub fn describe_uid(uid: u32) -> String {
    match resolve_user(uid) {
        Some(user) => user.display(),
        None => uid.to_string(),
    }
}

/// Same as [`describe_uid`], against the group database.
pub fn describe_gid(gid: u32) -> String {
    match resolve_group(gid) {
        Some(name) => format!("{} ({})", name, gid),
        None => gid.to_string(),
    }
}
