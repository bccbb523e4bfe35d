//! Unified error types for jailparam

use nix::errno::Errno;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A jail syscall failed with an errno the protocol layer does not handle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{call}: {errno}")]
pub struct SyscallError {
    /// Name of the failing call, e.g. `jail_set`
    pub call: &'static str,
    /// Raw OS error code
    pub errno: Errno,
}

impl SyscallError {
    pub fn new(call: &'static str, errno: Errno) -> Self {
        Self { call, errno }
    }

    /// Capture the calling thread's errno for `call`
    pub fn last(call: &'static str) -> Self {
        Self::new(call, Errno::last())
    }

    /// The numeric errno value
    pub fn code(&self) -> i32 {
        self.errno as i32
    }

    /// Whether the errno means "no such jail".
    ///
    /// jail_get(2) overloads ENOENT for an absent jail, a jail not visible
    /// from the caller's prison, and a `lastjid` past the highest jid. No
    /// call here carries `lastjid`, so both remaining meanings are absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self.errno, Errno::ENOENT | Errno::ESRCH)
    }
}

/// Main error type for jailparam operations
#[derive(Error, Debug)]
pub enum Error {
    // Kernel errors
    #[error("syscall failed: {0}")]
    Syscall(#[from] SyscallError),

    #[error("no such jail")]
    NotFound,

    #[error("jail error: {0}")]
    Jail(String),

    // Parameter construction errors
    #[error("cannot encode parameter: {0}")]
    Encoding(String),

    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    // Manifest errors
    #[error("Failed to read manifest '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse manifest: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Manifest validation failed: {0}")]
    ConfigValidation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for the "jail does not exist" outcome of a lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

impl From<std::ffi::NulError> for Error {
    fn from(e: std::ffi::NulError) -> Self {
        Error::Encoding(format!("interior NUL byte at position {}", e.nul_position()))
    }
}

/// Result type alias for jailparam operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errnos() {
        assert!(SyscallError::new("jail_get", Errno::ENOENT).is_not_found());
        assert!(SyscallError::new("jail_remove", Errno::ESRCH).is_not_found());
        assert!(!SyscallError::new("jail_set", Errno::EPERM).is_not_found());
    }

    #[test]
    fn test_syscall_error_display() {
        let err = SyscallError::new("jail_set", Errno::EPERM);
        assert!(err.to_string().starts_with("jail_set: "));
        assert_eq!(err.code(), libc::EPERM);
    }

    #[test]
    fn test_nul_error_is_encoding() {
        let nul = std::ffi::CString::new("a\0b").unwrap_err();
        let err: Error = nul.into();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
