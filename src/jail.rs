//! Jail management module
//!
//! This module provides:
//! - Raw bindings to the FreeBSD jail syscalls
//! - Typed parameters and their wire encoding
//! - Create/update/lookup/attach/remove on top of both

pub mod buffer;
pub mod ffi;
pub mod ops;
pub mod param;

// Re-exports
pub use buffer::{BufferList, OutputSlot};
pub use ffi::{ERRMSG_LEN, GetFlags, Kernel, MAXHOSTNAMELEN, SetFlags, SystemKernel};
pub use ops::Jails;
pub use param::{JailSys, Param, ParamKind, names};

use crate::error::Result;

/// Create a jail on the running system
pub fn create(params: &[Param]) -> Result<i32> {
    Jails::system().create(params)
}

/// Update a jail on the running system
pub fn update(params: &[Param]) -> Result<i32> {
    Jails::system().update(params)
}

/// Create a jail and move the calling process into it
pub fn attach_on_create(params: &[Param]) -> Result<i32> {
    Jails::system().attach_on_create(params)
}

pub fn attach(jid: i32) -> Result<()> {
    Jails::system().attach(jid)
}

pub fn remove(jid: i32) -> Result<()> {
    Jails::system().remove(jid)
}

/// Resolve a jail name or jid string to a jid
pub fn lookup_id(name_or_id: &str) -> Result<i32> {
    Jails::system().lookup_id(name_or_id)
}

pub fn lookup_name(jid: i32) -> Result<String> {
    Jails::system().lookup_name(jid)
}
