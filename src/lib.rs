//! jailparam - typed parameters for the FreeBSD jail syscalls
//!
//! Builds `jail_set(2)` / `jail_get(2)` name/value lists from typed
//! parameters and sorts the outcome into a jid, a kernel `errmsg`, a
//! "no such jail" condition or a plain errno.

pub mod error;
pub mod jail;
pub mod manifest;

pub use error::{Error, Result, SyscallError};
pub use jail::{
    GetFlags, JailSys, Jails, Kernel, Param, ParamKind, SetFlags, SystemKernel, attach,
    attach_on_create, create, lookup_id, lookup_name, remove, update,
};
