//! Jail operations on top of the raw syscalls
//!
//! Every set/get call carries an `errmsg` output buffer. The result of a
//! call is read from three places, in this order:
//!
//! 1. a "no such jail" errno becomes [`Error::NotFound`]
//! 2. a `-1` result with a non-empty `errmsg` becomes [`Error::Jail`]
//! 3. any other errno becomes [`Error::Syscall`]
//!
//! Anything else is a jid.

use crate::error::{Error, Result, SyscallError};
use nix::errno::Errno;
use tracing::debug;

use super::buffer::BufferList;
use super::ffi::{ERRMSG_LEN, GetFlags, Kernel, MAXHOSTNAMELEN, SetFlags, SystemKernel};
use super::param::{Param, names};

/// Entry point for jail operations against a [`Kernel`]
#[derive(Debug, Default, Clone)]
pub struct Jails<K: Kernel = SystemKernel> {
    kernel: K,
}

impl Jails<SystemKernel> {
    /// Operations against the running kernel
    pub fn system() -> Self {
        Self::with_kernel(SystemKernel)
    }
}

impl<K: Kernel> Jails<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Create a new jail, returning its jid
    pub fn create(&self, params: &[Param]) -> Result<i32> {
        self.set(params, SetFlags::CREATE)
    }

    /// Update an existing jail, returning its jid
    pub fn update(&self, params: &[Param]) -> Result<i32> {
        self.set(params, SetFlags::UPDATE)
    }

    /// Create a new jail and attach the calling process to it
    pub fn attach_on_create(&self, params: &[Param]) -> Result<i32> {
        self.set(params, SetFlags::CREATE | SetFlags::ATTACH)
    }

    /// Issue jail_set(2) with arbitrary flags.
    ///
    /// `flags` must contain `CREATE`, `UPDATE` or both.
    pub fn set(&self, params: &[Param], flags: SetFlags) -> Result<i32> {
        if !flags.intersects(SetFlags::CREATE | SetFlags::UPDATE) {
            return Err(Error::Encoding(format!(
                "jail_set flags {:#x} select neither create nor update",
                flags.bits()
            )));
        }

        let mut buffers = BufferList::from_params(params);
        let errmsg = buffers.push_output(names::ERRMSG, ERRMSG_LEN);

        debug!(params = params.len(), flags = ?flags, "setting jail parameters");
        let result = self.kernel.jail_set(&mut buffers, flags);
        interpret("jail_set", result, buffers.c_str(errmsg))
    }

    /// Attach the calling process to a jail
    pub fn attach(&self, jid: i32) -> Result<()> {
        debug!(jid, "attaching to jail");
        self.kernel.jail_attach(jid).map_err(classify)
    }

    /// Remove a jail, killing all its processes
    pub fn remove(&self, jid: i32) -> Result<()> {
        debug!(jid, "removing jail");
        self.kernel.jail_remove(jid).map_err(classify)
    }

    /// Resolve a jail name or numeric jid to a jid.
    ///
    /// `"0"` is the host and resolves to 0 without asking the kernel.
    pub fn lookup_id(&self, name_or_id: &str) -> Result<i32> {
        let key = match name_or_id.parse::<i32>() {
            Ok(0) => return Ok(0),
            Ok(jid) => Param::int(names::JID, jid)?,
            Err(_) => Param::string(names::NAME, name_or_id)?,
        };

        let mut buffers = BufferList::from_params(&[key]);
        let errmsg = buffers.push_output(names::ERRMSG, ERRMSG_LEN);

        debug!(jail = name_or_id, "looking up jail id");
        let result = self.kernel.jail_get(&mut buffers, GetFlags::empty());
        interpret("jail_get", result, buffers.c_str(errmsg))
    }

    /// Look up the name of jail `jid`
    pub fn lookup_name(&self, jid: i32) -> Result<String> {
        let mut buffers = BufferList::from_params(&[Param::int(names::JID, jid)?]);
        let name = buffers.push_output(names::NAME, MAXHOSTNAMELEN);
        let errmsg = buffers.push_output(names::ERRMSG, ERRMSG_LEN);

        debug!(jid, "looking up jail name");
        let result = self.kernel.jail_get(&mut buffers, GetFlags::empty());
        interpret("jail_get", result, buffers.c_str(errmsg))?;
        Ok(buffers.c_str(name).unwrap_or_default())
    }

    /// Whether a jail with this name or jid is visible
    pub fn exists(&self, name_or_id: &str) -> Result<bool> {
        match self.lookup_id(name_or_id) {
            Ok(_) => Ok(true),
            Err(Error::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn classify(err: SyscallError) -> Error {
    if err.is_not_found() {
        Error::NotFound
    } else {
        Error::Syscall(err)
    }
}

/// Turn a raw set/get outcome plus the contents of its `errmsg` buffer into a jid
fn interpret(
    call: &'static str,
    result: std::result::Result<i32, SyscallError>,
    errmsg: Option<String>,
) -> Result<i32> {
    match (result, errmsg) {
        (Err(e), _) if e.is_not_found() => Err(Error::NotFound),
        (Err(_), Some(msg)) | (Ok(-1), Some(msg)) => Err(Error::Jail(msg)),
        (Err(e), None) => Err(Error::Syscall(e)),
        (Ok(jid), _) if jid < 0 => Err(Error::Syscall(SyscallError::new(
            call,
            Errno::UnknownErrno,
        ))),
        (Ok(jid), _) => Ok(jid),
    }
}
