//! Raw calls into the FreeBSD jail syscalls
//!
//! Everything here works on already-encoded buffers. The only
//! interpretation done at this level is turning a `-1` return into a
//! [`SyscallError`] carrying the call name and errno.

use crate::error::SyscallError;
use bitflags::bitflags;
#[cfg(not(target_os = "freebsd"))]
use nix::errno::Errno;

use super::buffer::BufferList;

/// Size of the `errmsg` output buffer
pub const ERRMSG_LEN: usize = 1024;

/// Size of the `name` output buffer (`MAXHOSTNAMELEN`)
pub const MAXHOSTNAMELEN: usize = 256;

bitflags! {
    /// Flags for the jail_set syscall
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetFlags: i32 {
        /// Create the jail if it doesn't exist
        const CREATE = 0x01;
        /// Update parameters of existing jail
        const UPDATE = 0x02;
        /// Attach to jail upon creation
        const ATTACH = 0x04;
        /// Allow changing a dying jail
        const DYING = 0x08;
    }
}

bitflags! {
    /// Flags for the jail_get syscall
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GetFlags: i32 {
        /// Allow getting a dying jail
        const DYING = 0x08;
    }
}

/// The four jail syscalls.
///
/// `jail_get` and `jail_set` may write into output buffers of `buffers`
/// (`errmsg`, `name`). Implementations must not inspect buffer contents to
/// decide success; a failure is reported only through the `Err` side.
pub trait Kernel {
    fn jail_set(&self, buffers: &mut BufferList, flags: SetFlags) -> Result<i32, SyscallError>;

    fn jail_get(&self, buffers: &mut BufferList, flags: GetFlags) -> Result<i32, SyscallError>;

    fn jail_attach(&self, jid: i32) -> Result<(), SyscallError>;

    fn jail_remove(&self, jid: i32) -> Result<(), SyscallError>;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn jail_set(&self, buffers: &mut BufferList, flags: SetFlags) -> Result<i32, SyscallError> {
        (**self).jail_set(buffers, flags)
    }

    fn jail_get(&self, buffers: &mut BufferList, flags: GetFlags) -> Result<i32, SyscallError> {
        (**self).jail_get(buffers, flags)
    }

    fn jail_attach(&self, jid: i32) -> Result<(), SyscallError> {
        (**self).jail_attach(jid)
    }

    fn jail_remove(&self, jid: i32) -> Result<(), SyscallError> {
        (**self).jail_remove(jid)
    }
}

/// libc-backed implementation of [`Kernel`].
///
/// On targets other than FreeBSD every call fails with `ENOSYS`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemKernel;

/// Map a libc return value to the jid or the thread's errno
#[cfg(target_os = "freebsd")]
fn check(call: &'static str, ret: libc::c_int) -> Result<i32, SyscallError> {
    match ret {
        -1 => Err(SyscallError::last(call)),
        jid => Ok(jid),
    }
}

#[cfg(target_os = "freebsd")]
impl Kernel for SystemKernel {
    fn jail_set(&self, buffers: &mut BufferList, flags: SetFlags) -> Result<i32, SyscallError> {
        tracing::trace!(niov = buffers.len(), flags = flags.bits(), "jail_set");
        let mut iov = buffers.iovecs();
        let ret = unsafe {
            libc::jail_set(
                iov.as_mut_ptr(),
                iov.len() as libc::c_uint,
                flags.bits(),
            )
        };
        check("jail_set", ret)
    }

    fn jail_get(&self, buffers: &mut BufferList, flags: GetFlags) -> Result<i32, SyscallError> {
        tracing::trace!(niov = buffers.len(), flags = flags.bits(), "jail_get");
        let mut iov = buffers.iovecs();
        let ret = unsafe {
            libc::jail_get(
                iov.as_mut_ptr(),
                iov.len() as libc::c_uint,
                flags.bits(),
            )
        };
        check("jail_get", ret)
    }

    fn jail_attach(&self, jid: i32) -> Result<(), SyscallError> {
        tracing::trace!(jid, "jail_attach");
        check("jail_attach", unsafe { libc::jail_attach(jid) }).map(|_| ())
    }

    fn jail_remove(&self, jid: i32) -> Result<(), SyscallError> {
        tracing::trace!(jid, "jail_remove");
        check("jail_remove", unsafe { libc::jail_remove(jid) }).map(|_| ())
    }
}

#[cfg(not(target_os = "freebsd"))]
impl Kernel for SystemKernel {
    fn jail_set(&self, buffers: &mut BufferList, flags: SetFlags) -> Result<i32, SyscallError> {
        tracing::trace!(niov = buffers.len(), flags = flags.bits(), "jail_set");
        Err(SyscallError::new("jail_set", Errno::ENOSYS))
    }

    fn jail_get(&self, buffers: &mut BufferList, flags: GetFlags) -> Result<i32, SyscallError> {
        tracing::trace!(niov = buffers.len(), flags = flags.bits(), "jail_get");
        Err(SyscallError::new("jail_get", Errno::ENOSYS))
    }

    fn jail_attach(&self, jid: i32) -> Result<(), SyscallError> {
        tracing::trace!(jid, "jail_attach");
        Err(SyscallError::new("jail_attach", Errno::ENOSYS))
    }

    fn jail_remove(&self, jid: i32) -> Result<(), SyscallError> {
        tracing::trace!(jid, "jail_remove");
        Err(SyscallError::new("jail_remove", Errno::ENOSYS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert_eq!(SetFlags::CREATE.bits(), 0x01);
        assert_eq!(SetFlags::UPDATE.bits(), 0x02);
        assert_eq!(SetFlags::ATTACH.bits(), 0x04);
        assert_eq!(SetFlags::DYING.bits(), 0x08);
        assert_eq!(SetFlags::all().bits(), 0x0f);
        assert_eq!(GetFlags::all().bits(), 0x08);
    }

    #[cfg(not(target_os = "freebsd"))]
    #[test]
    fn test_system_kernel_unsupported_off_freebsd() {
        let mut buffers = BufferList::new();
        let err = SystemKernel.jail_get(&mut buffers, GetFlags::empty()).unwrap_err();
        assert_eq!(err.call, "jail_get");
        assert_eq!(err.errno, Errno::ENOSYS);
        assert!(!err.is_not_found());
    }
}
