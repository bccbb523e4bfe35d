//! Recording kernel used by the integration tests
#![allow(dead_code)]

use jailparam::jail::{BufferList, names};
use jailparam::{GetFlags, Kernel, SetFlags, SyscallError};
use nix::errno::Errno;
use std::cell::RefCell;

/// One recorded syscall
#[derive(Debug, Clone)]
pub struct Call {
    pub syscall: &'static str,
    pub flags: i32,
    /// Name/value pairs as the kernel saw them
    pub pairs: Vec<(String, Vec<u8>)>,
    /// Argument of jail_attach / jail_remove
    pub jid: Option<i32>,
}

impl Call {
    pub fn value(&self, name: &str) -> Option<&[u8]> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }
}

/// Kernel that records calls and answers with a programmed outcome
pub struct MockKernel {
    calls: RefCell<Vec<Call>>,
    ret: Result<i32, Errno>,
    errmsg: Option<String>,
    name: Option<String>,
}

impl MockKernel {
    pub fn returning(jid: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            ret: Ok(jid),
            errmsg: None,
            name: None,
        }
    }

    pub fn failing(errno: Errno) -> Self {
        Self {
            ret: Err(errno),
            ..Self::returning(0)
        }
    }

    /// Write `msg` into the errmsg buffer on every list call
    pub fn with_errmsg(mut self, msg: &str) -> Self {
        self.errmsg = Some(msg.to_string());
        self
    }

    /// Write `name` into the name output buffer on jail_get
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> Call {
        self.calls.borrow().last().cloned().expect("no call recorded")
    }

    fn record_list(
        &self,
        syscall: &'static str,
        flags: i32,
        buffers: &mut BufferList,
    ) -> Result<i32, SyscallError> {
        let pairs = buffers
            .pairs()
            .map(|(n, v)| (String::from_utf8_lossy(n).into_owned(), v.to_vec()))
            .collect();
        self.calls.borrow_mut().push(Call {
            syscall,
            flags,
            pairs,
            jid: None,
        });

        if let (Some(msg), Some(buf)) = (&self.errmsg, buffers.value_mut(names::ERRMSG)) {
            buf[..msg.len()].copy_from_slice(msg.as_bytes());
        }
        if syscall == "jail_get" {
            if let (Some(name), Some(buf)) = (&self.name, buffers.value_mut(names::NAME)) {
                // Only an output buffer, never the caller's key
                if buf.iter().all(|b| *b == 0) {
                    buf[..name.len()].copy_from_slice(name.as_bytes());
                }
            }
        }
        self.ret.map_err(|errno| SyscallError::new(syscall, errno))
    }

    fn record_id(&self, syscall: &'static str, jid: i32) -> Result<(), SyscallError> {
        self.calls.borrow_mut().push(Call {
            syscall,
            flags: 0,
            pairs: Vec::new(),
            jid: Some(jid),
        });
        self.ret
            .map(|_| ())
            .map_err(|errno| SyscallError::new(syscall, errno))
    }
}

impl Kernel for MockKernel {
    fn jail_set(&self, buffers: &mut BufferList, flags: SetFlags) -> Result<i32, SyscallError> {
        self.record_list("jail_set", flags.bits(), buffers)
    }

    fn jail_get(&self, buffers: &mut BufferList, flags: GetFlags) -> Result<i32, SyscallError> {
        self.record_list("jail_get", flags.bits(), buffers)
    }

    fn jail_attach(&self, jid: i32) -> Result<(), SyscallError> {
        self.record_id("jail_attach", jid)
    }

    fn jail_remove(&self, jid: i32) -> Result<(), SyscallError> {
        self.record_id("jail_remove", jid)
    }
}
