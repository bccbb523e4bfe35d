//! Per-call buffer arena for jail_set(2) / jail_get(2)
//!
//! The kernel takes an array of iovecs alternating name, value, name, value.
//! A `BufferList` owns every byte those iovecs point at, so the array built
//! by [`BufferList::iovecs`] stays valid for as long as it is borrowed.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::ptr;

use super::param::Param;

/// Position of an output buffer returned by [`BufferList::push_output`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSlot(usize);

/// Ordered name/value buffers for a single jail syscall
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferList {
    /// Alternating NUL-terminated names and raw values
    buffers: Vec<Vec<u8>>,
}

impl BufferList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten parameters into name/value buffers, keeping their order
    pub fn from_params(params: &[Param]) -> Self {
        let mut list = Self {
            buffers: Vec::with_capacity(params.len() * 2 + 2),
        };
        for param in params {
            list.push_param(param);
        }
        list
    }

    pub fn push_param(&mut self, param: &Param) {
        self.push(param.name(), param.value().to_vec());
    }

    /// Append a zero-filled output buffer the kernel writes into.
    ///
    /// The returned slot addresses this exact buffer, even when a caller
    /// parameter earlier in the list carries the same name.
    pub fn push_output(&mut self, name: &str, len: usize) -> OutputSlot {
        self.push(name, vec![0; len]);
        OutputSlot(self.buffers.len() - 1)
    }

    fn push(&mut self, name: &str, value: Vec<u8>) {
        let mut key = Vec::with_capacity(name.len() + 1);
        key.extend_from_slice(name.as_bytes());
        key.push(0);
        self.buffers.push(key);
        self.buffers.push(value);
    }

    /// Number of buffers (twice the number of pairs)
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Iterate over `(name, value)` pairs, names without their NUL
    pub fn pairs(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.buffers.chunks_exact(2).map(|pair| {
            let name = pair[0].strip_suffix(b"\0").unwrap_or(pair[0].as_slice());
            (name, pair[1].as_slice())
        })
    }

    /// Value buffer of the last pair called `name`
    pub fn value(&self, name: &str) -> Option<&[u8]> {
        self.index_of(name).map(|i| self.buffers[i].as_slice())
    }

    /// Mutable value buffer of the last pair called `name`
    pub fn value_mut(&mut self, name: &str) -> Option<&mut [u8]> {
        self.index_of(name).map(|i| self.buffers[i].as_mut_slice())
    }

    /// Raw contents of an output buffer
    pub fn output(&self, slot: OutputSlot) -> Option<&[u8]> {
        self.buffers.get(slot.0).map(Vec::as_slice)
    }

    /// Read an output buffer as a C string.
    ///
    /// Returns `None` when the slot is out of range or its first byte is NUL.
    pub fn c_str(&self, slot: OutputSlot) -> Option<String> {
        let value = self.output(slot)?;
        if value.first().copied().unwrap_or(0) == 0 {
            return None;
        }
        let text = match CStr::from_bytes_until_nul(value) {
            Ok(s) => s.to_string_lossy().into_owned(),
            // Kernel filled the whole buffer without a terminator
            Err(_) => String::from_utf8_lossy(value).into_owned(),
        };
        Some(text)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.buffers
            .chunks_exact(2)
            .rposition(|pair| pair[0].strip_suffix(b"\0") == Some(name.as_bytes()))
            .map(|pair| pair * 2 + 1)
    }

    /// Build the iovec array the kernel reads.
    ///
    /// Empty values are passed as a null pointer with zero length.
    pub fn iovecs(&mut self) -> IoVecs<'_> {
        let iov = self
            .buffers
            .iter_mut()
            .map(|buf| match buf.len() {
                0 => libc::iovec {
                    iov_base: ptr::null_mut(),
                    iov_len: 0,
                },
                len => libc::iovec {
                    iov_base: buf.as_mut_ptr() as *mut libc::c_void,
                    iov_len: len,
                },
            })
            .collect();
        IoVecs {
            iov,
            _buffers: PhantomData,
        }
    }
}

/// iovec array borrowing a [`BufferList`] mutably
pub struct IoVecs<'a> {
    iov: Vec<libc::iovec>,
    _buffers: PhantomData<&'a mut BufferList>,
}

impl IoVecs<'_> {
    pub fn as_mut_ptr(&mut self) -> *mut libc::iovec {
        self.iov.as_mut_ptr()
    }

    pub fn len(&self) -> usize {
        self.iov.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iov.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params_keeps_order() {
        let params = vec![
            Param::string("name", "test").unwrap(),
            Param::int("securelevel", 1).unwrap(),
            Param::string("path", "/jails/test").unwrap(),
        ];
        let list = BufferList::from_params(&params);
        assert_eq!(list.len(), 6);

        let names: Vec<&[u8]> = list.pairs().map(|(n, _)| n).collect();
        let expected: Vec<&[u8]> = vec![b"name", b"securelevel", b"path"];
        assert_eq!(names, expected);
    }

    #[test]
    fn test_names_are_nul_terminated() {
        let list = BufferList::from_params(&[Param::string("name", "x").unwrap()]);
        assert_eq!(list.buffers[0], b"name\0");
        assert_eq!(list.buffers[1], b"x\0");
    }

    #[test]
    fn test_output_buffer_is_zeroed() {
        let mut list = BufferList::new();
        let slot = list.push_output("errmsg", 1024);
        let value = list.output(slot).unwrap();
        assert_eq!(value.len(), 1024);
        assert!(value.iter().all(|b| *b == 0));
        assert_eq!(list.c_str(slot), None);
    }

    #[test]
    fn test_c_str_stops_at_nul() {
        let mut list = BufferList::new();
        let slot = list.push_output("errmsg", 16);
        list.value_mut("errmsg").unwrap()[..5].copy_from_slice(b"oops\0");
        assert_eq!(list.c_str(slot).as_deref(), Some("oops"));
    }

    #[test]
    fn test_c_str_unterminated() {
        let mut list = BufferList::new();
        let slot = list.push_output("name", 4);
        list.value_mut("name").unwrap().copy_from_slice(b"full");
        assert_eq!(list.c_str(slot).as_deref(), Some("full"));
    }

    #[test]
    fn test_output_slot_ignores_same_named_param() {
        let mut list = BufferList::from_params(&[Param::string("errmsg", "boom").unwrap()]);
        let slot = list.push_output("errmsg", 16);
        assert_eq!(list.c_str(slot), None);
        assert_eq!(list.output(slot).map(|v| v.len()), Some(16));

        list.value_mut("errmsg").unwrap()[..4].copy_from_slice(b"real");
        assert_eq!(list.c_str(slot).as_deref(), Some("real"));
        assert_eq!(list.pairs().next().map(|(_, v)| v), Some(&b"boom\0"[..]));
    }

    #[test]
    fn test_iovecs_point_into_buffers() {
        let mut list = BufferList::from_params(&[Param::raw("persist", Vec::new()).unwrap()]);
        let mut iov = list.iovecs();
        assert_eq!(iov.len(), 2);
        let ptr = iov.as_mut_ptr();
        let (key, value) = unsafe { (*ptr, *ptr.add(1)) };
        assert_eq!(key.iov_len, 8);
        assert!(!key.iov_base.is_null());
        assert_eq!(value.iov_len, 0);
        assert!(value.iov_base.is_null());
    }
}
