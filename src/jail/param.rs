//! Typed jail parameters and their wire encoding

use crate::error::{Error, Result};
use byteorder::{ByteOrder, NativeEndian, NetworkEndian, WriteBytesExt};
use std::ffi::CString;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Parameter names understood by the kernel
pub mod names {
    pub const NAME: &str = "name";
    pub const HOSTNAME: &str = "host.hostname";
    pub const PATH: &str = "path";
    pub const PERSIST: &str = "persist";
    pub const SECURELEVEL: &str = "securelevel";
    pub const IP4_ADDR: &str = "ip4.addr";
    pub const JID: &str = "jid";
    pub const ERRMSG: &str = "errmsg";
}

/// Wire shape of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// NUL-terminated string
    String,
    /// 4-byte host-order integer
    Int32,
    /// Opaque bytes, e.g. packed IPv4 addresses
    Raw,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => write!(f, "string"),
            ParamKind::Int32 => write!(f, "int"),
            ParamKind::Raw => write!(f, "raw"),
        }
    }
}

/// Values accepted by jailsys parameters such as `ip4` or `host`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum JailSys {
    Disable = 0,
    New = 1,
    Inherit = 2,
}

/// A single jail parameter with its encoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: Vec<u8>,
    kind: ParamKind,
}

impl Param {
    /// String parameter, encoded as a C string
    pub fn string(name: &str, value: &str) -> Result<Self> {
        let value = CString::new(value)?.into_bytes_with_nul();
        Self::build(name, value, ParamKind::String)
    }

    /// 32-bit integer parameter in host byte order
    pub fn int(name: &str, value: i32) -> Result<Self> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<NativeEndian>(value)?;
        Self::build(name, buf, ParamKind::Int32)
    }

    /// Opaque byte parameter
    pub fn raw(name: &str, value: Vec<u8>) -> Result<Self> {
        Self::build(name, value, ParamKind::Raw)
    }

    /// `ip4.addr` parameter holding one packed IPv4 address
    pub fn ip(address: &str) -> Result<Self> {
        Self::ip_list(&[address])
    }

    /// `ip4.addr` parameter holding several packed IPv4 addresses
    pub fn ip_list<S: AsRef<str>>(addresses: &[S]) -> Result<Self> {
        if addresses.is_empty() {
            return Err(Error::InvalidAddress("no address given".into()));
        }
        let mut buf = Vec::with_capacity(addresses.len() * 4);
        for address in addresses {
            let addr = parse_ipv4(address.as_ref())?;
            buf.write_u32::<NetworkEndian>(u32::from(addr))?;
        }
        Self::build(names::IP4_ADDR, buf, ParamKind::Raw)
    }

    /// jailsys parameter (`new`, `inherit` or `disable`)
    pub fn jailsys(name: &str, value: JailSys) -> Result<Self> {
        Self::int(name, value as i32)
    }

    fn build(name: &str, value: Vec<u8>, kind: ParamKind) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::Encoding("parameter name is empty".into()));
        }
        if name.contains('\0') {
            return Err(Error::Encoding(format!(
                "parameter name {:?} contains a NUL byte",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            value,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded value bytes as handed to the kernel
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Decode an Int32 value
    pub fn as_int(&self) -> Option<i32> {
        match self.kind {
            ParamKind::Int32 if self.value.len() == 4 => Some(NativeEndian::read_i32(&self.value)),
            _ => None,
        }
    }

    /// Decode a String value, without its terminator
    pub fn as_str(&self) -> Option<&str> {
        match self.kind {
            ParamKind::String => {
                let bytes = self.value.strip_suffix(b"\0").unwrap_or(self.value.as_slice());
                std::str::from_utf8(bytes).ok()
            }
            _ => None,
        }
    }
}

fn parse_ipv4(address: &str) -> Result<Ipv4Addr> {
    match address.parse::<Ipv4Addr>() {
        Ok(addr) => Ok(addr),
        Err(_) if address.parse::<Ipv6Addr>().is_ok() => Err(Error::Unsupported(format!(
            "IPv6 address {} (only ip4.addr is supported)",
            address
        ))),
        Err(_) => Err(Error::InvalidAddress(address.to_string())),
    }
}
