//! Jail manifest parsing
//!
//! A manifest is a small TOML file describing one jail:
//!
//! ```toml
//! name = "www"
//! hostname = "www.local"
//! path = "/jails/www"
//! securelevel = 2
//! ip4 = ["10.0.0.5"]
//!
//! [params]
//! "allow.raw_sockets" = true
//! "osrelease" = "14.2-RELEASE"
//! ```

use crate::error::{Error, Result};
use crate::jail::{Param, names};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Load and validate a manifest from a file
pub fn load(path: &Path) -> Result<JailManifest> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    content.parse()
}

/// One jail as described in a manifest file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JailManifest {
    /// Jail name
    pub name: String,

    /// Hostname inside the jail
    pub hostname: String,

    /// Jail root directory
    pub path: PathBuf,

    /// Keep the jail alive without processes
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Kernel securelevel, 0 to 3
    pub securelevel: Option<i32>,

    /// IPv4 addresses
    #[serde(default)]
    pub ip4: Vec<String>,

    /// Extra jail parameters passed through as-is
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,
}

fn default_persist() -> bool {
    true
}

impl FromStr for JailManifest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let manifest: JailManifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }
}

impl JailManifest {
    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::ConfigValidation("name must not be empty".into()));
        }
        if self.hostname.is_empty() {
            return Err(Error::ConfigValidation(format!(
                "Jail '{}' has an empty hostname",
                self.name
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::ConfigValidation(format!(
                "Jail '{}' has an empty path",
                self.name
            )));
        }
        if let Some(level) = self.securelevel {
            if !(0..=3).contains(&level) {
                return Err(Error::ConfigValidation(format!(
                    "Invalid securelevel {}, must be a number between 0 and 3",
                    level
                )));
            }
        }

        // Typed fields own these names
        let reserved = [
            names::NAME,
            names::HOSTNAME,
            names::PATH,
            names::PERSIST,
            names::SECURELEVEL,
            names::IP4_ADDR,
            names::JID,
            names::ERRMSG,
        ];
        if let Some(key) = self.params.keys().find(|k| reserved.contains(&k.as_str())) {
            return Err(Error::ConfigValidation(format!(
                "Parameter '{}' must be set through its own field",
                key
            )));
        }
        Ok(())
    }

    /// Build the parameter list for jail_set(2)
    pub fn to_params(&self) -> Result<Vec<Param>> {
        let path = self.path.to_str().ok_or_else(|| {
            Error::Encoding(format!("path {} is not valid UTF-8", self.path.display()))
        })?;

        let mut params = vec![
            Param::string(names::NAME, &self.name)?,
            Param::string(names::HOSTNAME, &self.hostname)?,
            Param::string(names::PATH, path)?,
        ];
        if self.persist {
            params.push(Param::string(names::PERSIST, "")?);
        }
        if let Some(level) = self.securelevel {
            params.push(Param::int(names::SECURELEVEL, level)?);
        }
        if !self.ip4.is_empty() {
            params.push(Param::ip_list(self.ip4.as_slice())?);
        }
        for (name, value) in &self.params {
            params.push(param_from_toml(name, value)?);
        }
        Ok(params)
    }
}

/// Convert a TOML value to a Param
fn param_from_toml(name: &str, value: &toml::Value) -> Result<Param> {
    match value {
        toml::Value::Integer(i) => {
            let v = i32::try_from(*i).map_err(|_| {
                Error::ConfigValidation(format!(
                    "Parameter '{}' value {} does not fit in 32 bits",
                    name, i
                ))
            })?;
            Param::int(name, v)
        }
        toml::Value::Boolean(b) => Param::int(name, i32::from(*b)),
        toml::Value::String(s) => Param::string(name, s),
        _ => Err(Error::ConfigValidation(format!(
            "Unsupported type for parameter '{}': {:?}",
            name, value
        ))),
    }
}
