use std::env;
use std::ffi::{CString, OsStr, OsString};
use std::iter::FromIterator;
use std::os::unix::ffi::OsStrExt;

use crate::errors::*;

/// Environment block handed to the new image.
///
/// It is captured once, when the launcher starts, and then only read. Order
/// is preserved and names are unique: inserting a name twice keeps the first
/// position and the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Snapshot of this process's environment.
    pub fn capture() -> Environment {
        env::vars_os().collect()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[cfg(test)]
    pub fn get<K: AsRef<OsStr>>(&self, name: K) -> Option<&OsStr> {
        let name = name.as_ref();
        self.vars
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_os_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_os_str(), value.as_os_str()))
    }

    /// Builds the `NAME=value` strings expected by `execve`.
    pub fn to_envp(&self) -> Result<Vec<CString>> {
        self.iter()
            .map(|(key, value)| {
                let mut entry = Vec::with_capacity(key.len() + value.len() + 1);
                entry.extend_from_slice(key.as_bytes());
                entry.push(b'=');
                entry.extend_from_slice(value.as_bytes());
                CString::new(entry)
                    .map_err(|err| Error::nul_byte("environment variable", err))
            })
            .collect()
    }

    fn insert(&mut self, name: OsString, value: OsString) {
        match self.vars.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Environment {
        let mut environment = Environment::default();
        for (key, value) in iter {
            environment.insert(key.into(), value.into());
        }
        environment
    }
}
