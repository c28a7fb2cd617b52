// src/system/environment.rs

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};

/// The variables handed to every spawned child.
///
/// Snapshotted from the process at startup and owned by the shell from then
/// on, so removing a variable never touches the process environment itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            vars: env::vars_os().collect(),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(OsStr::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(name)).map(OsString::as_os_str)
    }

    pub fn set(&mut self, name: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Removes `name`. Returns `false` if it was not set.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.remove(OsStr::new(name)).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsString, &OsString)> {
        self.vars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_unset() {
        let mut env = Environment::default();
        env.set("SMASH_TEST_VAR", "1");
        assert!(env.exists("SMASH_TEST_VAR"));
        assert_eq!(env.get("SMASH_TEST_VAR"), Some(OsStr::new("1")));

        assert!(env.unset("SMASH_TEST_VAR"));
        assert!(!env.exists("SMASH_TEST_VAR"));
        assert!(!env.unset("SMASH_TEST_VAR"));
    }

    #[test]
    fn test_snapshot_contains_path() {
        let env = Environment::from_process();
        assert_eq!(env.exists("PATH"), env::var_os("PATH").is_some());
    }
}
