//! User-supplied function bodies, keyed by package, receiver type and function name.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GostubError, Result};
use crate::keywords::is_identifier;

/// Identifies a function or method across the loaded packages.
///
/// Parsed from `pkg.Func`, `pkg.Type.Method`, `pkg.(Type).Method` or `pkg.(*Type).Method`. The
/// three method spellings name the same key: receivers are matched by their base type name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverrideKey {
    /// Package name, as in the package clause.
    pub package: String,
    /// Receiver base type name for methods.
    pub receiver: Option<String>,
    /// Function or method name.
    pub function: String,
}

impl OverrideKey {
    /// Key for a plain function.
    pub fn function(package: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            receiver: None,
            function: function.into(),
        }
    }

    /// Key for a method of `receiver`.
    pub fn method(
        package: impl Into<String>,
        receiver: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            receiver: Some(receiver.into()),
            function: function.into(),
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}.{receiver}.{}", self.package, self.function),
            None => write!(f, "{}.{}", self.package, self.function),
        }
    }
}

impl FromStr for OverrideKey {
    type Err = GostubError;

    fn from_str(spec: &str) -> Result<Self> {
        let invalid = || GostubError::InvalidOverrideKey(spec.to_string());

        let (package, rest) = spec.split_once('.').ok_or_else(invalid)?;
        let (receiver, function) = if let Some(rest) = rest.strip_prefix('(') {
            let (receiver, function) = rest.split_once(").").ok_or_else(invalid)?;
            (Some(receiver.strip_prefix('*').unwrap_or(receiver)), function)
        } else {
            match rest.split_once('.') {
                Some((receiver, function)) => (Some(receiver), function),
                None => (None, rest),
            }
        };
        // Generic receivers are matched by their base name.
        let receiver = receiver.map(|r| r.split_once('[').map_or(r, |(base, _)| base));

        let valid = is_identifier(package)
            && is_identifier(function)
            && receiver.is_none_or(is_identifier);
        if !valid {
            return Err(invalid());
        }
        Ok(Self {
            package: package.to_string(),
            receiver: receiver.map(str::to_string),
            function: function.to_string(),
        })
    }
}

/// Replacement bodies for stubbed functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBodies {
    bodies: BTreeMap<OverrideKey, String>,
}

impl FunctionBodies {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from textual keys, failing on the first malformed one.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut bodies = Self::new();
        for (key, body) in pairs {
            bodies.insert(key.as_ref().parse()?, body);
        }
        Ok(bodies)
    }

    /// Parse a `KEY=BODY` command-line entry.
    pub fn parse_entry(entry: &str) -> Result<(OverrideKey, String)> {
        let (key, body) = entry
            .split_once('=')
            .ok_or_else(|| GostubError::InvalidOverrideKey(entry.to_string()))?;
        Ok((key.trim().parse()?, body.to_string()))
    }

    /// Set the body for `key`, replacing any earlier one.
    pub fn insert(&mut self, key: OverrideKey, body: impl Into<String>) {
        self.bodies.insert(key, body.into());
    }

    /// The override for `key`, if any.
    pub fn get(&self, key: &OverrideKey) -> Option<&str> {
        self.bodies.get(key).map(String::as_str)
    }

    /// Merge `other` in; its entries win.
    pub fn extend(&mut self, other: FunctionBodies) {
        self.bodies.extend(other.bodies);
    }
}
