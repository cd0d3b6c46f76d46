//! Typed method descriptors used to identify call targets.

use crate::result::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable symbolic signature of a method: owning type, name and parameter count.
///
/// Two signatures match only when all three parts are equal. The text form is
/// `Owner::name/arity`, e.g. `StardewValley.Locations.MineShaft::adjustLevelChances/4`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Fully qualified owning type.
    pub owner: String,
    /// Method name.
    pub name: String,
    /// Number of parameters consumed from the stack.
    pub arity: u8,
}

impl MethodSignature {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, arity: u8) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            arity,
        }
    }

    /// Owner and name without the arity, as used to identify a host method body.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}/{}", self.owner, self.name, self.arity)
    }
}

impl FromStr for MethodSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidSignature(s.to_string());

        let (path, arity) = s.trim().rsplit_once('/').ok_or_else(invalid)?;
        let arity = arity.parse::<u8>().map_err(|_| invalid())?;
        let (owner, name) = path.rsplit_once("::").ok_or_else(invalid)?;

        if owner.is_empty() || name.is_empty() || name.contains(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self::new(owner, name, arity))
    }
}
