//! Permissions bitflags for the admin governance surface
//!
//! A small scope set carried in the actor's bearer token as a 64-bit
//! integer bitfield.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Admin permission flags
    ///
    /// Stored as BIGINT in token claims, serialized as string in JSON for
    /// JavaScript safety.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Submit privileged action requests
        const REQUEST_ACTIONS = 1 << 0;
        /// Cancel pending actions requested by other actors
        const CANCEL_ANY      = 1 << 1;
        /// Read the audit log and other actors' pending actions
        const VIEW_AUDIT      = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR   = 1 << 3;

        /// Default scope for an ordinary admin operator
        const DEFAULT = Self::REQUEST_ACTIONS.bits();

        /// All permissions (for break-glass supervisors)
        const ALL = u64::MAX;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Get the raw bits as i64 (for claims storage)
    #[inline]
    pub fn to_i64(self) -> i64 {
        self.bits() as i64
    }

    /// Create from raw i64 bits
    #[inline]
    pub fn from_i64(bits: i64) -> Self {
        Permissions::from_bits_truncate(bits as u64)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Get a list of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.contains(Self::REQUEST_ACTIONS) {
            result.push("REQUEST_ACTIONS");
        }
        if self.contains(Self::CANCEL_ANY) {
            result.push("CANCEL_ANY");
        }
        if self.contains(Self::VIEW_AUDIT) {
            result.push("VIEW_AUDIT");
        }
        if self.contains(Self::ADMINISTRATOR) {
            result.push("ADMINISTRATOR");
        }
        result
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Permissions::parse(&s).map_err(serde::de::Error::custom)
    }
}
