//! Strongly-typed identifiers for domain entities
//!
//! Upstream tables key funds and agents by integer and investors by an
//! opaque text code. Newtype wrappers keep the three from being mixed up in
//! the join maps of the AUM kernel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_int_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a raw database key
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Returns the raw database key
            pub const fn get(&self) -> i32 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> i32 {
                id.0
            }
        }
    };
}

define_int_id!(FundId, "FND");
define_int_id!(AgentId, "AGT");

/// Investor code as issued by the upstream registry
///
/// The code is opaque; it is compared and hashed as-is and displayed
/// without a prefix so log lines match the source tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestorId(String);

impl InvestorId {
    /// Wraps an investor code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the investor code
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns the code
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InvestorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for InvestorId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for InvestorId {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl std::borrow::Borrow<str> for InvestorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_fund_id_display() {
        assert_eq!(FundId::new(7).to_string(), "FND-7");
    }

    #[test]
    fn test_id_parsing() {
        let original = AgentId::new(42);
        let parsed: AgentId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: AgentId = "42".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_raw_conversion() {
        let id = FundId::from(3);
        let back: i32 = id.into();
        assert_eq!(back, 3);
    }

    #[test]
    fn test_investor_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(InvestorId::new("I1"), AgentId::new(10));

        assert_eq!(map.get("I1"), Some(&AgentId::new(10)));
        assert_eq!(InvestorId::from("I1").to_string(), "I1");
    }
}
