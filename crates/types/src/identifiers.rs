//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier.
///
/// Globally unique, assigned by the dispatching initiator when the
/// transaction is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxnId(pub u64);

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}

/// Partition coordinator ("site") identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Site({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_display() {
        assert_eq!(TxnId(42).to_string(), "Txn(42)");
        assert_eq!(SiteId(5).to_string(), "Site(5)");
    }

    #[test]
    fn test_identifier_ordering() {
        assert!(TxnId(1) < TxnId(2));
        assert!(SiteId(0) < SiteId(1));
    }
}
