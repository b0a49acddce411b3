//! Error types for response reconciliation.

use meshdb_types::{SiteId, TxnId};
use thiserror::Error;

/// Errors surfaced by the response reconciler.
///
/// None of these are retryable: each one reports a protocol violation by
/// the surrounding machinery, and `MismatchedResults` reports divergent
/// replica state the caller is expected to escalate rather than absorb.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A response arrived for a transaction that is not in flight.
    #[error("unknown transaction {txn_id}")]
    UnknownTransaction {
        /// The transaction the response referenced.
        txn_id: TxnId,
    },

    /// A response arrived from a site the transaction is not waiting on.
    #[error("{txn_id} has no pending expectation for {site_id}")]
    UnknownSite {
        /// The transaction the response referenced.
        txn_id: TxnId,
        /// The site that was not expected.
        site_id: SiteId,
    },

    /// The same (transaction, site) expectation was registered twice.
    #[error("expectation for {txn_id} at {site_id} is already registered")]
    DuplicateExpectation {
        /// The transaction being registered.
        txn_id: TxnId,
        /// The site already present in the expectation set.
        site_id: SiteId,
    },

    /// Two replicas returned different payloads for the same transaction.
    ///
    /// A deterministic transaction must produce identical results on every
    /// replica; divergence means the replication protocol has been
    /// violated and the affected transaction cannot be answered safely.
    #[error("mismatched results for {txn_id}: canonical [{canonical}] vs conflicting [{conflicting}]")]
    MismatchedResults {
        /// The transaction with divergent replica results.
        txn_id: TxnId,
        /// Digest of the payload recorded first.
        canonical: String,
        /// Digest of the conflicting payload.
        conflicting: String,
    },
}
