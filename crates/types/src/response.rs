//! Client-visible responses and per-site response messages.

use crate::{ResultTable, SiteId, TxnId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome status carried on every client response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The procedure ran to completion.
    Success,
    /// The procedure aborted itself.
    UserAbort,
    /// The transaction was rejected before doing any work.
    GracefulFailure,
    /// The transaction failed for an infrastructure reason.
    UnexpectedFailure,
}

impl ResponseStatus {
    /// Check if this status represents a completed transaction.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Success)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseStatus::Success => "Success",
            ResponseStatus::UserAbort => "UserAbort",
            ResponseStatus::GracefulFailure => "GracefulFailure",
            ResponseStatus::UnexpectedFailure => "UnexpectedFailure",
        };
        write!(f, "{name}")
    }
}

/// The answer returned to the originating client for one transaction.
///
/// Whatever the status, at most one of these reaches the client per
/// transaction; the reconciler enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientResponse {
    /// Outcome of the transaction.
    pub status: ResponseStatus,
    /// Result tables produced by the procedure, empty on failure.
    pub results: Vec<ResultTable>,
    /// Human-readable detail, empty on success.
    pub status_string: String,
}

impl ClientResponse {
    /// Create a successful response carrying the given result tables.
    pub fn success(results: Vec<ResultTable>) -> Self {
        Self {
            status: ResponseStatus::Success,
            results,
            status_string: String::new(),
        }
    }

    /// Create a failure response with no result tables.
    pub fn failure(status: ResponseStatus, status_string: impl Into<String>) -> Self {
        Self {
            status,
            results: Vec::new(),
            status_string: status_string.into(),
        }
    }

    /// The response synthesized when every site a transaction was sent to
    /// was lost before any of them answered.
    pub fn no_surviving_replica() -> Self {
        Self::failure(
            ResponseStatus::UnexpectedFailure,
            "transaction failed: no surviving replica produced a response",
        )
    }

    /// Compact one-line digest used in divergence diagnostics.
    ///
    /// Row data beyond each table's first row is elided.
    pub fn summary(&self) -> String {
        let tables = if self.results.is_empty() {
            "none".to_string()
        } else {
            self.results
                .iter()
                .map(|t| match t.rows.first() {
                    Some(first) => format!("{} rows starting {:?}", t.row_count(), first),
                    None => "empty".to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };
        if self.status_string.is_empty() {
            format!("{}; tables: {}", self.status, tables)
        } else {
            format!("{} ({}); tables: {}", self.status, self.status_string, tables)
        }
    }
}

/// One site's answer to a transaction dispatched by this initiator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteResponse {
    /// The transaction being answered.
    pub txn_id: TxnId,
    /// The coordinator site that produced this answer.
    pub site_id: SiteId,
    /// The payload the client would see.
    pub response: ClientResponse,
}

impl SiteResponse {
    /// Create a new per-site response.
    pub fn new(txn_id: TxnId, site_id: SiteId, response: ClientResponse) -> Self {
        Self {
            txn_id,
            site_id,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnInfo, ColumnType, FieldValue};

    fn one_row_table() -> ResultTable {
        let mut table = ResultTable::new(vec![ColumnInfo::new("thing", ColumnType::Text)]);
        table.add_row(vec![FieldValue::Text("dude".to_string())]);
        table
    }

    #[test]
    fn test_success_response() {
        let response = ClientResponse::success(vec![one_row_table()]);
        assert!(response.status.is_success());
        assert_eq!(response.results.len(), 1);
        assert!(response.status_string.is_empty());
    }

    #[test]
    fn test_no_surviving_replica_response() {
        let response = ClientResponse::no_surviving_replica();
        assert_eq!(response.status, ResponseStatus::UnexpectedFailure);
        assert!(response.results.is_empty());
        assert!(response.status_string.contains("no surviving replica"));
    }

    #[test]
    fn test_summary() {
        let ok = ClientResponse::success(vec![one_row_table()]);
        assert_eq!(
            ok.summary(),
            "Success; tables: 1 rows starting [Text(\"dude\")]"
        );

        let failed = ClientResponse::failure(ResponseStatus::GracefulFailure, "rejected");
        assert_eq!(failed.summary(), "GracefulFailure (rejected); tables: none");
    }

    #[test]
    fn test_summary_distinguishes_divergent_payloads() {
        let mut other = ResultTable::new(vec![ColumnInfo::new("thing", ColumnType::Text)]);
        other.add_row(vec![FieldValue::Text("sweet".to_string())]);

        let a = ClientResponse::success(vec![one_row_table()]);
        let b = ClientResponse::success(vec![other]);
        assert_ne!(a.summary(), b.summary());
    }

    #[test]
    fn test_responses_compare_by_value() {
        let a = ClientResponse::success(vec![one_row_table()]);
        let b = ClientResponse::success(vec![one_row_table()]);
        assert_eq!(a, b);

        let c = ClientResponse::success(vec![]);
        assert_ne!(a, c);
    }
}
