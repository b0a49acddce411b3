//! Per-transaction bookkeeping for dispatched work.

use crate::ReconcileError;
use meshdb_types::{ClientChannel, ClientResponse, SiteId, TxnId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Bookkeeping record for one transaction awaiting site responses.
///
/// Created when the dispatcher registers the first expected site, mutated
/// as responses and site-loss notifications resolve expectations one at a
/// time, and discarded by the reconciler the moment every expectation has
/// been resolved.
///
/// The pending-site set only shrinks after registration, and the delivered
/// flag latches: both are what make "exactly one answer, exactly one
/// credit release" hold under arbitrary interleavings.
pub struct InFlightTransaction {
    txn_id: TxnId,
    /// Byte size recorded at registration, released verbatim as admission
    /// credit on completion regardless of how many sites were registered.
    message_size: usize,
    is_read_only: bool,
    is_single_partition: bool,
    /// Owning client connection, shared with the network layer.
    channel: Arc<dyn ClientChannel>,
    /// Sites that have not yet resolved.
    pending_sites: BTreeSet<SiteId>,
    /// Payload from the first site that answered with a real response.
    canonical_result: Option<ClientResponse>,
    /// True once the client has been answered.
    delivered: bool,
}

impl InFlightTransaction {
    pub(crate) fn new(
        txn_id: TxnId,
        message_size: usize,
        is_read_only: bool,
        is_single_partition: bool,
        channel: Arc<dyn ClientChannel>,
    ) -> Self {
        Self {
            txn_id,
            message_size,
            is_read_only,
            is_single_partition,
            channel,
            pending_sites: BTreeSet::new(),
            canonical_result: None,
            delivered: false,
        }
    }

    /// The transaction this record tracks.
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Byte size registered for admission-credit accounting.
    pub fn message_size(&self) -> usize {
        self.message_size
    }

    /// Whether the transaction is read-only (first-response delivery).
    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    /// Whether the transaction touches a single partition. Informational;
    /// reconciliation does not branch on it.
    pub fn is_single_partition(&self) -> bool {
        self.is_single_partition
    }

    /// Whether the client has already been answered.
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Whether every expected site has resolved.
    pub fn is_resolved(&self) -> bool {
        self.pending_sites.is_empty()
    }

    /// Sites still expected to resolve.
    pub fn pending_sites(&self) -> &BTreeSet<SiteId> {
        &self.pending_sites
    }

    /// The first real response recorded, if any site has answered yet.
    pub fn canonical_result(&self) -> Option<&ClientResponse> {
        self.canonical_result.as_ref()
    }

    /// Add a site to the expectation set.
    ///
    /// Returns false if the site is already expected.
    pub(crate) fn add_pending_site(&mut self, site_id: SiteId) -> bool {
        self.pending_sites.insert(site_id)
    }

    /// Resolve one expected site (real response or site loss).
    ///
    /// Returns false if the site was not in the expectation set.
    pub(crate) fn resolve_site(&mut self, site_id: SiteId) -> bool {
        self.pending_sites.remove(&site_id)
    }

    /// Store the first real response, or verify a later one against it.
    pub(crate) fn record_result(&mut self, response: ClientResponse) -> Result<(), ReconcileError> {
        match &self.canonical_result {
            None => {
                self.canonical_result = Some(response);
                Ok(())
            }
            Some(canonical) if *canonical == response => Ok(()),
            Some(canonical) => Err(ReconcileError::MismatchedResults {
                txn_id: self.txn_id,
                canonical: canonical.summary(),
                conflicting: response.summary(),
            }),
        }
    }

    /// Answer the owning client and latch the delivered flag.
    pub(crate) fn deliver(&mut self, response: ClientResponse) {
        debug_assert!(!self.delivered, "client answered twice for {}", self.txn_id);
        self.channel.deliver(response);
        self.delivered = true;
    }

    /// Take the stored canonical result, leaving the record without one.
    ///
    /// Only meaningful at completion, when the record is about to be
    /// dropped.
    pub(crate) fn take_result(&mut self) -> Option<ClientResponse> {
        self.canonical_result.take()
    }
}
