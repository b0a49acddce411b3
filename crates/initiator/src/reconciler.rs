//! Response reconciliation for transactions dispatched by this initiator.
//!
//! The reconciler owns every transaction this initiator is still waiting
//! on. It keeps a forward map from transaction id to its in-flight record
//! and a reverse index from site id to the transactions still expecting
//! that site, so that losing a site resolves exactly the affected
//! transactions. Both structures are mutated in the same operation and
//! never drift apart.

use crate::{InFlightTransaction, ReconcileError};
use meshdb_types::{ClientChannel, ClientResponse, InitiatorCallback, SiteId, SiteResponse, TxnId};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collects per-site responses, answers each client exactly once, and
/// releases admission credit exactly once per transaction.
///
/// Two events resolve an expectation: a real response ([`offer`]) and a
/// permanent site loss ([`remove_site`]). They may interleave in any
/// order; a transaction completes the moment its last expectation
/// resolves, whichever kind of event that is.
///
/// [`offer`]: ResponseReconciler::offer
/// [`remove_site`]: ResponseReconciler::remove_site
pub struct ResponseReconciler {
    /// Site this initiator runs on. Log context only.
    site_id: SiteId,
    /// Admission-control collaborator credited on every completion.
    initiator: Arc<dyn InitiatorCallback>,
    /// Forward map: transaction id -> in-flight record.
    in_flight: HashMap<TxnId, InFlightTransaction>,
    /// Reverse index: site -> transactions still expecting it.
    by_site: HashMap<SiteId, HashSet<TxnId>>,
}

impl ResponseReconciler {
    /// Create a reconciler for the initiator running at `site_id`.
    pub fn new(site_id: SiteId, initiator: Arc<dyn InitiatorCallback>) -> Self {
        Self {
            site_id,
            initiator,
            in_flight: HashMap::new(),
            by_site: HashMap::new(),
        }
    }

    /// The site this initiator runs on.
    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// Number of transactions currently in flight.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Check if no transactions are in flight.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Check if a transaction is currently in flight.
    pub fn contains(&self, txn_id: TxnId) -> bool {
        self.in_flight.contains_key(&txn_id)
    }

    /// Sites a transaction is still waiting on, if it is in flight.
    pub fn pending_sites(&self, txn_id: TxnId) -> Option<&BTreeSet<SiteId>> {
        self.in_flight.get(&txn_id).map(|txn| txn.pending_sites())
    }

    /// Register that `txn_id` was dispatched to `site_id` and a response
    /// is expected from it.
    ///
    /// Called once per (transaction, expected site) pair, before any
    /// `offer` or `remove_site` referencing the pair. The first
    /// registration for a transaction fixes its metadata and owning
    /// channel; later registrations only extend the expectation set.
    pub fn register_expectation(
        &mut self,
        txn_id: TxnId,
        site_id: SiteId,
        is_read_only: bool,
        is_single_partition: bool,
        message_size: usize,
        channel: Arc<dyn ClientChannel>,
    ) -> Result<(), ReconcileError> {
        let txn = self.in_flight.entry(txn_id).or_insert_with(|| {
            InFlightTransaction::new(
                txn_id,
                message_size,
                is_read_only,
                is_single_partition,
                channel,
            )
        });
        if !txn.add_pending_site(site_id) {
            return Err(ReconcileError::DuplicateExpectation { txn_id, site_id });
        }
        self.by_site.entry(site_id).or_default().insert(txn_id);
        debug!(
            %txn_id,
            %site_id,
            read_only = is_read_only,
            single_partition = is_single_partition,
            size = message_size,
            "Registered site expectation"
        );
        Ok(())
    }

    /// Accept one site's real response for a transaction.
    ///
    /// Resolves the (transaction, site) expectation, verifies the payload
    /// against the canonical result if one is already stored, answers the
    /// client on the fast path for read-only work, and completes the
    /// transaction if this was its last expectation.
    ///
    /// A [`ReconcileError::MismatchedResults`] leaves the record exactly
    /// as mutated so far: the site is resolved, the canonical payload is
    /// unchanged, and no delivery or credit release happens. The caller
    /// must escalate; this is divergent replica state, not a retryable
    /// condition.
    pub fn offer(&mut self, response: SiteResponse) -> Result<(), ReconcileError> {
        let SiteResponse {
            txn_id,
            site_id,
            response,
        } = response;

        let txn = self
            .in_flight
            .get_mut(&txn_id)
            .ok_or(ReconcileError::UnknownTransaction { txn_id })?;
        if !txn.resolve_site(site_id) {
            return Err(ReconcileError::UnknownSite { txn_id, site_id });
        }

        let recorded = txn.record_result(response);

        // Read-only work is answered from the first real response, even
        // while other replicas are still outstanding.
        if recorded.is_ok() && txn.is_read_only() && !txn.is_delivered() {
            if let Some(result) = txn.canonical_result().cloned() {
                debug!(%txn_id, %site_id, "Answering client from first replica response");
                txn.deliver(result);
            }
        }

        let fully_resolved = txn.is_resolved();
        self.unindex_site(site_id, txn_id);

        if let Err(err) = recorded {
            warn!(%txn_id, %site_id, %err, "Replica response diverges from canonical result");
            return Err(err);
        }

        if fully_resolved {
            self.complete(txn_id);
        }
        Ok(())
    }

    /// Resolve every expectation held against a permanently lost site.
    ///
    /// A failed site contributes no payload; transactions whose last
    /// expectation this resolves are completed with whatever canonical
    /// result they have, or a synthesized no-surviving-replica failure if
    /// no site ever answered. Returns the number of transactions the loss
    /// fully resolved.
    pub fn remove_site(&mut self, site_id: SiteId) -> usize {
        let Some(txns) = self.by_site.remove(&site_id) else {
            return 0;
        };
        // Ascending txn order keeps the fan-out deterministic.
        let affected: BTreeSet<TxnId> = txns.into_iter().collect();
        info!(
            initiator = %self.site_id,
            %site_id,
            affected = affected.len(),
            "Site lost, resolving its pending expectations"
        );

        let mut completed = 0;
        for txn_id in affected {
            let Some(txn) = self.in_flight.get_mut(&txn_id) else {
                debug_assert!(false, "site index references missing {txn_id}");
                continue;
            };
            let was_pending = txn.resolve_site(site_id);
            debug_assert!(was_pending, "site index out of lockstep for {txn_id}");
            if txn.is_resolved() {
                self.complete(txn_id);
                completed += 1;
            }
        }
        completed
    }

    /// Finish a fully resolved transaction: answer the client if it has
    /// not been answered yet, release admission credit, drop the record.
    fn complete(&mut self, txn_id: TxnId) {
        let Some(mut txn) = self.in_flight.remove(&txn_id) else {
            return;
        };
        if !txn.is_delivered() {
            let result = txn
                .take_result()
                .unwrap_or_else(ClientResponse::no_surviving_replica);
            txn.deliver(result);
        }
        self.initiator.reduce_backpressure(txn.message_size());
        debug!(%txn_id, size = txn.message_size(), "Transaction resolved, credit released");
    }

    /// Drop one (site, transaction) entry from the reverse index, pruning
    /// the site's set when it empties.
    fn unindex_site(&mut self, site_id: SiteId, txn_id: TxnId) {
        if let Some(txns) = self.by_site.get_mut(&site_id) {
            txns.remove(&txn_id);
            if txns.is_empty() {
                self.by_site.remove(&site_id);
            }
        }
    }
}
