//! Collaborator traits at the initiator's seams.

use crate::ClientResponse;

/// Admission-control credit accounting for the transaction initiator.
///
/// Implemented by the component that meters how many bytes of client work
/// may be in flight at once. The reconciliation core releases credit
/// exactly once per completed transaction, with the byte size recorded
/// when the transaction was registered; the charge side is invoked by the
/// dispatch path when work is admitted.
pub trait InitiatorCallback: Send + Sync {
    /// Release `message_size` bytes of admission credit.
    ///
    /// Must not block.
    fn reduce_backpressure(&self, message_size: usize);

    /// Charge `message_size` bytes of admission credit.
    ///
    /// Never called by the reconciliation core.
    fn increase_backpressure(&self, message_size: usize);
}

/// Delivery sink for one client connection.
///
/// The connection's lifetime belongs to the network layer; holders of a
/// channel only invoke delivery, they never manage the connection.
pub trait ClientChannel: Send + Sync {
    /// Deliver the final response for a transaction to the client.
    ///
    /// Invoked at most once per transaction. Failure to deliver (for
    /// example a connection closed under the sender) is the channel's
    /// concern; callers do not retry.
    fn deliver(&self, response: ClientResponse);
}
