//! Test helpers for meshdb.
//!
//! Recording implementations of the initiator's collaborator traits plus
//! the result-set fixtures the scenario tests share. Everything here is
//! `&self`-mutable because the collaborator traits are invoked through
//! shared references.

use meshdb_types::{
    ClientChannel, ClientResponse, ColumnInfo, ColumnType, FieldValue, InitiatorCallback,
    ResultTable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// `ClientChannel` double that records every delivery.
#[derive(Default)]
pub struct RecordingChannel {
    delivered: AtomicUsize,
    last: Mutex<Option<ClientResponse>>,
}

impl RecordingChannel {
    /// Create a channel that has seen no deliveries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of responses delivered over the channel's lifetime.
    pub fn delivered_count(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Take the most recent response, clearing it.
    ///
    /// Returns `None` if nothing was delivered since the last take, which
    /// is how tests assert "no new delivery happened".
    pub fn take_response(&self) -> Option<ClientResponse> {
        self.last.lock().unwrap().take()
    }
}

impl ClientChannel for RecordingChannel {
    fn deliver(&self, response: ClientResponse) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(response);
    }
}

/// `InitiatorCallback` double that accumulates credit accounting.
#[derive(Default)]
pub struct RecordingInitiator {
    reduce_count: AtomicUsize,
    reduce_total: AtomicUsize,
    increase_count: AtomicUsize,
    increase_total: AtomicUsize,
}

impl RecordingInitiator {
    /// Create an initiator with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of credit releases observed.
    pub fn reduce_count(&self) -> usize {
        self.reduce_count.load(Ordering::SeqCst)
    }

    /// Total bytes of credit released.
    pub fn reduce_total(&self) -> usize {
        self.reduce_total.load(Ordering::SeqCst)
    }

    /// Number of credit charges observed.
    pub fn increase_count(&self) -> usize {
        self.increase_count.load(Ordering::SeqCst)
    }

    /// Total bytes of credit charged.
    pub fn increase_total(&self) -> usize {
        self.increase_total.load(Ordering::SeqCst)
    }
}

impl InitiatorCallback for RecordingInitiator {
    fn reduce_backpressure(&self, message_size: usize) {
        self.reduce_count.fetch_add(1, Ordering::SeqCst);
        self.reduce_total.fetch_add(message_size, Ordering::SeqCst);
    }

    fn increase_backpressure(&self, message_size: usize) {
        self.increase_count.fetch_add(1, Ordering::SeqCst);
        self.increase_total.fetch_add(message_size, Ordering::SeqCst);
    }
}

/// One-column, one-row text table, the canonical scenario payload.
pub fn single_text_table(thing: &str) -> ResultTable {
    let mut table = ResultTable::new(vec![ColumnInfo::new("thing", ColumnType::Text)]);
    table.add_row(vec![FieldValue::Text(thing.to_string())]);
    table
}

/// Successful response wrapping a single text table.
pub fn text_response(thing: &str) -> ClientResponse {
    ClientResponse::success(vec![single_text_table(thing)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_channel_take_clears() {
        let channel = RecordingChannel::new();
        assert!(channel.take_response().is_none());

        channel.deliver(text_response("dude"));
        assert_eq!(channel.delivered_count(), 1);
        assert_eq!(channel.take_response(), Some(text_response("dude")));
        assert!(channel.take_response().is_none());
        // Count survives a take.
        assert_eq!(channel.delivered_count(), 1);
    }

    #[test]
    fn test_recording_initiator_accumulates() {
        let initiator = RecordingInitiator::new();
        initiator.reduce_backpressure(13);
        initiator.reduce_backpressure(13);
        initiator.increase_backpressure(7);

        assert_eq!(initiator.reduce_count(), 2);
        assert_eq!(initiator.reduce_total(), 26);
        assert_eq!(initiator.increase_count(), 1);
        assert_eq!(initiator.increase_total(), 7);
    }
}
