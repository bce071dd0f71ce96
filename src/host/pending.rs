//! Pending request table and retransmission arithmetic.
//!
//! Every DATA a host sends registers a pending request that lives until
//! the matching ACK arrives or the retry budget runs out. The scan takes
//! a caller-supplied instant, so the whole schedule is testable without
//! real sleeps.

use crate::wire::{Data, NodeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One in-flight request awaiting acknowledgement.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    /// The exact datagram to retransmit (same sequence every time).
    pub data: Data,
    /// When the first transmission happened.
    pub first_sent: Instant,
    /// Transmissions so far; starts at 1.
    pub attempts: u32,
}

impl PendingRequest {
    /// Whether the next retransmission is due. The deadline grows
    /// linearly: `retry_interval × attempts` after the first send.
    pub fn is_due(&self, now: Instant, retry_interval: Duration) -> bool {
        now.duration_since(self.first_sent) >= retry_interval * self.attempts
    }
}

/// What the scan decided for one request.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanAction {
    /// Send this datagram again; its attempt count was incremented.
    Retransmit(Data),
    /// Retry budget exhausted; the request was removed.
    Abandon(Data),
}

/// The table of in-flight requests, keyed by local sequence.
#[derive(Debug, Default)]
pub struct PendingTable {
    requests: HashMap<u64, PendingRequest>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly sent DATA (attempts start at 1).
    pub fn insert(&mut self, data: Data, now: Instant) {
        self.requests.insert(
            data.sequence,
            PendingRequest {
                data,
                first_sent: now,
                attempts: 1,
            },
        );
    }

    /// Clear the request an ACK names. A match requires both the
    /// sequence and, as the ACK's source, the original destination;
    /// anything else leaves the table untouched.
    pub fn acknowledge(&mut self, ack_sequence: u64, from: &NodeId) -> Option<PendingRequest> {
        match self.requests.get(&ack_sequence) {
            Some(request) if request.data.destination == *from => {
                self.requests.remove(&ack_sequence)
            }
            _ => None,
        }
    }

    /// Walk the table and decide retransmissions and abandonments.
    ///
    /// Requests past their deadline get one more attempt; requests whose
    /// attempt count would exceed `max_attempts` are removed instead.
    /// Actions come back in sequence order.
    pub fn scan(
        &mut self,
        now: Instant,
        retry_interval: Duration,
        max_attempts: u32,
    ) -> Vec<ScanAction> {
        let mut due: Vec<u64> = self
            .requests
            .iter()
            .filter(|(_, request)| request.is_due(now, retry_interval))
            .map(|(&sequence, _)| sequence)
            .collect();
        due.sort_unstable();

        let mut actions = Vec::with_capacity(due.len());
        for sequence in due {
            let exhausted = match self.requests.get_mut(&sequence) {
                Some(request) => {
                    request.attempts += 1;
                    request.attempts > max_attempts
                }
                None => continue,
            };

            if exhausted {
                if let Some(request) = self.requests.remove(&sequence) {
                    actions.push(ScanAction::Abandon(request.data));
                }
            } else if let Some(request) = self.requests.get(&sequence) {
                actions.push(ScanAction::Retransmit(request.data.clone()));
            }
        }
        actions
    }

    pub fn get(&self, sequence: u64) -> Option<&PendingRequest> {
        self.requests.get(&sequence)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
