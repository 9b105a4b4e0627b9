//! The slot registry: a fixed-size table of participant slots.
//!
//! # Concurrency note
//!
//! `SlotRegistry` is a plain `Vec` with no interior locking. It is owned by
//! the reactor task, which is the only writer of any match state.

use std::time::Instant;

use skirmish_protocol::PlayerId;
use skirmish_transport::ConnectionId;

use crate::{ReliabilityConfig, SendVerdict, SessionError, Slot, SlotState};

/// Fixed-capacity table mapping connections to identities.
///
/// ## Lifecycle
///
/// ```text
/// accept ──→ allocate() ──→ touch()/record_send_*() ──→ release()
///                │                                         │
///                ▼                                         ▼
///         lowest Free slot                           slot is Free again
/// ```
pub struct SlotRegistry {
    /// One entry per identity; `slots[i].player_id == PlayerId(i)`.
    slots: Vec<Slot>,
    config: ReliabilityConfig,
}

impl SlotRegistry {
    /// Creates a registry with `capacity` free slots.
    ///
    /// Identities are `u8`, so capacity is capped at 256.
    pub fn new(capacity: usize, config: ReliabilityConfig, now: Instant) -> Self {
        let capacity = capacity.min(u8::MAX as usize + 1);
        let slots = (0..capacity)
            .map(|i| Slot::free(PlayerId(i as u8), now))
            .collect();
        Self { slots, config }
    }

    /// Binds `connection` to the lowest free slot.
    ///
    /// # Errors
    /// Returns [`SessionError::Full`] if every slot is occupied. Nothing
    /// is changed in that case.
    pub fn allocate(
        &mut self,
        connection: ConnectionId,
        now: Instant,
    ) -> Result<PlayerId, SessionError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.state == SlotState::Free)
            .ok_or(SessionError::Full { capacity })?;

        slot.state = SlotState::Connected;
        slot.connection = Some(connection);
        slot.last_activity = now;
        slot.send_failures = 0;

        let player_id = slot.player_id;
        tracing::info!(%player_id, %connection, "slot allocated");
        Ok(player_id)
    }

    /// Frees the slot, returning the connection that occupied it.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the slot is already free or
    /// out of range.
    pub fn release(&mut self, player_id: PlayerId) -> Result<ConnectionId, SessionError> {
        let slot = self
            .slots
            .get_mut(player_id.index())
            .filter(|s| s.is_occupied())
            .ok_or(SessionError::NotFound(player_id))?;

        let connection = slot
            .connection
            .take()
            .ok_or(SessionError::NotFound(player_id))?;
        slot.state = SlotState::Free;
        slot.send_failures = 0;

        tracing::info!(%player_id, %connection, "slot released");
        Ok(connection)
    }

    /// Refreshes activity after a frame was received.
    pub fn touch(&mut self, player_id: PlayerId, now: Instant) {
        if let Some(slot) = self.connected_slot_mut(player_id) {
            slot.last_activity = now;
        }
    }

    /// Refreshes activity and clears the failure streak after a send.
    pub fn record_send_success(&mut self, player_id: PlayerId, now: Instant) {
        if let Some(slot) = self.connected_slot_mut(player_id) {
            slot.last_activity = now;
            slot.send_failures = 0;
        }
    }

    /// Counts a failed send. The configured number of consecutive failures
    /// marks the slot [`SlotState::Stale`].
    pub fn record_send_failure(&mut self, player_id: PlayerId) -> SendVerdict {
        let max = self.config.max_send_failures;
        let Some(slot) = self.connected_slot_mut(player_id) else {
            return SendVerdict::Evict;
        };

        slot.send_failures += 1;
        if slot.send_failures >= max {
            slot.state = SlotState::Stale;
            tracing::warn!(%player_id, failures = slot.send_failures, "send retry limit reached");
            SendVerdict::Evict
        } else {
            tracing::debug!(%player_id, failures = slot.send_failures, "send failed");
            SendVerdict::Retry(slot.send_failures)
        }
    }

    /// Marks a slot [`SlotState::Stale`] without waiting for the retry
    /// limit, for connections that can no longer carry frames.
    pub fn mark_stale(&mut self, player_id: PlayerId) {
        if let Some(slot) = self.connected_slot_mut(player_id) {
            slot.state = SlotState::Stale;
            tracing::warn!(%player_id, "connection unusable, marked stale");
        }
    }

    /// Connected participants whose last activity is older than the
    /// activity timeout.
    pub fn timed_out(&self, now: Instant) -> Vec<PlayerId> {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Connected)
            .filter(|s| now.saturating_duration_since(s.last_activity) > self.config.activity_timeout)
            .map(|s| s.player_id)
            .collect()
    }

    /// Slots waiting for teardown after exceeding the retry limit.
    pub fn stale(&self) -> Vec<PlayerId> {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Stale)
            .map(|s| s.player_id)
            .collect()
    }

    /// Connected identities in ascending order.
    pub fn connected(&self) -> Vec<PlayerId> {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Connected)
            .map(|s| s.player_id)
            .collect()
    }

    /// Number of connected participants.
    pub fn connected_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Connected)
            .count()
    }

    /// Whether `player_id` is connected (not free, not stale).
    pub fn is_connected(&self, player_id: PlayerId) -> bool {
        self.get(player_id)
            .is_some_and(|s| s.state == SlotState::Connected)
    }

    /// The connection currently bound to `player_id`'s slot.
    pub fn connection_id(&self, player_id: PlayerId) -> Option<ConnectionId> {
        self.get(player_id).and_then(|s| s.connection)
    }

    /// Looks up a slot by identity.
    pub fn get(&self, player_id: PlayerId) -> Option<&Slot> {
        self.slots.get(player_id.index())
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn connected_slot_mut(&mut self, player_id: PlayerId) -> Option<&mut Slot> {
        self.slots
            .get_mut(player_id.index())
            .filter(|s| s.state == SlotState::Connected)
    }
}
