//! The reactor: the single task that owns a server's match.
//!
//! It holds the slot registry, the dispatcher, the lifecycle state and the
//! rule engine's state, and is the only code that mutates any of them.
//! Three sources feed it:
//!
//! ```text
//!   listener.accept() ──┐
//!   reader tasks ───────┼──→ select! ──→ on_accept / on_inbound / on_tick
//!   tick scheduler ─────┘
//! ```
//!
//! Every handler takes the current time, which keeps timeouts, heartbeats
//! and the re-arm delay testable without a clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use skirmish_match::{FinishPolicy, MatchConfig, MatchContext, MatchState, Outbox, RuleEngine};
use skirmish_protocol::{Codec, Inbound, PlayerId, ProtocolError, SystemMessage, decode_inbound};
use skirmish_session::{HeartbeatClock, ReliabilityConfig, SlotRegistry};
use skirmish_tick::TickScheduler;
use skirmish_transport::{Connection, ConnectionId, Transport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::SkirmishError;
use crate::dispatch::{Delivery, Dispatcher};
use crate::handler::{InboundEvent, read_loop};

/// Whether the reactor keeps going after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Halt,
}

/// One `select!` outcome, taken out of the select so the handlers can
/// borrow the reactor mutably.
enum Step<C> {
    Accept(Result<C, skirmish_transport::TransportError>),
    Inbound(InboundEvent),
    Tick,
}

pub(crate) struct Reactor<E: RuleEngine, C: Connection, K: Codec> {
    config: MatchConfig,
    phase: MatchState,
    state: E::State,
    registry: SlotRegistry,
    dispatcher: Dispatcher<C, K>,
    readers: HashMap<PlayerId, JoinHandle<()>>,
    inbound_tx: mpsc::UnboundedSender<InboundEvent>,
    heartbeat: HeartbeatClock,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl<E, C, K> Reactor<E, C, K>
where
    E: RuleEngine,
    C: Connection,
    K: Codec,
{
    /// Builds a reactor and the receiving end of its inbound channel.
    pub(crate) fn new(
        engine_config: &E::Config,
        config: MatchConfig,
        reliability: ReliabilityConfig,
        codec: K,
        now: Instant,
    ) -> (Self, mpsc::UnboundedReceiver<InboundEvent>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let heartbeat = HeartbeatClock::new(reliability.heartbeat_interval, now);
        let reactor = Self {
            phase: MatchState::Waiting,
            state: E::init(engine_config),
            registry: SlotRegistry::new(config.capacity, reliability, now),
            dispatcher: Dispatcher::new(codec),
            readers: HashMap::new(),
            inbound_tx,
            heartbeat,
            started_at: now,
            finished_at: None,
            config,
        };
        (reactor, inbound_rx)
    }

    /// Runs until the match finishes under [`FinishPolicy::Halt`].
    pub(crate) async fn run<T>(
        mut self,
        mut transport: T,
        mut inbound: mpsc::UnboundedReceiver<InboundEvent>,
    ) -> Result<(), SkirmishError>
    where
        T: Transport<Connection = C>,
    {
        let mut ticks = TickScheduler::with_rate(self.config.tick_rate_hz);
        tracing::info!(
            capacity = self.config.capacity,
            tick_rate_hz = self.config.tick_rate_hz,
            "reactor running"
        );

        loop {
            let step = tokio::select! {
                accepted = transport.accept() => Step::Accept(accepted),
                Some(event) = inbound.recv() => Step::Inbound(event),
                _ = ticks.wait_for_tick() => Step::Tick,
            };

            let now = Instant::now();
            let flow = match step {
                Step::Accept(Ok(conn)) => self.on_accept(conn, now).await,
                Step::Accept(Err(e)) => {
                    tracing::warn!(error = %e, "accept failed");
                    Flow::Continue
                }
                Step::Inbound(event) => self.on_inbound(event, now).await,
                Step::Tick => {
                    let flow = self.on_tick(now).await;
                    ticks.record_tick_end();
                    flow
                }
            };

            if flow == Flow::Halt {
                self.shutdown().await;
                tracing::info!("server stopped");
                return Ok(());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Gives a new connection a slot, or refuses it.
    pub(crate) async fn on_accept(&mut self, conn: C, now: Instant) -> Flow {
        let conn_id = conn.id();
        let player = match self.registry.allocate(conn_id, now) {
            Ok(player) => player,
            Err(e) => {
                let message = if self.phase.is_in_progress() {
                    "match in progress, try again later"
                } else {
                    "server full"
                };
                tracing::info!(%conn_id, error = %e, "connection refused");
                self.dispatcher.reject(&conn, message).await;
                if let Err(e) = conn.close().await {
                    tracing::debug!(%conn_id, error = %e, "close after refusal failed");
                }
                return Flow::Continue;
            }
        };

        let conn = Arc::new(conn);
        self.dispatcher.attach(player, Arc::clone(&conn));
        let reader = tokio::spawn(read_loop(player, conn, self.inbound_tx.clone()));
        self.readers.insert(player, reader);
        tracing::info!(%player, %conn_id, "participant joined");

        let assign = SystemMessage::AssignId { player_id: player };
        self.dispatcher
            .unicast(&mut self.registry, player, &assign, Delivery::Tracked, now)
            .await;

        let outbox = self.with_context(|state, ctx| E::on_join(state, ctx, player));
        self.deliver(outbox, now).await;
        self.try_start(now).await;
        self.settle(now).await
    }

    /// Handles a frame or a closed connection reported by a reader.
    pub(crate) async fn on_inbound(&mut self, event: InboundEvent, now: Instant) -> Flow {
        match event {
            InboundEvent::Frame {
                player,
                conn_id,
                bytes,
            } => {
                if self.is_current(player, conn_id) {
                    self.on_frame(player, &bytes, now).await;
                }
            }
            InboundEvent::Closed {
                player,
                conn_id,
                reason,
            } => {
                if self.is_current(player, conn_id) {
                    tracing::info!(%player, %reason, "connection closed");
                    self.release_connection(player, now).await;
                }
            }
        }
        self.settle(now).await
    }

    /// Periodic maintenance and the rule engine's tick.
    pub(crate) async fn on_tick(&mut self, now: Instant) -> Flow {
        for player in self.registry.timed_out(now) {
            tracing::warn!(%player, "participant timed out");
            let notice = SystemMessage::Timeout {
                reason: format!("player {} timed out", player.0),
            };
            for other in self.registry.connected() {
                if other != player {
                    self.dispatcher
                        .unicast(&mut self.registry, other, &notice, Delivery::Tracked, now)
                        .await;
                }
            }
            self.release_connection(player, now).await;
        }

        if self.heartbeat.due(now) {
            let elapsed = now.saturating_duration_since(self.started_at).as_millis();
            let heartbeat = SystemMessage::Heartbeat {
                timestamp: u64::try_from(elapsed).unwrap_or(u64::MAX),
            };
            self.dispatcher
                .broadcast(&mut self.registry, &heartbeat, Delivery::Keepalive, now)
                .await;
        }

        let outbox = self.with_context(|state, ctx| E::tick(state, ctx, now));
        self.deliver(outbox, now).await;

        let flow = self.settle(now).await;
        if flow == Flow::Continue {
            self.rearm_if_due(now).await;
        }
        flow
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn is_current(&self, player: PlayerId, conn_id: ConnectionId) -> bool {
        let current = self.registry.connection_id(player) == Some(conn_id);
        if !current {
            tracing::debug!(%player, %conn_id, "dropping event from a previous connection");
        }
        current
    }

    async fn on_frame(&mut self, player: PlayerId, bytes: &[u8], now: Instant) {
        self.registry.touch(player, now);

        let msg = match decode_inbound::<E::ClientMessage, _>(self.dispatcher.codec(), bytes) {
            Ok(Inbound::Heartbeat) => {
                tracing::trace!(%player, "client heartbeat");
                return;
            }
            Ok(Inbound::Message(msg)) => msg,
            Err(e @ ProtocolError::InvalidMessage(_)) => {
                tracing::debug!(%player, error = %e, "malformed message");
                if self.config.report_malformed {
                    self.send_error(player, e.to_string(), now).await;
                }
                return;
            }
            Err(e) => {
                tracing::info!(%player, error = %e, "unreadable frame, closing connection");
                self.release_connection(player, now).await;
                return;
            }
        };

        let roster = self.registry.connected();
        let verdict = {
            let ctx = MatchContext::new(&mut self.phase, &roster);
            E::validate_message(&self.state, &ctx, player, &msg)
        };
        if let Err(e) = verdict {
            tracing::debug!(%player, error = %e, "request rejected");
            self.send_error(player, e.to_string(), now).await;
            return;
        }

        let outbox = self.with_context(|state, ctx| E::handle_message(state, ctx, player, msg));
        self.deliver(outbox, now).await;
    }

    /// Tears a participant down: stops its reader, closes the socket,
    /// frees the slot and lets the rule engine react.
    async fn release_connection(&mut self, player: PlayerId, now: Instant) {
        if let Some(reader) = self.readers.remove(&player) {
            reader.abort();
        }
        if let Some(conn) = self.dispatcher.detach(player) {
            if let Err(e) = conn.close().await {
                tracing::debug!(%player, error = %e, "close failed");
            }
        }
        match self.registry.release(player) {
            Ok(conn_id) => tracing::info!(%player, %conn_id, "participant left"),
            Err(e) => {
                tracing::debug!(%player, error = %e, "release skipped");
                return;
            }
        }

        let outbox = self.with_context(|state, ctx| E::on_leave(state, ctx, player));
        self.deliver(outbox, now).await;
    }

    /// Starts a match once enough participants are waiting.
    async fn try_start(&mut self, now: Instant) {
        if self.phase != MatchState::Waiting
            || self.registry.connected_count() < self.config.required_players
        {
            return;
        }
        let outbox = self.with_context(|state, ctx| match ctx.transition(MatchState::Setup) {
            Ok(()) => E::on_start(state, ctx),
            Err(e) => {
                tracing::warn!(error = %e, "could not start match");
                Vec::new()
            }
        });
        self.deliver(outbox, now).await;
    }

    /// Reaps stale slots and applies the finish policy.
    async fn settle(&mut self, now: Instant) -> Flow {
        while let Some(&player) = self.registry.stale().first() {
            tracing::warn!(%player, "evicting unreachable participant");
            self.release_connection(player, now).await;
        }

        if self.phase != MatchState::Finished {
            self.finished_at = None;
            return Flow::Continue;
        }
        if self.finished_at.is_none() {
            self.finished_at = Some(now);
            tracing::info!("match finished");
        }
        match self.config.finish {
            FinishPolicy::Halt => Flow::Halt,
            FinishPolicy::Rearm { .. } => Flow::Continue,
        }
    }

    /// Resets a finished match once the re-arm delay has passed, and starts
    /// the next one if enough participants stayed.
    async fn rearm_if_due(&mut self, now: Instant) {
        let (FinishPolicy::Rearm { delay }, Some(finished_at)) = (self.config.finish, self.finished_at)
        else {
            return;
        };
        if now.saturating_duration_since(finished_at) < delay {
            return;
        }

        E::on_rearm(&mut self.state);
        let reset = self.with_context(|_, ctx| ctx.transition(MatchState::Waiting));
        if let Err(e) = reset {
            tracing::warn!(error = %e, "could not re-arm match");
            return;
        }
        self.finished_at = None;
        self.try_start(now).await;
    }

    /// Closes every connection. Used when the server halts.
    async fn shutdown(&mut self) {
        for player in self.registry.connected() {
            if let Some(reader) = self.readers.remove(&player) {
                reader.abort();
            }
            if let Some(conn) = self.dispatcher.detach(player) {
                if let Err(e) = conn.close().await {
                    tracing::debug!(%player, error = %e, "close failed");
                }
            }
        }
    }

    fn with_context<R>(&mut self, f: impl FnOnce(&mut E::State, &mut MatchContext<'_>) -> R) -> R {
        let roster = self.registry.connected();
        let mut ctx = MatchContext::new(&mut self.phase, &roster);
        f(&mut self.state, &mut ctx)
    }

    async fn deliver(&mut self, outbox: Outbox<E::ServerMessage>, now: Instant) {
        self.dispatcher.deliver(&mut self.registry, outbox, now).await;
    }

    async fn send_error(&mut self, player: PlayerId, message: String, now: Instant) {
        let error = SystemMessage::Error { message };
        self.dispatcher
            .unicast(&mut self.registry, player, &error, Delivery::Tracked, now)
            .await;
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> MatchState {
        self.phase
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &E::State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use skirmish_protocol::JsonCodec;
    use skirmish_rules::duel::DuelerState;
    use skirmish_rules::{Duel, World, WorldConfig};

    use super::*;
    use crate::testing::MockConnection;

    struct Harness<E: RuleEngine> {
        reactor: Reactor<E, MockConnection, JsonCodec>,
        conns: Vec<MockConnection>,
        start: Instant,
        next_id: u64,
    }

    impl<E: RuleEngine> Harness<E> {
        fn new(engine_config: E::Config, config: MatchConfig) -> Self {
            let start = Instant::now();
            let reliability = ReliabilityConfig::default();
            let (reactor, _rx) = Reactor::new(&engine_config, config, reliability, JsonCodec, start);
            Self {
                reactor,
                conns: Vec::new(),
                start,
                next_id: 0,
            }
        }

        fn at(&self, secs: u64) -> Instant {
            self.start + Duration::from_secs(secs)
        }

        async fn connect(&mut self, secs: u64) -> MockConnection {
            let conn = MockConnection::new(self.next_id);
            self.next_id += 1;
            self.conns.push(conn.clone());
            let now = self.at(secs);
            self.reactor.on_accept(conn.clone(), now).await;
            conn
        }

        async fn send(&mut self, player: u8, body: serde_json::Value, secs: u64) -> Flow {
            let player = PlayerId(player);
            let conn_id = self.reactor.registry().connection_id(player).unwrap();
            let event = InboundEvent::Frame {
                player,
                conn_id,
                bytes: serde_json::to_vec(&body).unwrap(),
            };
            let now = self.at(secs);
            self.reactor.on_inbound(event, now).await
        }

        async fn raw(&mut self, player: u8, bytes: &[u8], secs: u64) -> Flow {
            let player = PlayerId(player);
            let conn_id = self.reactor.registry().connection_id(player).unwrap();
            let event = InboundEvent::Frame {
                player,
                conn_id,
                bytes: bytes.to_vec(),
            };
            let now = self.at(secs);
            self.reactor.on_inbound(event, now).await
        }

        async fn tick(&mut self, secs: u64) -> Flow {
            let now = self.at(secs);
            self.reactor.on_tick(now).await
        }
    }

    fn duel() -> Harness<Duel> {
        Harness::new((), Duel::match_config())
    }

    fn last(conn: &MockConnection) -> serde_json::Value {
        conn.sent_json().pop().unwrap_or_default()
    }

    /// Both players connected and both secrets set: 123 for P0, 456 for P1.
    async fn active_duel() -> Harness<Duel> {
        let mut h = duel();
        h.connect(0).await;
        h.connect(0).await;
        h.send(0, json!({"action":"set_number","number":"123"}), 1).await;
        h.send(1, json!({"action":"set_number","number":"456"}), 1).await;
        h
    }

    // =====================================================================
    // on_accept()
    // =====================================================================

    #[tokio::test]
    async fn test_on_accept_assigns_lowest_id_and_waits() {
        let mut h = duel();
        let conn = h.connect(0).await;
        assert_eq!(conn.actions(), vec!["assign_id", "wait_player"]);
        assert_eq!(conn.sent_json()[0]["player_id"], 0);
        assert_eq!(h.reactor.phase(), MatchState::Waiting);
    }

    #[tokio::test]
    async fn test_on_accept_second_player_starts_match() {
        let mut h = duel();
        let first = h.connect(0).await;
        let second = h.connect(0).await;

        assert_eq!(second.sent_json()[0]["player_id"], 1);
        assert_eq!(last(&first)["action"], "game_start");
        assert_eq!(last(&second)["action"], "game_start");
        assert_eq!(h.reactor.phase(), MatchState::Setup);
    }

    #[tokio::test]
    async fn test_on_accept_full_during_match_refused() {
        let mut h = duel();
        h.connect(0).await;
        h.connect(0).await;
        let third = h.connect(0).await;

        assert_eq!(third.sent_json(), vec![json!({"action":"error","message":"match in progress, try again later"})]);
        assert!(third.is_closed());
        assert_eq!(h.reactor.registry().connected_count(), 2);
    }

    #[tokio::test]
    async fn test_on_accept_full_while_waiting_says_server_full() {
        let config = MatchConfig {
            capacity: 1,
            required_players: 2,
            ..Duel::match_config()
        };
        let mut h = Harness::<Duel>::new((), config);
        h.connect(0).await;
        let second = h.connect(0).await;
        assert_eq!(last(&second)["message"], "server full");
    }

    // =====================================================================
    // on_inbound()
    // =====================================================================

    #[tokio::test]
    async fn test_on_inbound_rule_rejection_replies_error_without_change() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        h.connect(0).await;

        h.send(0, json!({"action":"set_number","number":"112"}), 1).await;
        assert_eq!(last(&p0)["action"], "error");
        let dueler = h.reactor.state().dueler(PlayerId(0)).unwrap();
        assert_eq!(dueler.state, DuelerState::Setting);
    }

    #[tokio::test]
    async fn test_on_inbound_malformed_message_reported() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        h.send(0, json!({"action":"guess"}), 1).await;
        assert_eq!(last(&p0)["action"], "error");
        assert_eq!(h.reactor.registry().connected_count(), 1);
    }

    #[tokio::test]
    async fn test_on_inbound_unreadable_frame_closes_connection() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        h.raw(0, b"not json", 1).await;
        assert!(p0.is_closed());
        assert!(!h.reactor.registry().is_connected(PlayerId(0)));
    }

    #[tokio::test]
    async fn test_on_inbound_heartbeat_refreshes_activity_only() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        let before = p0.attempts();
        h.send(0, json!({"action":"heartbeat"}), 20).await;

        assert_eq!(p0.attempts(), before);
        let slot = h.reactor.registry().get(PlayerId(0)).unwrap();
        assert_eq!(slot.last_activity, h.at(20));
    }

    #[tokio::test]
    async fn test_on_inbound_event_from_old_connection_ignored() {
        let mut h = duel();
        h.connect(0).await;
        let stale = InboundEvent::Closed {
            player: PlayerId(0),
            conn_id: ConnectionId::new(999),
            reason: "old".into(),
        };
        let now = h.at(1);
        h.reactor.on_inbound(stale, now).await;
        assert!(h.reactor.registry().is_connected(PlayerId(0)));
    }

    #[tokio::test]
    async fn test_on_inbound_closed_mid_match_awards_opponent() {
        let mut h = active_duel().await;
        let conn_id = h.reactor.registry().connection_id(PlayerId(0)).unwrap();
        let closed = InboundEvent::Closed {
            player: PlayerId(0),
            conn_id,
            reason: "eof".into(),
        };
        let now = h.at(2);
        h.reactor.on_inbound(closed, now).await;

        let p1 = &h.conns[1];
        assert_eq!(last(p1)["action"], "game_over");
        assert_eq!(last(p1)["result"], "victory");
        assert_eq!(h.reactor.phase(), MatchState::Waiting);
        assert!(h.conns[0].is_closed());
    }

    #[tokio::test]
    async fn test_released_slot_reused_by_next_connection() {
        let mut h = duel();
        h.connect(0).await;
        h.connect(0).await;
        h.raw(0, b"{}", 1).await;

        let third = h.connect(2).await;
        assert_eq!(third.sent_json()[0], json!({"action":"assign_id","player_id":0}));
    }

    // =====================================================================
    // on_tick()
    // =====================================================================

    #[tokio::test]
    async fn test_on_tick_heartbeat_does_not_refresh_activity() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        h.tick(10).await;

        assert_eq!(last(&p0), json!({"action":"heartbeat","timestamp":10000}));
        let slot = h.reactor.registry().get(PlayerId(0)).unwrap();
        assert_eq!(slot.last_activity, h.at(0));
    }

    #[tokio::test]
    async fn test_on_tick_silent_participant_times_out() {
        let mut h = duel();
        let p0 = h.connect(0).await;
        let p1 = h.connect(0).await;
        h.send(1, json!({"action":"heartbeat"}), 25).await;

        h.tick(31).await;
        assert!(p0.is_closed());
        assert!(!h.reactor.registry().is_connected(PlayerId(0)));
        assert!(p1.actions().contains(&"timeout".to_string()));
        assert!(h.reactor.registry().is_connected(PlayerId(1)));
    }

    #[tokio::test]
    async fn test_on_tick_at_exact_timeout_keeps_participant() {
        let mut h = duel();
        h.connect(0).await;
        h.tick(30).await;
        assert!(h.reactor.registry().is_connected(PlayerId(0)));
    }

    #[tokio::test]
    async fn test_unreachable_participant_evicted_after_three_failures() {
        let mut h = duel();
        h.connect(0).await;
        let p1 = h.connect(0).await;
        p1.fail_sends(true);

        for i in 0..3 {
            h.send(0, json!({"action":"heartbeat"}), i).await;
            h.tick(10 * (i + 1)).await;
        }
        assert!(p1.is_closed());
        assert!(!h.reactor.registry().is_connected(PlayerId(1)));
        assert_eq!(h.reactor.phase(), MatchState::Waiting);
    }

    // =====================================================================
    // Match flow
    // =====================================================================

    #[tokio::test]
    async fn test_duel_win_then_rearm_starts_new_match() {
        let mut h = active_duel().await;
        assert_eq!(h.reactor.phase(), MatchState::Active);

        h.send(0, json!({"action":"guess","guess":"456"}), 2).await;
        assert_eq!(h.reactor.phase(), MatchState::Finished);
        assert_eq!(last(&h.conns[0])["result"], "victory");
        assert_eq!(last(&h.conns[1])["result"], "defeat");

        h.tick(4).await;
        assert_eq!(h.reactor.phase(), MatchState::Finished);

        h.tick(7).await;
        assert_eq!(h.reactor.phase(), MatchState::Setup);
        assert_eq!(last(&h.conns[0])["action"], "game_start");
        assert!(h.reactor.state().dueler(PlayerId(0)).unwrap().secret.is_none());
    }

    #[tokio::test]
    async fn test_duel_guess_out_of_turn_rejected() {
        let mut h = active_duel().await;
        h.send(1, json!({"action":"guess","guess":"123"}), 2).await;
        assert_eq!(last(&h.conns[1]), json!({"action":"error","message":"not your turn"}));
    }

    #[tokio::test]
    async fn test_world_halts_when_one_base_left() {
        let engine = WorldConfig {
            resource_percent: 0,
            seed: Some(5),
            ..WorldConfig::default()
        };
        let mut h = Harness::<World>::new(engine, World::match_config());
        h.connect(0).await;
        h.connect(0).await;
        h.send(0, json!({"action":"command","type":1,"payload":{"x":1,"y":1}}), 1).await;
        h.send(1, json!({"action":"command","type":1,"payload":{"x":9,"y":9}}), 1).await;
        assert_eq!(h.tick(1).await, Flow::Continue);
        assert_eq!(h.reactor.phase(), MatchState::Active);

        h.raw(1, b"\xff", 2).await;
        assert_eq!(h.tick(2).await, Flow::Halt);
        assert_eq!(last(&h.conns[0]), json!({"action":"game_over","result":"victory","winner":0}));
    }

    #[tokio::test]
    async fn test_world_malformed_message_not_reported() {
        let mut h = Harness::<World>::new(WorldConfig::default(), World::match_config());
        let p0 = h.connect(0).await;
        let before = p0.sent_json().len();
        h.send(0, json!({"action":"country","country":"three"}), 1).await;
        assert_eq!(p0.sent_json().len(), before);
        assert!(h.reactor.registry().is_connected(PlayerId(0)));
    }

    // =====================================================================
    // shutdown()
    // =====================================================================

    #[tokio::test]
    async fn test_shutdown_failed_close_still_closes_the_rest() {
        let mut h = active_duel().await;
        h.conns[0].fail_close();
        h.reactor.shutdown().await;

        assert!(h.conns[0].is_closed());
        assert!(h.conns[1].is_closed());
        assert!(h.reactor.dispatcher.detach(PlayerId(0)).is_none());
        assert!(h.reactor.dispatcher.detach(PlayerId(1)).is_none());
    }
}
