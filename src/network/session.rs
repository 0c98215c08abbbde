//! Authority Session
//!
//! Runs one [`Authority`] as a single task on a fixed-rate tick. Everything
//! else talks to it through channels:
//!
//! - Requests arrive on one bounded queue and are applied at the next tick
//!   boundary, each with a one-shot reply.
//! - Records are fanned out to subscribers on unbounded queues filtered by
//!   topic, so a slow mirror never stalls the tick.
//! - A new subscriber receives a full snapshot before any record.
//! - A dropped connection handle detaches on its own through a separate
//!   unbounded queue, so a full request queue cannot lose it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::clock::Seconds;
use crate::game::authority::{Authority, Intent};
use crate::game::config::{override_with, ConfigError};
use crate::game::events::TopicSet;
use crate::game::phase::MatchOutcome;
use crate::game::state::ConnectionId;
use crate::network::mirror::MirrorState;
use crate::network::protocol::{ClientMessage, ServerMessage};

// =============================================================================
// CONFIG
// =============================================================================

/// Session loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Ticks per second.
    pub tick_rate: u32,
    /// Seconds between clock-sync messages.
    pub clock_sync_interval: Seconds,
    /// Capacity of the request queue.
    pub request_queue: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            clock_sync_interval: 1.0,
            request_queue: 1024,
        }
    }
}

impl SessionConfig {
    /// Defaults with overrides from `SESSION_TICK_RATE`, `SESSION_CLOCK_SYNC_SECONDS`
    /// and `SESSION_REQUEST_QUEUE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        override_with(&lookup, "SESSION_TICK_RATE", &mut config.tick_rate)?;
        override_with(&lookup, "SESSION_CLOCK_SYNC_SECONDS", &mut config.clock_sync_interval)?;
        override_with(&lookup, "SESSION_REQUEST_QUEUE", &mut config.request_queue)?;
        Ok(config)
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err(ConfigError::Invalid {
                field: "tick_rate",
                reason: "must be between 1 and 1000",
            });
        }
        if !self.clock_sync_interval.is_finite() || self.clock_sync_interval <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "clock_sync_interval",
                reason: "must be a positive number of seconds",
            });
        }
        if self.request_queue == 0 {
            return Err(ConfigError::Invalid {
                field: "request_queue",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Fixed step in seconds.
    pub fn dt(&self) -> Seconds {
        1.0 / f64::from(self.tick_rate.max(1))
    }

    /// Ticks between clock-sync messages.
    pub fn clock_sync_ticks(&self) -> u64 {
        (self.clock_sync_interval * f64::from(self.tick_rate)).round().max(1.0) as u64
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Operator commands. Connections cannot send these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdminCommand {
    /// Skip the mask quorum and start the ready countdown.
    ForceStart,
    /// Back to Lobby for a new match.
    ResetMatch,
    /// End the match now.
    EndMatch(MatchOutcome),
    /// Eliminate a Survivor.
    Eliminate(ConnectionId),
    /// Add to the shared faction score.
    AddFactionScore(u32),
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The authority task is gone.
    #[error("authority session closed")]
    Closed,

    /// The request queue is full; retry on a later tick.
    #[error("request queue full")]
    QueueFull,

    /// The connection id is already attached.
    #[error("connection {0} already attached")]
    AlreadyAttached(ConnectionId),
}

enum Command {
    Attach {
        id: ConnectionId,
        name: Option<String>,
        reply: oneshot::Sender<bool>,
    },
    Intent {
        connection: ConnectionId,
        intent: Intent,
        reply: oneshot::Sender<bool>,
    },
    Time {
        reply: oneshot::Sender<Seconds>,
    },
    Subscribe {
        topics: TopicSet,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    Admin {
        command: AdminCommand,
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

struct Subscriber {
    topics: TopicSet,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Subscriber {
    /// False once the receiving side is gone.
    fn deliver(&self, msg: &ServerMessage) -> bool {
        if !self.topics.contains(msg.topic()) {
            return true;
        }
        self.sender.send(msg.clone()).is_ok()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Owner of the authority and its tick loop.
pub struct AuthoritySession {
    authority: Authority,
    config: SessionConfig,
    commands: mpsc::Receiver<Command>,
    detaches: mpsc::UnboundedReceiver<ConnectionId>,
    subscribers: Vec<Subscriber>,
    joining: Vec<Subscriber>,
    resend: Vec<ServerMessage>,
    running: bool,
}

impl AuthoritySession {
    /// Wrap an authority. The handle is the only way in.
    pub fn new(authority: Authority, config: SessionConfig) -> (Self, AuthorityHandle) {
        let (tx, rx) = mpsc::channel(config.request_queue.max(1));
        let (detach_tx, detach_rx) = mpsc::unbounded_channel();
        let session = Self {
            authority,
            config,
            commands: rx,
            detaches: detach_rx,
            subscribers: Vec::new(),
            joining: Vec::new(),
            resend: Vec::new(),
            running: true,
        };
        let handle = AuthorityHandle {
            commands: tx,
            detaches: detach_tx,
        };
        (session, handle)
    }

    /// The authority, read-only.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len() + self.joining.len()
    }

    /// Run one tick: apply queued commands, advance, fan out.
    ///
    /// Returns false once shut down or once every handle is gone.
    pub fn step(&mut self) -> bool {
        self.drain_commands();
        if !self.running {
            return false;
        }

        let result = self.authority.tick(self.config.dt());

        // Match-end messages go out once more, one tick after the first send
        let mut outgoing = std::mem::take(&mut self.resend);
        for event in result.events {
            let msg = ServerMessage::from_event(event);
            if matches!(msg, ServerMessage::MatchEnded { .. }) {
                self.resend.push(msg.clone());
            }
            outgoing.push(msg);
        }
        let tick = self.authority.clock().tick();
        if tick % self.config.clock_sync_ticks() == 0 {
            outgoing.push(ServerMessage::clock_sync(self.authority.now(), tick));
        }
        self.fan_out(&outgoing);

        // Late joiners start from a snapshot taken after this tick's records
        if !self.joining.is_empty() {
            let snapshot = ServerMessage::Snapshot(Box::new(self.authority.snapshot()));
            for sub in self.joining.drain(..) {
                if sub.sender.send(snapshot.clone()).is_ok() {
                    self.subscribers.push(sub);
                }
            }
        }
        true
    }

    /// Tick at the configured rate until shut down; hands the authority back.
    pub async fn run(mut self) -> Authority {
        let period = Duration::from_secs_f64(self.config.dt());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_rate = self.config.tick_rate,
            match_id = %hex::encode(&self.authority.match_id()[..4]),
            "authority session started"
        );

        loop {
            ticker.tick().await;
            if !self.step() {
                break;
            }
        }

        info!(
            ticks = self.authority.clock().tick(),
            phase = ?self.authority.phase(),
            "authority session stopped"
        );
        self.authority
    }

    fn drain_commands(&mut self) {
        while let Ok(id) = self.detaches.try_recv() {
            if self.authority.detach(&id) {
                debug!(connection = %id, "connection handle released");
            }
        }
        loop {
            let command = match self.commands.try_recv() {
                Ok(command) => command,
                Err(mpsc::error::TryRecvError::Empty) => return,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if self.running {
                        debug!("all handles dropped");
                    }
                    self.running = false;
                    return;
                }
            };
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Attach { id, name, reply } => {
                let ok = self.authority.attach(id, name.as_deref());
                let _ = reply.send(ok);
            }
            Command::Intent {
                connection,
                intent,
                reply,
            } => {
                let ok = self.authority.request(connection, &intent);
                let _ = reply.send(ok);
            }
            Command::Time { reply } => {
                let _ = reply.send(self.authority.now());
            }
            Command::Subscribe { topics, sender } => {
                debug!(subscribers = self.subscribers.len() + 1, "subscriber joined");
                self.joining.push(Subscriber { topics, sender });
            }
            Command::Admin { command, reply } => {
                info!(command = ?command, "admin command");
                let ok = match command {
                    AdminCommand::ForceStart => self.authority.force_start(),
                    AdminCommand::ResetMatch => {
                        self.authority.reset_match();
                        true
                    }
                    AdminCommand::EndMatch(outcome) => self.authority.end_match(outcome),
                    AdminCommand::Eliminate(id) => self.authority.eliminate(id),
                    AdminCommand::AddFactionScore(points) => {
                        self.authority.add_faction_score(points);
                        points > 0
                    }
                };
                let _ = reply.send(ok);
            }
            Command::Shutdown => self.running = false,
        }
    }

    fn fan_out(&mut self, messages: &[ServerMessage]) {
        if messages.is_empty() {
            return;
        }
        let before = self.subscribers.len();
        self.subscribers
            .retain(|sub| messages.iter().all(|msg| sub.deliver(msg)));
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            debug!(dropped, remaining = self.subscribers.len(), "subscribers gone");
        }
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Cloneable entry point to a running session.
#[derive(Clone)]
pub struct AuthorityHandle {
    commands: mpsc::Sender<Command>,
    detaches: mpsc::UnboundedSender<ConnectionId>,
}

impl AuthorityHandle {
    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).await.map_err(|_| SessionError::Closed)
    }

    /// Attach a new connection with a fresh id.
    pub async fn attach(&self, name: Option<&str>) -> Result<ConnectionHandle, SessionError> {
        self.attach_with_id(ConnectionId::random(), name).await
    }

    /// Attach a connection under a known id.
    pub async fn attach_with_id(
        &self,
        id: ConnectionId,
        name: Option<&str>,
    ) -> Result<ConnectionHandle, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Attach {
            id,
            name: name.map(str::to_owned),
            reply,
        })
        .await?;
        if !rx.await.map_err(|_| SessionError::Closed)? {
            return Err(SessionError::AlreadyAttached(id));
        }
        Ok(ConnectionHandle {
            id,
            commands: self.commands.clone(),
            detaches: self.detaches.clone(),
            attached: true,
        })
    }

    /// Subscribe to records on `topics`. The first message is a snapshot.
    pub async fn subscribe(&self, topics: TopicSet) -> Result<MirrorFeed, SessionError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.send(Command::Subscribe { topics, sender }).await?;
        Ok(MirrorFeed {
            receiver,
            mirror: MirrorState::new(),
            epoch: Instant::now(),
        })
    }

    /// Run an operator command; true if it changed anything.
    pub async fn admin(&self, command: AdminCommand) -> Result<bool, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Admin { command, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Stop the session after the current tick.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown).await
    }
}

/// One attached connection's view of the session.
///
/// Dropping the handle detaches the connection at the next tick boundary.
pub struct ConnectionHandle {
    id: ConnectionId,
    commands: mpsc::Sender<Command>,
    detaches: mpsc::UnboundedSender<ConnectionId>,
    attached: bool,
}

impl ConnectionHandle {
    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an intent; resolves with the decision after the next tick boundary.
    ///
    /// Fails fast with `QueueFull` instead of waiting for room.
    pub async fn request(&self, intent: Intent) -> Result<bool, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .try_send(Command::Intent {
                connection: self.id,
                intent,
                reply,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!(connection = %self.id, "request queue full");
                    SessionError::QueueFull
                }
                mpsc::error::TrySendError::Closed(_) => SessionError::Closed,
            })?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Answer a wire message from this connection.
    pub async fn handle(&self, msg: ClientMessage) -> Result<ServerMessage, SessionError> {
        match msg {
            ClientMessage::Intent { request_id, intent } => {
                let accepted = self.request(intent).await?;
                Ok(ServerMessage::IntentResult { request_id, accepted })
            }
            ClientMessage::Ping { client_time } => {
                let (reply, rx) = oneshot::channel();
                self.commands
                    .send(Command::Time { reply })
                    .await
                    .map_err(|_| SessionError::Closed)?;
                let server_time = rx.await.map_err(|_| SessionError::Closed)?;
                Ok(ServerMessage::Pong {
                    client_time,
                    server_time,
                })
            }
        }
    }

    /// Leave the match.
    pub fn detach(mut self) -> Result<(), SessionError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), SessionError> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        self.detaches.send(self.id).map_err(|_| SessionError::Closed)
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if self.release().is_err() {
            debug!(connection = %self.id, "session gone before detach");
        }
    }
}

/// Subscription that keeps a mirror replica up to date.
pub struct MirrorFeed {
    receiver: mpsc::UnboundedReceiver<ServerMessage>,
    mirror: MirrorState,
    epoch: Instant,
}

impl MirrorFeed {
    /// Wait for the next message and apply it. `None` once the session is gone.
    pub async fn next(&mut self) -> Option<ServerMessage> {
        let msg = self.receiver.recv().await?;
        self.mirror.apply(&msg, self.local_now());
        Some(msg)
    }

    /// Apply the next message if one is already queued.
    pub fn try_next(&mut self) -> Option<ServerMessage> {
        let msg = self.receiver.try_recv().ok()?;
        self.mirror.apply(&msg, self.local_now());
        Some(msg)
    }

    /// The replica.
    pub fn mirror(&self) -> &MirrorState {
        &self.mirror
    }

    /// Seconds since the subscription started.
    pub fn local_now(&self) -> Seconds {
        self.epoch.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::authority::fixtures::{config, id, playing};
    use crate::game::events::Topic;
    use crate::game::layer::Layer;
    use crate::game::phase::MatchPhase;

    fn drain(feed: &mut MirrorFeed) -> Vec<ServerMessage> {
        std::iter::from_fn(|| feed.try_next()).collect()
    }

    async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
        tokio::time::timeout(Duration::from_secs(5), fut)
            .await
            .expect("timed out")
    }

    /// Attach through the handle while stepping the session by hand.
    async fn attach_stepped(
        session: &mut AuthoritySession,
        handle: &AuthorityHandle,
        name: &str,
    ) -> ConnectionHandle {
        let (conn, _) = tokio::join!(handle.attach(Some(name)), async {
            tokio::task::yield_now().await;
            session.step();
        });
        conn.unwrap()
    }

    fn fast() -> SessionConfig {
        SessionConfig {
            tick_rate: 200,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_session_config() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clock_sync_ticks(), 30);

        let config = SessionConfig::from_lookup(|key| match key {
            "SESSION_TICK_RATE" => Some("60".into()),
            "SESSION_CLOCK_SYNC_SECONDS" => Some("0.5".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.clock_sync_ticks(), 30);

        let bad = SessionConfig {
            tick_rate: 0,
            ..SessionConfig::default()
        };
        assert!(bad.validate().is_err());
        assert!(SessionConfig::from_lookup(|_| Some("fast".into())).is_err());
    }

    #[tokio::test]
    async fn test_snapshot_precedes_records() {
        let (mut session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        let mut feed = handle.subscribe(TopicSet::all()).await.unwrap();

        assert!(session.step());
        let first = drain(&mut feed);
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0], ServerMessage::Snapshot(_)));

        assert!(session.step());
        let next = drain(&mut feed);
        assert!(next.iter().all(|m| matches!(m, ServerMessage::Record(_))));
        assert!(!next.is_empty());
        assert!(feed.mirror().is_consistent_with(&session.authority().view_hash()));
        assert!(feed.mirror().countdown_remaining() < 600.0);
    }

    #[tokio::test]
    async fn test_topic_filter() {
        let (mut session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        let mut feed = handle.subscribe(TopicSet::of(&[Topic::Layers])).await.unwrap();
        session.step();
        drain(&mut feed);

        session.authority.request_layer_transition(id(0), Layer::L1);
        for _ in 0..3 {
            session.step();
        }
        let msgs = drain(&mut feed);
        assert_eq!(msgs.len(), 1);
        assert!(msgs.iter().all(|m| m.topic() == Topic::Layers));
        assert_eq!(feed.mirror().layer_of(&id(0)), Some(Layer::L1));
    }

    #[tokio::test]
    async fn test_match_end_sent_twice() {
        let (mut session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        let mut feed = handle.subscribe(TopicSet::of(&[])).await.unwrap();
        session.step();
        drain(&mut feed);

        session.authority.end_match(MatchOutcome::CatcherWin);
        let mut ended = 0;
        for _ in 0..4 {
            session.step();
            ended += drain(&mut feed)
                .iter()
                .filter(|m| matches!(m, ServerMessage::MatchEnded { .. }))
                .count();
        }
        assert_eq!(ended, 2);
        assert_eq!(feed.mirror().outcome(), Some(MatchOutcome::CatcherWin));
        assert_eq!(feed.mirror().leaderboard().len(), 4);
    }

    #[tokio::test]
    async fn test_clock_sync_interval() {
        let session_config = SessionConfig {
            tick_rate: 10,
            clock_sync_interval: 0.5,
            ..SessionConfig::default()
        };
        let (mut session, handle) = AuthoritySession::new(playing(config()), session_config);
        let mut feed = handle.subscribe(TopicSet::of(&[Topic::Clock])).await.unwrap();
        session.step();
        drain(&mut feed);

        let mut syncs = 0;
        for _ in 0..10 {
            session.step();
            syncs += drain(&mut feed)
                .iter()
                .filter(|m| matches!(m, ServerMessage::ClockSync { .. }))
                .count();
        }
        assert_eq!(syncs, 2);
        assert!(feed.mirror().clock().is_synced());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_removed() {
        let (mut session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        let feed = handle.subscribe(TopicSet::all()).await.unwrap();
        session.step();
        assert_eq!(session.subscriber_count(), 1);
        drop(feed);
        session.step();
        assert_eq!(session.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_connection_handle_detaches() {
        let (mut session, handle) = AuthoritySession::new(Authority::new(config()), SessionConfig::default());
        let ghost = attach_stepped(&mut session, &handle, "ghost").await;
        let ghost_id = ghost.id();
        assert!(session.authority().connection(&ghost_id).is_some());

        drop(ghost);
        session.step();
        assert!(session.authority().connection(&ghost_id).is_none());
        assert_eq!(session.authority().roster().len(), 0);
    }

    #[tokio::test]
    async fn test_explicit_detach_sends_once() {
        let (mut session, handle) = AuthoritySession::new(Authority::new(config()), SessionConfig::default());
        let ann = attach_stepped(&mut session, &handle, "ann").await;
        let ann_id = ann.id();
        assert!(ann.detach().is_ok());
        session.step();
        assert!(session.authority().connection(&ann_id).is_none());
        assert!(session.detaches.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stops_when_handles_dropped() {
        let (mut session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        assert!(session.step());
        drop(handle);
        assert!(!session.step());
    }

    #[tokio::test]
    async fn test_live_loop() {
        let (session, handle) = AuthoritySession::new(
            Authority::with_match_id(config(), [5; 16]),
            fast(),
        );
        let task = tokio::spawn(session.run());

        let ann = within(handle.attach(Some("ann"))).await.unwrap();
        let bob = within(handle.attach(Some("bob"))).await.unwrap();
        let mut feed = within(handle.subscribe(TopicSet::all())).await.unwrap();

        assert!(within(ann.request(Intent::ClaimMask { mask: 0 })).await.unwrap());
        assert!(!within(bob.request(Intent::ClaimMask { mask: 0 })).await.unwrap());
        assert!(within(bob.request(Intent::ClaimMask { mask: 3 })).await.unwrap());
        assert!(!within(ann.request(Intent::LayerTransition { target: Layer::L1 }))
            .await
            .unwrap());

        assert!(within(handle.admin(AdminCommand::ForceStart)).await.unwrap());
        assert!(!within(handle.admin(AdminCommand::ForceStart)).await.unwrap());

        while feed.mirror().phase() != MatchPhase::ReadyCountdown {
            within(feed.next()).await.unwrap();
        }
        assert_eq!(feed.mirror().connections().count(), 2);

        let pong = within(ann.handle(ClientMessage::Ping { client_time: 9 })).await.unwrap();
        assert!(matches!(pong, ServerMessage::Pong { client_time: 9, .. }));

        let reply = within(bob.handle(ClientMessage::Intent {
            request_id: 4,
            intent: Intent::SetName { name: "rob".into() },
        }))
        .await
        .unwrap();
        assert_eq!(
            reply,
            ServerMessage::IntentResult {
                request_id: 4,
                accepted: true
            }
        );

        within(handle.shutdown()).await.unwrap();
        let authority = within(task).await.unwrap();
        assert_eq!(authority.phase(), MatchPhase::ReadyCountdown);
        assert_eq!(authority.connection(&bob.id()).unwrap().display_name, "rob");
    }

    #[tokio::test]
    async fn test_closed_session() {
        let (session, handle) = AuthoritySession::new(playing(config()), SessionConfig::default());
        drop(session);
        assert_eq!(handle.attach(None).await.err(), Some(SessionError::Closed));
        assert_eq!(
            handle.admin(AdminCommand::ForceStart).await,
            Err(SessionError::Closed)
        );
    }
}
