//! Wire Protocol
//!
//! Messages between connections and the authority.
//!
//! ## Encoding
//!
//! Messages are tagged JSON (`{"type": "...", ...}`). Full snapshots also
//! have a compact binary form for bulk transfer to late joiners.
//!
//! ## Message Flow
//!
//! ```text
//! Connection                          Authority
//!    |                                    |
//!    |-------- Intent {request_id} ------>|  applied at the next tick
//!    |<------- IntentResult --------------|
//!    |                                    |
//!    |<------- Snapshot ------------------|  once, on subscribe
//!    |<------- Record / ClockSync --------|  every tick, by topic
//!    |<------- MatchEnded ----------------|  sent twice
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::Seconds;
use crate::game::authority::Intent;
use crate::game::events::{GameEvent, GameEventData, Topic};
use crate::game::leaderboard;
use crate::game::snapshot::MatchSnapshot;

// =============================================================================
// CLIENT -> AUTHORITY
// =============================================================================

/// Messages from a connection to the authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A gameplay request. Answered with `IntentResult`.
    Intent {
        /// Echoed back in the result.
        request_id: u64,
        /// What the connection wants to do.
        intent: Intent,
    },

    /// Latency probe.
    Ping {
        /// Client timestamp, echoed back.
        client_time: u64,
    },
}

// =============================================================================
// AUTHORITY -> CLIENT
// =============================================================================

/// Messages from the authority to connections and mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// One change record.
    Record(GameEvent),

    /// Match over. The leaderboard is in its text encoding.
    MatchEnded {
        /// Authority tick of the end.
        tick: u64,
        /// `true` when the Chaser side won.
        catcher_win: bool,
        /// `name\tscore` lines.
        leaderboard: String,
    },

    /// Authority time sample for mirror clocks.
    ClockSync {
        /// Authority time.
        server_time: Seconds,
        /// Authority tick.
        tick: u64,
        /// Wall clock at send time.
        wall_clock: DateTime<Utc>,
    },

    /// Full state, sent before any incremental record.
    Snapshot(Box<MatchSnapshot>),

    /// Decision on an intent.
    IntentResult {
        /// Request identifier from the intent.
        request_id: u64,
        /// Accepted or silently rejected.
        accepted: bool,
    },

    /// Reply to a ping.
    Pong {
        /// Client timestamp from the ping.
        client_time: u64,
        /// Authority time.
        server_time: Seconds,
    },
}

impl ServerMessage {
    /// Wrap a change record. Match-end records use the dedicated message.
    pub fn from_event(event: GameEvent) -> Self {
        match event.data {
            GameEventData::MatchEnded {
                outcome,
                leaderboard: entries,
            } => ServerMessage::MatchEnded {
                tick: event.tick,
                catcher_win: outcome.catcher_win(),
                leaderboard: leaderboard::encode(&entries),
            },
            _ => ServerMessage::Record(event),
        }
    }

    /// Clock sample stamped with the current wall time.
    pub fn clock_sync(server_time: Seconds, tick: u64) -> Self {
        ServerMessage::ClockSync {
            server_time,
            tick,
            wall_clock: Utc::now(),
        }
    }

    /// Topic used to filter fan-out.
    pub fn topic(&self) -> Topic {
        match self {
            ServerMessage::Record(event) => event.topic(),
            ServerMessage::ClockSync { .. } | ServerMessage::Pong { .. } => Topic::Clock,
            ServerMessage::MatchEnded { .. }
            | ServerMessage::Snapshot(_)
            | ServerMessage::IntentResult { .. } => Topic::Match,
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl MatchSnapshot {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::authority::fixtures::{config, id, playing};
    use crate::game::layer::Layer;
    use crate::game::leaderboard::LeaderboardEntry;
    use crate::game::phase::{MatchOutcome, MatchPhase};

    #[test]
    fn test_client_message_json_roundtrip() {
        let msg = ClientMessage::Intent {
            request_id: 7,
            intent: Intent::LayerTransition { target: Layer::L2 },
        };

        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"intent\""));
        let parsed = ClientMessage::from_json(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_client_message_from_text() {
        let text = r#"{"type":"intent","request_id":1,"intent":{"intent":"claim_mask","mask":3}}"#;
        match ClientMessage::from_json(text).unwrap() {
            ClientMessage::Intent { request_id, intent } => {
                assert_eq!(request_id, 1);
                assert_eq!(intent, Intent::ClaimMask { mask: 3 });
            }
            other => panic!("Wrong message type: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_json_roundtrip() {
        let msg = ServerMessage::Record(GameEvent::new(
            12,
            0.4,
            GameEventData::PhaseChanged {
                old_phase: MatchPhase::ReadyCountdown,
                new_phase: MatchPhase::Playing,
            },
        ));

        let json = msg.to_json().unwrap();
        let parsed = ServerMessage::from_json(&json).unwrap();
        assert_eq!(parsed, msg);
        assert_eq!(parsed.topic(), Topic::Phase);
    }

    #[test]
    fn test_match_ended_uses_text_leaderboard() {
        let event = GameEvent::new(
            40,
            2.0,
            GameEventData::MatchEnded {
                outcome: MatchOutcome::CatcherWin,
                leaderboard: vec![LeaderboardEntry::new("a\tb", 30), LeaderboardEntry::new("c", 10)],
            },
        );
        match ServerMessage::from_event(event) {
            ServerMessage::MatchEnded {
                tick,
                catcher_win,
                leaderboard,
            } => {
                assert_eq!(tick, 40);
                assert!(catcher_win);
                assert_eq!(leaderboard, "a b\t30\nc\t10");
            }
            other => panic!("Wrong message type: {other:?}"),
        }
    }

    #[test]
    fn test_clock_sync_json() {
        let msg = ServerMessage::clock_sync(3.5, 105);
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "clock_sync");
        assert_eq!(json["server_time"], 3.5);
        assert!(json["wall_clock"].is_string());
        assert_eq!(msg.topic(), Topic::Clock);
    }

    #[test]
    fn test_snapshot_binary_roundtrip() {
        let auth = playing(config());
        let snapshot = auth.snapshot();
        let bytes = snapshot.to_bytes().unwrap();
        let parsed = MatchSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.connections.len(), 4);
        assert_eq!(parsed.connections[0].id, id(0));
    }

    #[test]
    fn test_snapshot_message_json() {
        let auth = playing(config());
        let msg = ServerMessage::Snapshot(Box::new(auth.snapshot()));
        let parsed = ServerMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed, msg);
    }
}
