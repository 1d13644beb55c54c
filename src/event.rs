//! The engine's event surface: an explicit sum type pushed through an
//! `EventSink`, replacing the teacher's stringly-typed `GameEvent` +
//! SSE broadcast channel (`infrastructure/app_state.rs::broadcast_event`)
//! with a typed enum and a plain trait object - there is no network layer
//! here for events to cross.

use serde::{Deserialize, Serialize};

use crate::classify::PlayInfo;

pub type Seat = u8;
pub type Team = u8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    HandChanged { seat: Seat },
    LastPlayUpdated { seat: Seat, play: Option<PlayInfo> },
    TrickCleared,
    TurnChanged { seat: Seat },
    PlayerTurnStart { seat: Seat },
    PlayerFinished { seat: Seat, place: u8 },
    PlayerReported { seat: Seat, remaining: usize },
    DealFinished { placements: Vec<Seat> },
    MatchFinished { winning_team: Team },
    TributeRequested { seat: Seat, is_return: bool },
    TributeSettled { payer: Seat, receiver: Seat, card: crate::card::Card, is_return: bool },
    TributeResisted { seat: Seat },
}

/// Receives events emitted by the engine, in emission order. The engine
/// never inspects what a sink does with an event - matching the teacher's
/// one-way `broadcast_event` call, minus the broadcast channel.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Default sink: buffers everything, for tests and the demo binary.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Logs each event at `info` and forwards nothing - for callers that only
/// want `tracing` output, matching the teacher's SSE debug-log style
/// (`tracing::debug!("SSE broadcasting event: {:?}", ...)`).
#[derive(Debug, Default)]
pub struct LoggingSink;

impl EventSink for LoggingSink {
    fn emit(&mut self, event: Event) {
        tracing::info!(?event, "engine event");
    }
}
