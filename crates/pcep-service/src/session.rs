// Copyright (C) 2024-present The Pced Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-connection PCEP session state machine.
//!
//! The session is deliberately free of any I/O; it consumes decoded
//! [`PcepMessage`]s and tells the caller what to send or deliver. The server
//! loop in [crate::server] owns the socket, the keepalive timer and the dead
//! timer.

use std::{
    fmt::{Display, Formatter},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use pcep_pkt::{ErrorObject, OpenMessage, OpenObject, PcepMessage, StateReportMessage};
use serde::{Deserialize, Serialize};

/// CLOSE object reason: DeadTimer expired
pub const CLOSE_REASON_DEAD_TIMER_EXPIRED: u8 = 2;

/// PCEP-ERROR Error-Type: PCEP session establishment failure
pub const ERROR_TYPE_SESSION_ESTABLISHMENT_FAILURE: u8 = 1;

/// PCEP-ERROR Error-value: reception of an invalid Open message or a non
/// Open message
pub const ERROR_VALUE_INVALID_OPEN: u8 = 1;

/// Handshake progress of a PCEP session.
///
/// ```text
/// NotInitialized --Open received--> OpenSent --our Open emitted--> Established
/// ```
///
/// The session is established as soon as our Open is on the wire; a PCC may
/// follow its Open with a state report immediately, without sending a
/// Keepalive first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    NotInitialized,
    OpenSent,
    Established,
}

impl Display for SessionPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What the server loop should do after feeding a message to the session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SessionAction {
    /// Send our Open back to the PCC, then mark the session established and
    /// start the keepalive cadence.
    SendOpen(OpenMessage),
    /// Hand the state report to the consuming service.
    DeliverReport(StateReportMessage),
    /// Message needs no reaction (keepalives, unparsed message types).
    Ignore,
    /// The peer closed the session.
    Closed,
}

/// Protocol violation that terminates the session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionError {
    UnexpectedMessage {
        phase: SessionPhase,
        message_type: u8,
    },
}

impl SessionError {
    /// The PCEP-ERROR object reported to the peer before closing.
    pub const fn error_object(&self) -> ErrorObject {
        ErrorObject::new(
            ERROR_TYPE_SESSION_ESTABLISHMENT_FAILURE,
            ERROR_VALUE_INVALID_OPEN,
        )
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedMessage {
                phase,
                message_type,
            } => {
                write!(
                    f,
                    "unexpected message type {message_type} in session phase {phase}"
                )
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// State machine for one PCC-facing session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PcepSession {
    session_id: u8,
    local_keepalive: u8,
    phase: SessionPhase,
    peer_open: Option<OpenObject>,
}

impl PcepSession {
    pub const fn new(local_keepalive: u8, session_id: u8) -> Self {
        Self {
            session_id,
            local_keepalive,
            phase: SessionPhase::NotInitialized,
            peer_open: None,
        }
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn session_id(&self) -> u8 {
        self.session_id
    }

    pub const fn peer_open(&self) -> Option<&OpenObject> {
        self.peer_open.as_ref()
    }

    /// True once the peer advertised the Stateful PCE Capability TLV with
    /// Update-Capability.
    pub fn peer_update_capable(&self) -> bool {
        self.peer_open
            .as_ref()
            .map(OpenObject::update_capable)
            .unwrap_or(false)
    }

    /// Cadence for keepalives we send: the peer's advertised timer, falling
    /// back to our own. `None` when both sides disabled keepalives.
    pub fn keepalive_interval(&self) -> Option<Duration> {
        let peer = self
            .peer_open
            .as_ref()
            .map(OpenObject::keepalive)
            .unwrap_or(0);
        let secs = if peer > 0 { peer } else { self.local_keepalive };
        (secs > 0).then(|| Duration::from_secs(u64::from(secs)))
    }

    /// How long we wait for any message from the peer before declaring the
    /// session dead. The peer's DeadTimer, falling back to four times our
    /// keepalive timer.
    pub fn dead_timer(&self) -> Option<Duration> {
        let peer = self
            .peer_open
            .as_ref()
            .map(OpenObject::dead_timer)
            .unwrap_or(0);
        let secs = if peer > 0 {
            peer
        } else {
            self.local_keepalive.saturating_mul(4)
        };
        (secs > 0).then(|| Duration::from_secs(u64::from(secs)))
    }

    /// Mark the session established once our Open reply is on the wire. The
    /// server calls this right after acting on [`SessionAction::SendOpen`].
    pub fn establish(&mut self) {
        if self.phase == SessionPhase::OpenSent {
            self.phase = SessionPhase::Established;
        }
    }

    /// Advance the state machine with a decoded message from the peer.
    pub fn on_message(&mut self, msg: &PcepMessage) -> Result<SessionAction, SessionError> {
        match (self.phase, msg) {
            (_, PcepMessage::Close(_)) => {
                self.phase = SessionPhase::NotInitialized;
                Ok(SessionAction::Closed)
            }
            (SessionPhase::NotInitialized, PcepMessage::Open(open_msg)) => {
                self.peer_open = Some(open_msg.open().clone());
                self.phase = SessionPhase::OpenSent;
                Ok(SessionAction::SendOpen(OpenMessage::stateful(
                    self.local_keepalive,
                    self.session_id,
                )))
            }
            // Keepalives refresh the dead timer but need no reaction
            (SessionPhase::OpenSent | SessionPhase::Established, PcepMessage::Keepalive) => {
                Ok(SessionAction::Ignore)
            }
            (SessionPhase::Established, PcepMessage::StateReport(report)) => {
                Ok(SessionAction::DeliverReport(report.clone()))
            }
            // Recognized but not acted upon by a stateful PCE
            (
                SessionPhase::Established,
                PcepMessage::PathComputationRequest(_)
                | PcepMessage::PathComputationReply(_)
                | PcepMessage::Notification(_)
                | PcepMessage::Error(_),
            ) => Ok(SessionAction::Ignore),
            (_, PcepMessage::Unimplemented(_)) => Ok(SessionAction::Ignore),
            (phase, msg) => Err(SessionError::UnexpectedMessage {
                phase,
                message_type: msg.message_type_code(),
            }),
        }
    }
}

/// Hands out SID values for the Open objects of new sessions: a free-running
/// counter taken modulo 255, shared across all accepted connections.
#[derive(Debug, Default)]
pub struct SessionIdAllocator {
    counter: AtomicU64,
}

impl SessionIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u8 {
        (self.counter.fetch_add(1, Ordering::SeqCst) % 255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcep_pkt::{CloseMessage, CloseObject, PcepObject};

    fn peer_open() -> PcepMessage {
        PcepMessage::Open(OpenMessage::stateful(30, 7))
    }

    #[test]
    fn test_handshake() {
        let mut session = PcepSession::new(30, 1);
        assert_eq!(session.phase(), SessionPhase::NotInitialized);

        let action = session.on_message(&peer_open()).unwrap();
        assert_eq!(
            action,
            SessionAction::SendOpen(OpenMessage::stateful(30, 1))
        );
        assert_eq!(session.phase(), SessionPhase::OpenSent);
        assert!(session.peer_update_capable());

        session.establish();
        assert_eq!(session.phase(), SessionPhase::Established);

        let action = session.on_message(&PcepMessage::Keepalive).unwrap();
        assert_eq!(action, SessionAction::Ignore);
    }

    #[test]
    fn test_timers_follow_peer_open() {
        let mut session = PcepSession::new(30, 1);
        assert_eq!(session.keepalive_interval(), Some(Duration::from_secs(30)));
        assert_eq!(session.dead_timer(), Some(Duration::from_secs(120)));

        session.on_message(&peer_open()).unwrap();
        assert_eq!(session.keepalive_interval(), Some(Duration::from_secs(30)));
        assert_eq!(session.dead_timer(), Some(Duration::from_secs(120)));

        let mut zero = PcepSession::new(0, 1);
        assert_eq!(zero.keepalive_interval(), None);
        assert_eq!(zero.dead_timer(), None);
        zero.on_message(&PcepMessage::Open(OpenMessage::stateful(10, 3)))
            .unwrap();
        assert_eq!(zero.keepalive_interval(), Some(Duration::from_secs(10)));
        assert_eq!(zero.dead_timer(), Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_report_before_establishment_is_rejected() {
        let mut session = PcepSession::new(30, 1);
        let report = PcepMessage::StateReport(StateReportMessage::new(vec![]));
        let err = session.on_message(&report).unwrap_err();
        assert_eq!(
            err,
            SessionError::UnexpectedMessage {
                phase: SessionPhase::NotInitialized,
                message_type: 10,
            }
        );
        assert_eq!(err.error_object().error_type(), 1);
    }

    #[test]
    fn test_double_open_is_rejected() {
        let mut session = PcepSession::new(30, 1);
        session.on_message(&peer_open()).unwrap();
        session.establish();
        let err = session.on_message(&peer_open()).unwrap_err();
        assert_eq!(
            err,
            SessionError::UnexpectedMessage {
                phase: SessionPhase::Established,
                message_type: 1,
            }
        );
    }

    #[test]
    fn test_report_delivered_without_peer_keepalive() {
        // A PCC may follow its Open with a state report directly; no
        // Keepalive from the peer is required to establish the session
        let mut session = PcepSession::new(30, 1);
        session.on_message(&peer_open()).unwrap();
        session.establish();

        let report = StateReportMessage::new(vec![]);
        let action = session
            .on_message(&PcepMessage::StateReport(report.clone()))
            .unwrap();
        assert_eq!(action, SessionAction::DeliverReport(report));
    }

    #[test]
    fn test_close_in_any_phase() {
        let close =
            PcepMessage::Close(CloseMessage::new(vec![PcepObject::Close(CloseObject::new(1))]));
        for setup in 0..3 {
            let mut session = PcepSession::new(30, 1);
            if setup >= 1 {
                session.on_message(&peer_open()).unwrap();
            }
            if setup >= 2 {
                session.establish();
            }
            assert_eq!(session.on_message(&close).unwrap(), SessionAction::Closed);
        }
    }

    #[test]
    fn test_session_id_allocation_wraps() {
        let allocator = SessionIdAllocator::new();
        for expected in 0..255u32 {
            assert_eq!(u32::from(allocator.next()), expected);
        }
        // The 256th session gets SID 0 again
        assert_eq!(allocator.next(), 0);
        assert_eq!(allocator.next(), 1);
    }
}
