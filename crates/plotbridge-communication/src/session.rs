//! Acknowledgement-paced device session
//!
//! The device's protocol does not support pipelining: at most one
//! command may be in flight (sent, unacknowledged) at any time. The
//! session is modeled as an explicit state machine driven by transport
//! events; the transition function is pure and independent of the I/O
//! layer, with `run_session` as the async driver.
//!
//! Lifecycle:
//! `Disconnected → Connecting → AwaitingReady → Sending → AwaitingAck
//! → {Sending | Erroring | Done} → Closed`

use crate::encoder::{CommandQueue, DeviceCommand};
use crate::transport::Transport;
use plotbridge_core::{Error, ProtocolError, Result, ValidationError};
use std::fmt;

/// States of the device session protocol machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport yet
    Disconnected,
    /// Opening the transport to the device
    Connecting,
    /// Transport open, waiting for the device's greeting
    AwaitingReady,
    /// Transmitting the next command
    Sending,
    /// Command sent, waiting for the device's acknowledgement
    AwaitingAck,
    /// Device reported a fault; remaining queue abandoned
    Erroring,
    /// The command cursor reached the end of the queue
    Done,
    /// Transport is closed; no further sends
    Closed,
}

impl SessionState {
    /// Whether the session has reached a state it cannot leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    /// Check if a transition from this state to `target` is valid.
    ///
    /// Returns `true` for valid transitions according to the protocol:
    /// - the happy path walks Connecting → AwaitingReady → Sending →
    ///   AwaitingAck, cycling Sending/AwaitingAck until Done
    /// - a device fault moves any post-connect state to Erroring
    /// - the transport can close from any state
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        if *self == target {
            return true;
        }
        match (self, target) {
            // Connection lifecycle
            (Disconnected, Connecting) => true,
            (Connecting, AwaitingReady) => true,
            // Command pacing
            (AwaitingReady, Sending) => true,
            (Sending, AwaitingAck | Done) => true,
            (AwaitingAck, Sending | Done) => true,
            // Device fault after connect
            (AwaitingReady | Sending | AwaitingAck, Erroring) => true,
            // Transport close ends everything
            (_, Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::AwaitingReady => write!(f, "AwaitingReady"),
            Self::Sending => write!(f, "Sending"),
            Self::AwaitingAck => write!(f, "AwaitingAck"),
            Self::Erroring => write!(f, "Erroring"),
            Self::Done => write!(f, "Done"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Transport events that drive the session machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport finished connecting
    Opened,
    /// Greeting received ("hello"-class message)
    Ready,
    /// Positive acknowledgement of the previously sent command
    Ack,
    /// Error-class message from the device
    Fault(String),
    /// The transport closed (peer-initiated or local)
    Closed,
}

/// What the driver must do after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Nothing; wait for the next event
    None,
    /// Transmit this command followed by the protocol terminator
    Send(DeviceCommand),
    /// Queue fully processed; close the connection
    Complete,
    /// Abandon the queue and force-close the connection
    Abort,
}

/// Classify an inbound device message by its string prefix.
///
/// `hello` is the ready-after-connect greeting, `ok ` (with the trailing
/// space) acknowledges the prior command, `error` signals a fault.
/// Anything else is informational and yields no event.
pub fn classify_message(message: &str) -> Option<SessionEvent> {
    if message.starts_with("hello") {
        Some(SessionEvent::Ready)
    } else if message.starts_with("ok ") || message == "ok" {
        Some(SessionEvent::Ack)
    } else if message.starts_with("error") {
        Some(SessionEvent::Fault(message.to_string()))
    } else {
        None
    }
}

/// One acknowledgement-paced run over a single command queue.
///
/// Holds the protocol cursor (index of the next unsent command).
/// Exactly one queue is active per session; sessions are not reused
/// across requests.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    queue: CommandQueue,
    cursor: usize,
    fault: Option<String>,
}

impl Session {
    /// Create a session for one command queue. An empty queue is invalid.
    pub fn new(queue: CommandQueue) -> std::result::Result<Self, ValidationError> {
        if queue.is_empty() {
            return Err(ValidationError::EmptyQueue);
        }
        Ok(Self {
            state: SessionState::Disconnected,
            queue,
            cursor: 0,
            fault: None,
        })
    }

    /// Current protocol state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index of the next unsent command.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether every command in the queue has been transmitted.
    pub fn is_drained(&self) -> bool {
        self.cursor == self.queue.len()
    }

    /// Mark the start of the transport connection attempt.
    pub fn begin_connect(&mut self) {
        self.set_state(SessionState::Connecting);
    }

    /// Apply one transport event; returns the action the driver must take.
    ///
    /// Each event triggers at most one state transition and at most one
    /// outbound send.
    pub fn handle(&mut self, event: SessionEvent) -> SessionAction {
        match event {
            SessionEvent::Opened => {
                self.set_state(SessionState::AwaitingReady);
                SessionAction::None
            }
            SessionEvent::Ready | SessionEvent::Ack => match self.state {
                SessionState::AwaitingReady | SessionState::AwaitingAck => self.advance(),
                SessionState::Done => SessionAction::Complete,
                // Late or duplicate signal; nothing in flight to release
                _ => SessionAction::None,
            },
            SessionEvent::Fault(message) => {
                if self.state.is_terminal() || self.state == SessionState::Done {
                    return SessionAction::None;
                }
                tracing::error!("Device fault at command {}: {}", self.cursor, message);
                self.fault = Some(message);
                self.set_state(SessionState::Erroring);
                SessionAction::Abort
            }
            SessionEvent::Closed => {
                // A close after the cursor reached the end is a finished
                // run; before that it is a failed one.
                if self.fault.is_none() && self.is_drained() && self.state != SessionState::Closed {
                    self.set_state(SessionState::Done);
                }
                self.set_state(SessionState::Closed);
                SessionAction::None
            }
        }
    }

    /// Transmit the next command, or complete if the queue is drained.
    fn advance(&mut self) -> SessionAction {
        if self.cursor < self.queue.len() {
            let command = self.queue[self.cursor].clone();
            self.set_state(SessionState::Sending);
            self.cursor += 1;
            self.set_state(SessionState::AwaitingAck);
            SessionAction::Send(command)
        } else {
            self.set_state(SessionState::Done);
            SessionAction::Complete
        }
    }

    fn set_state(&mut self, next: SessionState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Invalid session transition {} -> {}", self.state, next);
        }
        tracing::trace!("Session {} -> {}", self.state, next);
        self.state = next;
    }

    /// The final outcome once the transport has closed.
    ///
    /// A close before the cursor reached the queue end is a failed run,
    /// never silently treated as success.
    pub fn outcome(&self) -> Result<()> {
        if let Some(message) = &self.fault {
            return Err(ProtocolError::DeviceFault {
                message: message.clone(),
            }
            .into());
        }
        if self.is_drained() {
            return Ok(());
        }
        Err(Error::PartialCompletion {
            sent: self.cursor,
            total: self.queue.len(),
        })
    }
}

/// Drive one session over an open transport until it closes.
///
/// The transport delivers data/close events asynchronously; each event
/// triggers at most one transition and at most one send. There is no
/// polling loop.
pub async fn run_session<T: Transport>(transport: &mut T, queue: CommandQueue) -> Result<()> {
    let total = queue.len();
    let mut session = Session::new(queue)?;
    session.begin_connect();
    session.handle(SessionEvent::Opened);

    loop {
        let event = match transport.read_message().await {
            Ok(Some(message)) => {
                tracing::debug!("Received: {}", message);
                match classify_message(&message) {
                    Some(event) => event,
                    None => continue,
                }
            }
            Ok(None) => SessionEvent::Closed,
            Err(e) => {
                tracing::warn!("Transport error mid-session: {}", e);
                transport.close().await;
                session.handle(SessionEvent::Closed);
                return Err(e);
            }
        };

        let peer_closed = event == SessionEvent::Closed;
        match session.handle(event) {
            SessionAction::Send(command) => {
                if let Err(e) = transport.send_command(&command).await {
                    transport.close().await;
                    session.handle(SessionEvent::Closed);
                    return Err(e);
                }
            }
            SessionAction::Complete => {
                tracing::info!("Queue of {} commands finished", total);
                transport.close().await;
                session.handle(SessionEvent::Closed);
                break;
            }
            SessionAction::Abort => {
                transport.close().await;
                session.handle(SessionEvent::Closed);
                break;
            }
            SessionAction::None => {}
        }
        if peer_closed {
            break;
        }
    }

    session.outcome()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(n: usize) -> CommandQueue {
        (0..n)
            .map(|i| DeviceCommand::linear_move(1000 + i as i32, 0, 0))
            .collect()
    }

    #[test]
    fn empty_queue_is_rejected() {
        assert!(Session::new(Vec::new()).is_err());
    }

    #[test]
    fn scripted_happy_path_ends_done() {
        // connect → hello → send(cmd0) → "ok " → send(cmd1) → close
        let q = queue(2);
        let mut session = Session::new(q.clone()).unwrap();
        session.begin_connect();
        assert_eq!(session.handle(SessionEvent::Opened), SessionAction::None);
        assert_eq!(session.state(), SessionState::AwaitingReady);

        assert_eq!(
            session.handle(SessionEvent::Ready),
            SessionAction::Send(q[0].clone())
        );
        assert_eq!(session.state(), SessionState::AwaitingAck);

        assert_eq!(
            session.handle(SessionEvent::Ack),
            SessionAction::Send(q[1].clone())
        );
        session.handle(SessionEvent::Closed);
        assert!(session.outcome().is_ok());
    }

    #[test]
    fn final_ack_completes_and_closes_locally() {
        let q = queue(1);
        let mut session = Session::new(q.clone()).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        session.handle(SessionEvent::Ready);
        assert_eq!(session.handle(SessionEvent::Ack), SessionAction::Complete);
        assert_eq!(session.state(), SessionState::Done);
        session.handle(SessionEvent::Closed);
        assert!(session.outcome().is_ok());
    }

    #[test]
    fn close_before_queue_drained_is_partial_completion() {
        // Same script but the close arrives right after the greeting
        let mut session = Session::new(queue(2)).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        session.handle(SessionEvent::Ready);
        session.handle(SessionEvent::Closed);

        match session.outcome() {
            Err(Error::PartialCompletion { sent, total }) => {
                assert_eq!(sent, 1);
                assert_eq!(total, 2);
            }
            other => panic!("expected partial completion, got {:?}", other),
        }
    }

    #[test]
    fn close_before_anything_sent_is_partial_completion() {
        let mut session = Session::new(queue(2)).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        session.handle(SessionEvent::Closed);

        match session.outcome() {
            Err(Error::PartialCompletion { sent, total }) => {
                assert_eq!(sent, 0);
                assert_eq!(total, 2);
            }
            other => panic!("expected partial completion, got {:?}", other),
        }
    }

    #[test]
    fn fault_abandons_the_queue() {
        let mut session = Session::new(queue(3)).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        session.handle(SessionEvent::Ready);
        assert_eq!(
            session.handle(SessionEvent::Fault("error 9 oops".to_string())),
            SessionAction::Abort
        );
        session.handle(SessionEvent::Closed);

        let err = session.outcome().unwrap_err();
        assert!(err.is_protocol_error(), "{:?}", err);
    }

    #[test]
    fn events_after_fault_do_not_resume() {
        let mut session = Session::new(queue(2)).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        session.handle(SessionEvent::Ready);
        session.handle(SessionEvent::Fault("error 1".to_string()));
        // A late ack must not restart the queue mid-fault
        assert_eq!(session.handle(SessionEvent::Ack), SessionAction::None);
    }

    #[test]
    fn ok_greeting_also_releases_first_command() {
        // Some firmware revisions answer the connect with an ok-class line
        let q = queue(1);
        let mut session = Session::new(q.clone()).unwrap();
        session.begin_connect();
        session.handle(SessionEvent::Opened);
        assert_eq!(
            session.handle(SessionEvent::Ack),
            SessionAction::Send(q[0].clone())
        );
    }

    #[test]
    fn classifies_message_prefixes() {
        assert_eq!(classify_message("hello 1.0"), Some(SessionEvent::Ready));
        assert_eq!(classify_message("ok 1000 1000"), Some(SessionEvent::Ack));
        assert_eq!(
            classify_message("error bad command"),
            Some(SessionEvent::Fault("error bad command".to_string()))
        );
        assert_eq!(classify_message("something else"), None);
    }

    #[test]
    fn transition_table_rejects_resume_after_close() {
        assert!(!SessionState::Closed.can_transition_to(SessionState::Sending));
        assert!(!SessionState::Done.can_transition_to(SessionState::Sending));
        assert!(SessionState::AwaitingAck.can_transition_to(SessionState::Closed));
    }
}
