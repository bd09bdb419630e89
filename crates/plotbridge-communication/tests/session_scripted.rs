//! Drives the session state machine through scripted transport events.

use async_trait::async_trait;
use plotbridge_communication::{
    run_session, DeviceCommand, Transport,
};
use plotbridge_core::Error;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Transport that replays a fixed script of inbound messages and records
/// every outbound command.
struct ScriptedTransport {
    inbound: VecDeque<Option<String>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl ScriptedTransport {
    fn new(script: &[&str]) -> Self {
        Self {
            // A trailing close follows every script
            inbound: script.iter().map(|s| Some(s.to_string())).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
        }
    }

    fn sent_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.sent.clone()
    }

    fn closed_handle(&self) -> Arc<Mutex<bool>> {
        self.closed.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_command(&mut self, command: &DeviceCommand) -> plotbridge_core::Result<()> {
        self.sent.lock().unwrap().push(command.as_str().to_string());
        Ok(())
    }

    async fn read_message(&mut self) -> plotbridge_core::Result<Option<String>> {
        Ok(self.inbound.pop_front().flatten())
    }

    async fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

fn two_command_queue() -> Vec<DeviceCommand> {
    vec![
        DeviceCommand::linear_move(1000, 500, 0),
        DeviceCommand::linear_move(1100, 500, 1000),
    ]
}

#[tokio::test]
async fn greeting_and_one_ack_drain_a_two_command_queue() {
    let mut transport = ScriptedTransport::new(&["hello 1.0", "ok 1000 500"]);
    let sent = transport.sent_handle();
    let closed = transport.closed_handle();

    let outcome = run_session(&mut transport, two_command_queue()).await;
    assert!(outcome.is_ok(), "{:?}", outcome);

    let sent = sent.lock().unwrap();
    assert_eq!(
        *sent,
        vec![
            "G01 X1000 Y500 Z0".to_string(),
            "G01 X1100 Y500 Z1000".to_string(),
        ]
    );
    assert!(*closed.lock().unwrap());
}

#[tokio::test]
async fn close_right_after_greeting_is_partial_completion() {
    let mut transport = ScriptedTransport::new(&["hello 1.0"]);
    let sent = transport.sent_handle();

    let outcome = run_session(&mut transport, two_command_queue()).await;
    match outcome {
        Err(Error::PartialCompletion { sent: n, total }) => {
            assert_eq!(n, 1);
            assert_eq!(total, 2);
        }
        other => panic!("expected partial completion, got {:?}", other),
    }

    // Only the first command went out before the close
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn device_fault_abandons_remaining_commands() {
    let mut transport = ScriptedTransport::new(&["hello 1.0", "error G01 out of range"]);
    let sent = transport.sent_handle();
    let closed = transport.closed_handle();

    let outcome = run_session(&mut transport, two_command_queue()).await;
    assert!(outcome.as_ref().unwrap_err().is_protocol_error(), "{:?}", outcome);

    // cmd0 was sent, cmd1 abandoned, connection force-closed
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert!(*closed.lock().unwrap());
}

#[tokio::test]
async fn unclassified_messages_are_ignored() {
    let mut transport =
        ScriptedTransport::new(&["hello 1.0", "status: happy", "ok 1000 500", "ok 1100 500"]);
    let sent = transport.sent_handle();

    let outcome = run_session(&mut transport, two_command_queue()).await;
    assert!(outcome.is_ok(), "{:?}", outcome);
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn immediate_close_sends_nothing_and_fails() {
    let mut transport = ScriptedTransport::new(&[]);
    let sent = transport.sent_handle();

    let outcome = run_session(&mut transport, two_command_queue()).await;
    assert!(outcome.unwrap_err().is_partial_completion());
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_queue_is_rejected_before_any_io() {
    let mut transport = ScriptedTransport::new(&["hello 1.0"]);
    let sent = transport.sent_handle();

    let outcome = run_session(&mut transport, Vec::new()).await;
    assert!(outcome.unwrap_err().is_validation_error());
    assert!(sent.lock().unwrap().is_empty());
}
