//! Server state management.
//!
//! The ledger itself plus the set of open connections.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::contract::{dispatch, CallError, QuizContract};
use crate::protocol::{validate_account_id, CallResponse, ContractCall, ServerMessage};

/// A single open connection.
pub struct Session {
    /// Unique connection ID.
    pub id: Uuid,
    /// Peer address.
    pub addr: SocketAddr,
    /// Account the peer calls as (None until Join is accepted).
    pub account_id: Option<String>,
    /// Channel to send messages to this peer.
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Task writing queued messages to the socket.
    writer: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(addr: SocketAddr, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr,
            account_id: None,
            sender,
            writer: None,
        }
    }

    /// Attach the task that drains `sender` into the socket.
    pub fn with_writer(mut self, writer: JoinHandle<()>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Send a message to this peer.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}

/// Main server state.
pub struct ServerState {
    /// The quiz ledger.
    pub contract: QuizContract,
    /// Open connections by ID.
    pub sessions: HashMap<Uuid, Session>,
}

impl ServerState {
    pub fn new(contract: QuizContract) -> Self {
        Self {
            contract,
            sessions: HashMap::new(),
        }
    }

    /// Register a connection and acknowledge it.
    pub fn connect(&mut self, session: Session) -> Uuid {
        let id = session.id;
        log::info!("connection {} from {}", id, session.addr);
        session.send(ServerMessage::ConnectionAck);
        self.sessions.insert(id, session);
        id
    }

    pub fn disconnect(&mut self, session_id: Uuid) {
        if let Some(session) = self.sessions.remove(&session_id) {
            if let Some(writer) = &session.writer {
                writer.abort();
            }
            match session.account_id {
                Some(account_id) => log::info!("{} ({}) disconnected", account_id, session_id),
                None => log::info!("connection {} closed before joining", session_id),
            }
        }
    }

    /// Handle a Join message.
    pub fn join(&mut self, session_id: Uuid, account_id: String) {
        let is_owner = self.contract.is_owner(&account_id);
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return;
        };

        if let Some(existing) = &session.account_id {
            session.send(ServerMessage::JoinRejected {
                reason: format!("Already joined as {}", existing),
            });
            return;
        }

        if let Err(reason) = validate_account_id(&account_id) {
            session.send(ServerMessage::JoinRejected {
                reason: reason.to_string(),
            });
            return;
        }

        log::info!("connection {} joined as {}", session_id, account_id);
        session.account_id = Some(account_id.clone());
        session.send(ServerMessage::JoinAccepted {
            account_id,
            is_owner,
        });
    }

    /// Handle a Call message and reply with its result.
    pub fn call(&mut self, session_id: Uuid, id: u64, call: ContractCall) {
        let Some(session) = self.sessions.get(&session_id) else {
            return;
        };

        let result: Result<CallResponse, CallError> = match &session.account_id {
            Some(account_id) => {
                log::debug!("{} calls {}", account_id, call.method_name());
                dispatch(&mut self.contract, account_id, call)
            }
            None => Err(CallError::transport("Join before calling the contract")),
        };

        session.send(ServerMessage::CallResult { id, result });
    }

    /// Broadcast a message to every open connection.
    pub fn broadcast_all(&self, msg: ServerMessage) {
        for session in self.sessions.values() {
            session.send(msg.clone());
        }
    }

    /// Send ServerClosing to everyone and drop every session.
    ///
    /// Returns the writer tasks. Each one exits once it has written what was
    /// queued, so awaiting them flushes the goodbye.
    pub fn close_all(&mut self) -> Vec<JoinHandle<()>> {
        self.broadcast_all(ServerMessage::ServerClosing);
        self.sessions
            .drain()
            .filter_map(|(_, session)| session.writer)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn state_with_session() -> (ServerState, Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let mut state = ServerState::new(QuizContract::new("owner.near"));
        let (tx, rx) = mpsc::unbounded_channel();
        let id = state.connect(Session::new("127.0.0.1:9000".parse().unwrap(), tx));
        (state, id, rx)
    }

    #[test]
    fn test_connect_acknowledges() {
        let (state, _id, mut rx) = state_with_session();
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::ConnectionAck)));
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_join_flags_owner() {
        let (mut state, id, mut rx) = state_with_session();
        let _ = rx.try_recv();

        state.join(id, "owner.near".to_string());
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::JoinAccepted { is_owner: true, .. })
        ));

        state.join(id, "alice.near".to_string());
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::JoinRejected { .. })));
    }

    #[test]
    fn test_join_rejects_invalid_account() {
        let (mut state, id, mut rx) = state_with_session();
        let _ = rx.try_recv();

        state.join(id, "Not Valid".to_string());
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::JoinRejected { .. })));
        assert_eq!(state.sessions[&id].account_id, None);
    }

    #[test]
    fn test_call_requires_join() {
        let (mut state, id, mut rx) = state_with_session();
        let _ = rx.try_recv();

        state.call(id, 1, ContractCall::GetPublishedQuizzes);
        let Ok(ServerMessage::CallResult { id: 1, result: Err(err) }) = rx.try_recv() else {
            panic!("expected failed call result");
        };
        assert_eq!(err.execution_error(), None);

        state.join(id, "alice.near".to_string());
        let _ = rx.try_recv();
        state.call(id, 2, ContractCall::GetPublishedQuizzes);
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::CallResult { id: 2, result: Ok(CallResponse::PublishedQuizzes(_)) })
        ));
    }

    #[test]
    fn test_disconnect_removes_session() {
        let (mut state, id, _rx) = state_with_session();
        state.disconnect(id);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_close_all_flushes_server_closing() {
        let mut state = ServerState::new(QuizContract::new("owner.near"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let written = Arc::new(std::sync::Mutex::new(Vec::new()));

        let sink = Arc::clone(&written);
        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                sink.lock().unwrap().push(msg);
            }
        });
        let addr = "127.0.0.1:9000".parse().unwrap();
        state.connect(Session::new(addr, tx).with_writer(writer));

        let writers = state.close_all();
        assert!(state.sessions.is_empty());
        assert_eq!(writers.len(), 1);
        for writer in writers {
            writer.await.unwrap();
        }

        let written = written.lock().unwrap();
        assert!(matches!(written[0], ServerMessage::ConnectionAck));
        assert!(matches!(written.last(), Some(ServerMessage::ServerClosing)));
    }
}
