//! WebSocket implementation of [`ContractApi`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::contract::CallError;
use crate::models::Quiz;
use crate::protocol::{CallResponse, ClientMessage, ContractCall, ServerMessage};

use super::api::{unexpected_response, ContractApi, SubmitAnswerRequest};

type CallReply = Result<CallResponse, CallError>;

/// Error while connecting to and joining a ledger server.
#[derive(Debug)]
pub enum ConnectError {
    WebSocket(tungstenite::Error),
    Rejected(String),
    Closed,
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::WebSocket(e) => write!(f, "Failed to connect to server: {}", e),
            ConnectError::Rejected(reason) => write!(f, "Server rejected account: {}", reason),
            ConnectError::Closed => write!(f, "Server closed the connection during join"),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::WebSocket(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tungstenite::Error> for ConnectError {
    fn from(err: tungstenite::Error) -> Self {
        ConnectError::WebSocket(err)
    }
}

/// Calls waiting for a reply, plus the reason the connection went away.
#[derive(Default)]
struct Pending {
    closed: Option<String>,
    waiting: HashMap<u64, oneshot::Sender<CallReply>>,
}

/// A joined connection to a ledger server.
///
/// Each call gets a fresh id; the reader task routes the matching
/// `CallResult` back to the waiting caller. When the socket closes every
/// outstanding call fails with a transport error.
pub struct WsContractApi {
    account_id: String,
    is_owner: bool,
    next_id: AtomicU64,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    pending: Arc<Mutex<Pending>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WsContractApi {
    /// Connect to `url` and join as `account_id`.
    pub async fn connect(url: &str, account_id: &str) -> Result<Self, ConnectError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let join = ClientMessage::Join {
            account_id: account_id.to_string(),
        };
        send_json(&mut ws_sender, &join).await?;

        let is_owner = loop {
            let Some(msg) = ws_receiver.next().await else {
                return Err(ConnectError::Closed);
            };
            let text = match msg? {
                Message::Text(text) => text.to_string(),
                Message::Close(_) => return Err(ConnectError::Closed),
                _ => continue,
            };

            match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::JoinAccepted { is_owner, .. }) => break is_owner,
                Ok(ServerMessage::JoinRejected { reason }) => {
                    return Err(ConnectError::Rejected(reason));
                }
                Ok(ServerMessage::ServerClosing) => return Err(ConnectError::Closed),
                Ok(_) => continue,
                Err(e) => log::warn!("ignoring malformed server message: {}", e),
            }
        };

        log::info!("joined {} as {} (owner: {})", url, account_id, is_owner);

        let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if send_json(&mut ws_sender, &msg).await.is_err() {
                    break;
                }
            }
        });

        let pending = Arc::new(Mutex::new(Pending::default()));
        let pending_clone = Arc::clone(&pending);
        let reader = tokio::spawn(async move {
            let reason = loop {
                let text = match ws_receiver.next().await {
                    Some(Ok(Message::Text(text))) => text.to_string(),
                    Some(Ok(Message::Close(_))) | None => {
                        break "Connection closed by server".to_string();
                    }
                    Some(Err(e)) => break format!("Connection error: {}", e),
                    Some(Ok(_)) => continue,
                };

                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(ServerMessage::CallResult { id, result }) => {
                        let waiter = pending_clone.lock().await.waiting.remove(&id);
                        match waiter {
                            Some(waiter) => {
                                let _ = waiter.send(result);
                            }
                            None => log::warn!("reply for unknown call {}", id),
                        }
                    }
                    Ok(ServerMessage::ServerClosing) => {
                        break "Server is shutting down".to_string();
                    }
                    Ok(other) => log::debug!("ignoring {:?}", other),
                    Err(e) => log::warn!("ignoring malformed server message: {}", e),
                }
            };

            log::warn!("{}", reason);
            let mut pending = pending_clone.lock().await;
            for (_, waiter) in pending.waiting.drain() {
                let _ = waiter.send(Err(CallError::transport(reason.clone())));
            }
            pending.closed = Some(reason);
        });

        Ok(Self {
            account_id: account_id.to_string(),
            is_owner,
            next_id: AtomicU64::new(1),
            outgoing: tx,
            pending,
            reader,
            writer,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Why the connection closed, if it has.
    pub async fn disconnect_reason(&self) -> Option<String> {
        self.pending.lock().await.closed.clone()
    }

    /// Invoke a ledger method and wait for its result.
    pub async fn call(&self, call: ContractCall) -> Result<CallResponse, CallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock().await;
            if let Some(reason) = &pending.closed {
                return Err(CallError::transport(reason.clone()));
            }
            pending.waiting.insert(id, reply_tx);
        }

        log::debug!("call {} -> {}", id, call.method_name());
        if self.outgoing.send(ClientMessage::Call { id, call }).is_err() {
            self.pending.lock().await.waiting.remove(&id);
            return Err(CallError::transport("Connection writer has stopped"));
        }

        reply_rx
            .await
            .unwrap_or_else(|_| Err(CallError::transport("Reply channel dropped")))
    }
}

impl ContractApi for WsContractApi {
    fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> impl Future<Output = Result<String, CallError>> + Send {
        async move {
            match self.call(request.into()).await? {
                CallResponse::Message(message) => Ok(message),
                other => Err(unexpected_response("submit_answer", &other)),
            }
        }
    }

    fn get_published_quizzes(&self) -> impl Future<Output = Result<Vec<Quiz>, CallError>> + Send {
        async move {
            match self.call(ContractCall::GetPublishedQuizzes).await? {
                CallResponse::PublishedQuizzes(published) => {
                    Ok(published.quizzes.into_iter().map(Quiz::from).collect())
                }
                other => Err(unexpected_response("get_published_quizzes", &other)),
            }
        }
    }
}

impl Drop for WsContractApi {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn send_json<S>(sink: &mut S, msg: &ClientMessage) -> Result<(), tungstenite::Error>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            log::error!("failed to encode {:?}: {}", msg, e);
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
