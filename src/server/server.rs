//! WebSocket server hosting the quiz ledger.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::contract::{ContractError, QuizContract};
use crate::data::load_quiz_definitions;
use crate::models::QuizDefinition;
use crate::protocol::{validate_account_id, ClientMessage, ServerMessage};
use crate::QuizError;

use super::state::{ServerState, Session};

/// Shared server state wrapped in Arc<Mutex> for async access.
pub type SharedState = Arc<Mutex<ServerState>>;

/// How long shutdown waits for goodbyes to reach the sockets.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Settings for [`run`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Account allowed to create and publish quizzes.
    pub owner_id: String,
    /// Quizzes to create as the owner before accepting connections.
    pub quizzes_path: Option<PathBuf>,
}

/// Run the ledger server until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), QuizError> {
    validate_account_id(&config.owner_id)
        .map_err(|reason| QuizError::Config(format!("Invalid owner id: {}", reason)))?;

    let mut contract = QuizContract::new(config.owner_id.clone());
    if let Some(path) = &config.quizzes_path {
        let definitions = load_quiz_definitions(path)?;
        let created = seed_contract(&mut contract, definitions)?;
        log::info!("created {} quizzes from {}", created, path.display());
    }

    let state = Arc::new(Mutex::new(ServerState::new(contract)));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("ledger owned by {} listening on {}", config.owner_id, addr);

    tokio::select! {
        _ = serve(listener, Arc::clone(&state)) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            log::info!("shutting down");
            shutdown(&state).await;
        }
    }

    Ok(())
}

/// Tell every client the server is closing and wait until the message has
/// been written, or until [`SHUTDOWN_GRACE`] runs out.
pub async fn shutdown(state: &SharedState) {
    let writers = state.lock().await.close_all();
    if writers.is_empty() {
        return;
    }

    let count = writers.len();
    if tokio::time::timeout(SHUTDOWN_GRACE, join_all(writers)).await.is_err() {
        log::warn!("gave up flushing {} connections", count);
    } else {
        log::debug!("notified {} connections", count);
    }
}

/// Create every definition in the ledger as its owner.
pub fn seed_contract(
    contract: &mut QuizContract,
    definitions: Vec<QuizDefinition>,
) -> Result<usize, ContractError> {
    let owner_id = contract.owner_id().to_string();
    let count = definitions.len();

    for definition in definitions {
        contract.create_quiz(
            &owner_id,
            definition.hash,
            definition.question,
            definition.answers,
            definition.correct_index,
            definition.max_prize_amount,
            definition.publish,
        )?;
    }

    Ok(count)
}

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, state: SharedState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(handle_connection(stream, addr, state));
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            log::warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("failed to encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });
    let session = Session::new(addr, tx).with_writer(send_task);
    let session_id = state.lock().await.connect(session);

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                log::debug!("connection {} errored: {}", session_id, e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("malformed message from {}: {}", session_id, e);
                continue;
            }
        };

        let mut guard = state.lock().await;
        match client_msg {
            ClientMessage::Join { account_id } => guard.join(session_id, account_id),
            ClientMessage::Call { id, call } => guard.call(session_id, id, call),
        }
    }

    state.lock().await.disconnect(session_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(hash: &str) -> QuizDefinition {
        QuizDefinition {
            hash: hash.to_string(),
            question: "2 + 2".to_string(),
            answers: vec!["4".to_string(), "5".to_string()],
            correct_index: 0,
            max_prize_amount: "10".to_string(),
            publish: true,
        }
    }

    #[test]
    fn test_seed_contract() {
        let mut contract = QuizContract::new("owner.near");
        let created = seed_contract(&mut contract, vec![definition("a"), definition("b")]).unwrap();

        assert_eq!(created, 2);
        assert_eq!(contract.get_published_quizzes().quizzes.len(), 2);
    }

    #[test]
    fn test_seed_contract_stops_on_duplicate() {
        let mut contract = QuizContract::new("owner.near");
        let result = seed_contract(&mut contract, vec![definition("a"), definition("a")]);

        assert_eq!(result, Err(ContractError::DuplicateQuiz));
    }
}
