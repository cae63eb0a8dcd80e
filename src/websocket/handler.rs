
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{ClientEvent, ServerEvent};
use crate::relay::registry::EventSender;
use crate::relay::RelayState;
use crate::websocket::{msg_key_handler, msg_ping_handler, msg_room_handler};

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    // Ephemeral identity for this connection, announced to the client in
    // the handshake event so it can stamp its own key events.
    let connection_id = Uuid::new_v4().to_string();
    info!(%connection_id, "WebSocket connection established");

    let (mut sink, mut stream) = socket.split();

    // All outbound traffic for this connection funnels through one
    // channel: the relay pushes into it while holding the state lock,
    // the send task drains it into the socket.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.connect(&connection_id, event_tx.clone()).await;

    if event_tx.send(ServerEvent::Connect(connection_id.clone())).is_err() {
        warn!(%connection_id, "Connection closed before handshake");
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Control and binary frames carry no application events.
                _ => continue,
            };

            let event: ClientEvent = match serde_json::from_str(&text) {
                Ok(event) => event,
                Err(e) => {
                    error!(connection_id = %recv_id, "Failed to parse message: {}", e);
                    continue;
                }
            };

            dispatch_event(&recv_state, &recv_id, &event_tx, event).await;
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Cleanup runs unconditionally, whichever side ended first.
    state.disconnect(&connection_id).await;
    info!(%connection_id, "WebSocket connection terminated");
}

/// Route one inbound event to its handler.
async fn dispatch_event(
    state: &RelayState,
    connection_id: &str,
    event_tx: &EventSender,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinRoom(room_id) => {
            msg_room_handler::handle_join_room(state, connection_id, &room_id).await;
        }
        ClientEvent::LeaveRoom(room_id) => {
            msg_room_handler::handle_leave_room(state, connection_id, &room_id).await;
        }
        ClientEvent::PianoKeyPress(payload) => {
            msg_key_handler::handle_key_press(state, connection_id, &payload).await;
        }
        ClientEvent::PianoKeyRelease(payload) => {
            msg_key_handler::handle_key_release(state, connection_id, &payload).await;
        }
        ClientEvent::Ping(payload) => {
            msg_ping_handler::handle_ping(event_tx, connection_id, &payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::KeyEventPayload;
    use crate::routes::create_routes;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn spawn_server() -> String {
        let state = Arc::new(RelayState::new());
        let app = create_routes(state, &Config::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("ws://{}/api/socket", addr)
    }

    /// Connect and consume the handshake, returning the assigned id.
    async fn connect(url: &str) -> (Client, String) {
        let (mut client, _) = connect_async(url).await.unwrap();
        let ServerEvent::Connect(connection_id) = next_event(&mut client).await else {
            panic!("expected connect handshake");
        };
        (client, connection_id)
    }

    async fn next_event(client: &mut Client) -> ServerEvent {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("transport error");
        let text = message.into_text().expect("text frame");
        serde_json::from_str(text.as_str()).expect("valid server event")
    }

    async fn send_event(client: &mut Client, event: &ClientEvent) {
        let text = serde_json::to_string(event).unwrap();
        client.send(tungstenite::Message::text(text)).await.unwrap();
    }

    #[tokio::test]
    async fn two_clients_share_a_room() {
        let url = spawn_server().await;
        let (mut a, id_a) = connect(&url).await;
        let (mut b, id_b) = connect(&url).await;

        send_event(&mut a, &ClientEvent::JoinRoom("jam1".to_string())).await;
        assert_eq!(next_event(&mut a).await, ServerEvent::UserCount(1));
        assert_eq!(next_event(&mut a).await, ServerEvent::UserJoined(id_a.clone()));

        send_event(&mut b, &ClientEvent::JoinRoom("jam1".to_string())).await;
        for client in [&mut a, &mut b] {
            assert_eq!(next_event(client).await, ServerEvent::UserCount(2));
            assert_eq!(next_event(client).await, ServerEvent::UserJoined(id_b.clone()));
        }

        send_event(
            &mut a,
            &ClientEvent::PianoKeyPress(KeyEventPayload {
                room_id: "jam1".to_string(),
                key_id: 40,
                user_id: id_a.clone(),
            }),
        )
        .await;
        for client in [&mut a, &mut b] {
            match next_event(client).await {
                ServerEvent::RemoteKeyPress(relayed) => {
                    assert_eq!(relayed.key_id, 40);
                    assert_eq!(relayed.user_id, id_a);
                }
                other => panic!("expected remote-key-press, got {:?}", other),
            }
        }

        b.close(None).await.unwrap();
        assert_eq!(next_event(&mut a).await, ServerEvent::UserCount(1));
        assert_eq!(next_event(&mut a).await, ServerEvent::UserLeft(id_b.clone()));
    }

    #[tokio::test]
    async fn ping_is_answered_to_sender_only() {
        let url = spawn_server().await;
        let (mut a, id_a) = connect(&url).await;
        let (mut b, _id_b) = connect(&url).await;

        send_event(&mut a, &ClientEvent::JoinRoom("jam1".to_string())).await;
        next_event(&mut a).await;
        next_event(&mut a).await;
        send_event(&mut b, &ClientEvent::JoinRoom("jam1".to_string())).await;
        for client in [&mut a, &mut b] {
            next_event(client).await;
            next_event(client).await;
        }

        send_event(&mut a, &ClientEvent::Ping("hello server".to_string())).await;
        assert_eq!(
            next_event(&mut a).await,
            ServerEvent::Pong("Pong from server!".to_string())
        );

        // b saw no pong: the next thing it observes is the key press
        // a sends afterwards.
        send_event(
            &mut a,
            &ClientEvent::PianoKeyPress(KeyEventPayload {
                room_id: "jam1".to_string(),
                key_id: 52,
                user_id: id_a.clone(),
            }),
        )
        .await;
        assert!(matches!(
            next_event(&mut b).await,
            ServerEvent::RemoteKeyPress(_)
        ));
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let url = spawn_server().await;
        let (mut a, id_a) = connect(&url).await;

        a.send(tungstenite::Message::text("not json")).await.unwrap();
        a.send(tungstenite::Message::text(r#"{"event":"no-such-event","data":1}"#))
            .await
            .unwrap();

        // The connection survives and keeps working.
        send_event(&mut a, &ClientEvent::JoinRoom("jam1".to_string())).await;
        assert_eq!(next_event(&mut a).await, ServerEvent::UserCount(1));
        assert_eq!(next_event(&mut a).await, ServerEvent::UserJoined(id_a));
    }

    #[tokio::test]
    async fn stale_leave_is_ignored() {
        let url = spawn_server().await;
        let (mut a, id_a) = connect(&url).await;

        send_event(&mut a, &ClientEvent::LeaveRoom("jam1".to_string())).await;

        send_event(&mut a, &ClientEvent::JoinRoom("jam1".to_string())).await;
        assert_eq!(next_event(&mut a).await, ServerEvent::UserCount(1));
        assert_eq!(next_event(&mut a).await, ServerEvent::UserJoined(id_a));
    }
}
