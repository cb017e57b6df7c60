use crate::session::Inbound;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;
use vg_core::ChannelStatus;
use vg_types::{ChannelMessage, ClientMessage};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Maintain the push-channel subscription for one subject: connect, join
/// the subject's room, forward decoded updates, and reconnect with a
/// fixed delay when the connection drops. Connection state reaches the
/// user only as a status indicator.
pub async fn run(url: Url, app_id: String, tx: UnboundedSender<Inbound>) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((mut socket, _)) => {
                debug!(%url, "push channel connected");
                if join_room(&mut socket, &app_id).await {
                    if tx.send(Inbound::Channel(ChannelStatus::Connected)).is_err() {
                        return;
                    }
                    read_frames(&mut socket, &tx).await;
                }
            }
            Err(err) => warn!(error = %err, "push channel connect failed"),
        }
        if tx.send(Inbound::Channel(ChannelStatus::Disconnected)).is_err() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn join_room(socket: &mut Socket, app_id: &str) -> bool {
    let join = serde_json::to_string(&ClientMessage::Join {
        app_id: app_id.to_string(),
    })
    .unwrap_or_else(|_| "{}".to_string());
    socket.send(Message::Text(join)).await.is_ok()
}

async fn read_frames(socket: &mut Socket, tx: &UnboundedSender<Inbound>) {
    while let Some(Ok(frame)) = socket.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ChannelMessage>(&text) {
                Ok(message) => {
                    if tx.send(Inbound::Push(message)).is_err() {
                        return;
                    }
                }
                Err(err) => debug!(error = %err, "ignoring unrecognized channel frame"),
            },
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => return,
            _ => {}
        }
    }
}
