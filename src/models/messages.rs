use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames a client sends over the room socket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    JoinRoom {
        room_id: String,
        user_id: String,
        #[serde(default)]
        user_data: Value,
    },
    LeaveRoom,
    CursorMove {
        x: f64,
        y: f64,
        #[serde(default)]
        text_position: Option<usize>,
    },
    ContentChange {
        content: String,
    },
    UserTyping {
        is_typing: bool,
    },
    CommentAdded {
        comment: Value,
    },
    CommentDeleted {
        comment_id: String,
    },
    Message {
        text: String,
    },
    HistoryUpdate,
    Ping,
}

/// Frames the server pushes to a connection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    UserJoined {
        user_id: String,
        user_data: Value,
        timestamp: i64,
    },
    UserLeft {
        user_id: String,
        timestamp: i64,
    },
    RoomState {
        active_users: usize,
        member_count: usize,
        room_id: String,
    },
    CursorUpdate {
        user_id: String,
        socket_id: String,
        x: f64,
        y: f64,
        text_position: Option<usize>,
        user: Value,
        timestamp: i64,
    },
    ContentUpdate {
        user_id: String,
        content: String,
        timestamp: i64,
    },
    UserTyping {
        socket_id: String,
        is_typing: bool,
        user: Value,
    },
    CommentAdded {
        comment: Value,
    },
    CommentDeleted {
        comment_id: String,
    },
    Message {
        user_id: String,
        text: String,
        timestamp: i64,
    },
    HistoryUpdated,
    Pong {
        date: String,
    },
    Error {
        code: String,
        message: String,
    },
}
