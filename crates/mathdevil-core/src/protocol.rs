use serde::{Deserialize, Serialize};

use crate::game_trait::GameResult;
use crate::input::InputIntent;

/// Maximum message payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

/// Message type discriminator, sent as the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Intent = 0x01,
    Snapshot = 0x02,
    GameOver = 0x03,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::Intent),
            0x02 => Some(Self::Snapshot),
            0x03 => Some(Self::GameOver),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    UnexpectedMessageType(MessageType),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::UnexpectedMessageType(t) => write!(f, "unexpected message type: {t:?}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a serializable payload with a 1-byte type prefix.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes =
        rmp_serde::to_vec(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    let Some(&first) = data.first() else {
        return Err(ProtocolError::EmptyMessage);
    };
    MessageType::from_byte(first).ok_or(ProtocolError::UnknownMessageType(first))
}

/// Decode a MessagePack payload (bytes after the type prefix).
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

fn decode_expected<T: for<'de> Deserialize<'de>>(
    expected: MessageType,
    data: &[u8],
) -> Result<T, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    if msg_type != expected {
        return Err(ProtocolError::UnexpectedMessageType(msg_type));
    }
    decode_payload(data)
}

pub fn encode_intent(intent: InputIntent) -> Result<Vec<u8>, ProtocolError> {
    encode_message(MessageType::Intent, &intent)
}

pub fn decode_intent(data: &[u8]) -> Result<InputIntent, ProtocolError> {
    decode_expected(MessageType::Intent, data)
}

/// Encode a presentation snapshot. The snapshot type is owned by the game crate.
pub fn encode_snapshot<T: Serialize>(snapshot: &T) -> Result<Vec<u8>, ProtocolError> {
    encode_message(MessageType::Snapshot, snapshot)
}

pub fn decode_snapshot<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    decode_expected(MessageType::Snapshot, data)
}

pub fn encode_result(result: &GameResult) -> Result<Vec<u8>, ProtocolError> {
    encode_message(MessageType::GameOver, result)
}

pub fn decode_result(data: &[u8]) -> Result<GameResult, ProtocolError> {
    decode_expected(MessageType::GameOver, data)
}
