//! Body encoding/decoding for every protocol message.
//!
//! One pair of functions per message, both directions:
//! - request builders + decoders (client → server),
//! - push/response builders + decoders (server → client).
//!
//! Body layouts:
//!
//! ```text
//! Requests (client → server)
//! --------------------------
//! LOGIN         : nickname (UTF-8, rest of body)
//! SEARCH_ROOM   : (empty)
//! CREATE_ROOM   : title (UTF-8, rest of body)
//! JOIN_ROOM     : [0..2] room id (u16 BE)
//! LEAVE_ROOM    : (empty)
//! ROOM_INFO     : (empty)
//! TOGGLE_READY  : (empty)
//! MOVE          : [0] action byte
//! ATTACK        : [0] cleared line count
//! GAMEOVER      : [0..4] final score (u32 BE)
//!
//! Pushes / responses (server → client)
//! ------------------------------------
//! LOGIN_RESULT       : [0] result (0 = ok)
//! SEARCH_ROOM        : [0] count, then per room
//!                      [id u16 BE][status u8][title_len u8][title]
//! CREATE_ROOM_RESULT : [0] result, [1..3] room id (u16 BE)
//! JOIN_ROOM_RESULT   : [0] result, [1] seat (0 on failure)
//! ENTER_NOTICE       : [0] seat, nickname (rest of body)
//! LEAVE_NOTICE       : [0] seat
//! READY_NOTICE       : [0] seat, [1] state (0/1)
//! GAME_START         : [0..4] seed (u32 BE)
//! MOVE_NOTICE        : [0] seat, [1] action byte
//! GARBAGE_NOTICE     : [0] attacker, [1] target, [2] line count
//! RESULT_NOTICE      : [0] winner (255 = none), [1] reason
//! ```

use std::fmt;

use crate::frame::Message;
use crate::opcode::{EndReason, JoinResult, OpCode, NO_WINNER};

/// Errors that can arise when decoding a message body.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Body too short for the fields the opcode requires.
    Truncated,
    /// A text field is not valid UTF-8.
    InvalidText,
    /// A field holds a value outside its defined codes.
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "Body truncated"),
            ProtocolError::InvalidText => write!(f, "Invalid UTF-8 in text field"),
            ProtocolError::InvalidField(field) => write!(f, "Invalid field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// One row of the SEARCH_ROOM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: u16,
    pub in_match: bool,
    pub title: String,
}

// ============================================================================
// Requests: client → server
// ============================================================================

pub fn login(nickname: &str) -> Message {
    Message::new(OpCode::Login, nickname.as_bytes().to_vec())
}

pub fn decode_login(body: &[u8]) -> Result<String, ProtocolError> {
    decode_text(body)
}

pub fn search_room() -> Message {
    Message::new(OpCode::SearchRoom, Vec::new())
}

pub fn create_room(title: &str) -> Message {
    Message::new(OpCode::CreateRoom, title.as_bytes().to_vec())
}

pub fn decode_create_room(body: &[u8]) -> Result<String, ProtocolError> {
    decode_text(body)
}

pub fn join_room(room_id: u16) -> Message {
    Message::new(OpCode::JoinRoom, room_id.to_be_bytes().to_vec())
}

pub fn decode_join_room(body: &[u8]) -> Result<u16, ProtocolError> {
    if body.len() < 2 {
        return Err(ProtocolError::Truncated);
    }
    Ok(u16::from_be_bytes([body[0], body[1]]))
}

pub fn leave_room() -> Message {
    Message::new(OpCode::LeaveRoom, Vec::new())
}

pub fn room_info() -> Message {
    Message::new(OpCode::RoomInfo, Vec::new())
}

pub fn toggle_ready() -> Message {
    Message::new(OpCode::ToggleReady, Vec::new())
}

pub fn player_move(action: u8) -> Message {
    Message::new(OpCode::Move, vec![action])
}

pub fn decode_move(body: &[u8]) -> Result<u8, ProtocolError> {
    decode_byte(body)
}

pub fn attack(lines: u8) -> Message {
    Message::new(OpCode::Attack, vec![lines])
}

pub fn decode_attack(body: &[u8]) -> Result<u8, ProtocolError> {
    decode_byte(body)
}

pub fn game_over(score: u32) -> Message {
    Message::new(OpCode::GameOver, score.to_be_bytes().to_vec())
}

pub fn decode_game_over(body: &[u8]) -> Result<u32, ProtocolError> {
    read_u32_be(body)
}

// ============================================================================
// Pushes and responses: server → client
// ============================================================================

pub fn login_result(result: u8) -> Message {
    Message::new(OpCode::LoginResult, vec![result])
}

pub fn decode_login_result(body: &[u8]) -> Result<u8, ProtocolError> {
    decode_byte(body)
}

pub fn room_list(rooms: &[RoomSummary]) -> Message {
    debug_assert!(rooms.len() <= u8::MAX as usize);

    let mut body = Vec::with_capacity(1 + rooms.len() * 8);
    body.push(rooms.len() as u8);

    for room in rooms {
        let title_bytes = room.title.as_bytes();
        debug_assert!(title_bytes.len() <= u8::MAX as usize);

        body.extend_from_slice(&room.id.to_be_bytes());
        body.push(if room.in_match { 1 } else { 0 });
        body.push(title_bytes.len() as u8);
        body.extend_from_slice(title_bytes);
    }

    Message::new(OpCode::SearchRoom, body)
}

pub fn decode_room_list(body: &[u8]) -> Result<Vec<RoomSummary>, ProtocolError> {
    if body.is_empty() {
        return Err(ProtocolError::Truncated);
    }

    let count = body[0] as usize;
    let mut rooms = Vec::with_capacity(count);
    let mut offset = 1;

    for _ in 0..count {
        if body.len() < offset + 4 {
            return Err(ProtocolError::Truncated);
        }

        let id = u16::from_be_bytes([body[offset], body[offset + 1]]);
        let in_match = body[offset + 2] != 0;
        let title_len = body[offset + 3] as usize;
        offset += 4;

        if body.len() < offset + title_len {
            return Err(ProtocolError::Truncated);
        }

        let title = std::str::from_utf8(&body[offset..offset + title_len])
            .map_err(|_| ProtocolError::InvalidText)?
            .to_string();
        offset += title_len;

        rooms.push(RoomSummary {
            id,
            in_match,
            title,
        });
    }

    Ok(rooms)
}

pub fn create_room_result(result: u8, room_id: u16) -> Message {
    let mut body = Vec::with_capacity(3);
    body.push(result);
    body.extend_from_slice(&room_id.to_be_bytes());
    Message::new(OpCode::CreateRoomResult, body)
}

pub fn decode_create_room_result(body: &[u8]) -> Result<(u8, u16), ProtocolError> {
    if body.len() < 3 {
        return Err(ProtocolError::Truncated);
    }
    Ok((body[0], u16::from_be_bytes([body[1], body[2]])))
}

pub fn join_room_result(result: JoinResult, seat: u8) -> Message {
    Message::new(OpCode::JoinRoomResult, vec![result as u8, seat])
}

pub fn decode_join_room_result(body: &[u8]) -> Result<(JoinResult, u8), ProtocolError> {
    if body.len() < 2 {
        return Err(ProtocolError::Truncated);
    }
    let result = JoinResult::from_u8(body[0]).ok_or(ProtocolError::InvalidField("result"))?;
    Ok((result, body[1]))
}

pub fn enter_notice(seat: u8, nickname: &str) -> Message {
    let mut body = Vec::with_capacity(1 + nickname.len());
    body.push(seat);
    body.extend_from_slice(nickname.as_bytes());
    Message::new(OpCode::EnterNotice, body)
}

pub fn decode_enter_notice(body: &[u8]) -> Result<(u8, String), ProtocolError> {
    if body.is_empty() {
        return Err(ProtocolError::Truncated);
    }
    let nickname = decode_text(&body[1..])?;
    Ok((body[0], nickname))
}

pub fn leave_notice(seat: u8) -> Message {
    Message::new(OpCode::LeaveNotice, vec![seat])
}

pub fn decode_leave_notice(body: &[u8]) -> Result<u8, ProtocolError> {
    decode_byte(body)
}

pub fn ready_notice(seat: u8, ready: bool) -> Message {
    Message::new(OpCode::ReadyNotice, vec![seat, if ready { 1 } else { 0 }])
}

pub fn decode_ready_notice(body: &[u8]) -> Result<(u8, bool), ProtocolError> {
    if body.len() < 2 {
        return Err(ProtocolError::Truncated);
    }
    Ok((body[0], body[1] != 0))
}

pub fn game_start(seed: u32) -> Message {
    Message::new(OpCode::GameStart, seed.to_be_bytes().to_vec())
}

pub fn decode_game_start(body: &[u8]) -> Result<u32, ProtocolError> {
    read_u32_be(body)
}

pub fn move_notice(seat: u8, action: u8) -> Message {
    Message::new(OpCode::MoveNotice, vec![seat, action])
}

pub fn decode_move_notice(body: &[u8]) -> Result<(u8, u8), ProtocolError> {
    if body.len() < 2 {
        return Err(ProtocolError::Truncated);
    }
    Ok((body[0], body[1]))
}

pub fn garbage_notice(attacker: u8, target: u8, lines: u8) -> Message {
    Message::new(OpCode::GarbageNotice, vec![attacker, target, lines])
}

pub fn decode_garbage_notice(body: &[u8]) -> Result<(u8, u8, u8), ProtocolError> {
    if body.len() < 3 {
        return Err(ProtocolError::Truncated);
    }
    Ok((body[0], body[1], body[2]))
}

pub fn result_notice(winner: Option<u8>, reason: EndReason) -> Message {
    Message::new(
        OpCode::ResultNotice,
        vec![winner.unwrap_or(NO_WINNER), reason as u8],
    )
}

pub fn decode_result_notice(body: &[u8]) -> Result<(Option<u8>, EndReason), ProtocolError> {
    if body.len() < 2 {
        return Err(ProtocolError::Truncated);
    }
    let winner = if body[0] == NO_WINNER {
        None
    } else {
        Some(body[0])
    };
    let reason = EndReason::from_u8(body[1]).ok_or(ProtocolError::InvalidField("reason"))?;
    Ok((winner, reason))
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn decode_text(body: &[u8]) -> Result<String, ProtocolError> {
    std::str::from_utf8(body)
        .map(str::to_string)
        .map_err(|_| ProtocolError::InvalidText)
}

fn decode_byte(body: &[u8]) -> Result<u8, ProtocolError> {
    body.first().copied().ok_or(ProtocolError::Truncated)
}

fn read_u32_be(body: &[u8]) -> Result<u32, ProtocolError> {
    if body.len() < 4 {
        return Err(ProtocolError::Truncated);
    }
    Ok(u32::from_be_bytes([body[0], body[1], body[2], body[3]]))
}
