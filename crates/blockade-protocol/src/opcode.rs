//! Opcodes and wire-level result codes.
//!
//! This module defines:
//! - The operation identifier carried in the first payload byte of each
//!   frame, for both directions.
//! - Result codes for the `*_RESULT` and RESULT_NOTICE messages.
//!
//! The actual encode/decode logic lives in `frame` and `payload`.

/// Operation identifier, one byte per frame.
///
/// Request opcodes (client → server) and push/response opcodes
/// (server → client) share one numbering space. SEARCH_ROOM is used in
/// both directions: the request body is empty, the response body carries
/// the room list.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Authenticate with a nickname.
    Login = 0x01,

    /// Login outcome (0 = ok).
    LoginResult = 0x02,

    /// Request (empty body) / response (room list) for the lobby listing.
    SearchRoom = 0x10,

    /// Create a room with the given title.
    CreateRoom = 0x11,

    /// Create outcome plus the new room id.
    CreateRoomResult = 0x12,

    /// Join a room by id.
    JoinRoom = 0x13,

    /// Join outcome plus the assigned seat.
    JoinRoomResult = 0x14,

    /// Someone was seated (seat + nickname).
    EnterNotice = 0x15,

    /// Leave the current room.
    LeaveRoom = 0x16,

    /// Someone vacated a seat.
    LeaveNotice = 0x17,

    /// Request a replay of the current seat snapshot.
    RoomInfo = 0x18,

    /// Host: start if eligible; guest: flip ready flag.
    ToggleReady = 0x20,

    /// A seat's ready flag changed.
    ReadyNotice = 0x21,

    /// Match started; body carries the shared RNG seed.
    GameStart = 0x22,

    /// An input action to relay.
    Move = 0x30,

    /// Relayed action (seat + action byte).
    MoveNotice = 0x31,

    /// Cleared lines queued as an attack.
    Attack = 0x40,

    /// Attack applied (attacker, target, line count).
    GarbageNotice = 0x41,

    /// A player reports its own death with a final score.
    GameOver = 0x90,

    /// Match outcome (winner seat or none, plus reason).
    ResultNotice = 0x91,
}

impl OpCode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(OpCode::Login),
            0x02 => Some(OpCode::LoginResult),
            0x10 => Some(OpCode::SearchRoom),
            0x11 => Some(OpCode::CreateRoom),
            0x12 => Some(OpCode::CreateRoomResult),
            0x13 => Some(OpCode::JoinRoom),
            0x14 => Some(OpCode::JoinRoomResult),
            0x15 => Some(OpCode::EnterNotice),
            0x16 => Some(OpCode::LeaveRoom),
            0x17 => Some(OpCode::LeaveNotice),
            0x18 => Some(OpCode::RoomInfo),
            0x20 => Some(OpCode::ToggleReady),
            0x21 => Some(OpCode::ReadyNotice),
            0x22 => Some(OpCode::GameStart),
            0x30 => Some(OpCode::Move),
            0x31 => Some(OpCode::MoveNotice),
            0x40 => Some(OpCode::Attack),
            0x41 => Some(OpCode::GarbageNotice),
            0x90 => Some(OpCode::GameOver),
            0x91 => Some(OpCode::ResultNotice),
            _ => None,
        }
    }
}

/// Success code shared by LOGIN_RESULT and CREATE_ROOM_RESULT.
pub const RESULT_OK: u8 = 0;

/// Join outcome carried in the first byte of JOIN_ROOM_RESULT.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JoinResult {
    /// Seated; the second byte is the assigned seat.
    Ok = 0,

    /// No room with the requested id.
    NotFound = 1,

    /// Every seat is occupied.
    Full = 2,

    /// The room has an active match.
    InMatch = 3,
}

impl JoinResult {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(JoinResult::Ok),
            1 => Some(JoinResult::NotFound),
            2 => Some(JoinResult::Full),
            3 => Some(JoinResult::InMatch),
            _ => None,
        }
    }
}

/// Why a match concluded, carried in RESULT_NOTICE.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Deaths ran the match to completion (or the room emptied out).
    Normal = 0,

    /// Every other occupant left; the survivor wins outright.
    Walkover = 1,
}

impl EndReason {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(EndReason::Normal),
            1 => Some(EndReason::Walkover),
            _ => None,
        }
    }
}

/// Winner byte in RESULT_NOTICE meaning "no winner" (draw or abandoned).
pub const NO_WINNER: u8 = 255;

/// Maximum room title length on the wire.
///
/// Titles are length-prefixed with a single byte in the room listing, so
/// the cap is a hard protocol limit rather than a policy choice. Requests
/// carrying longer titles are dropped at the handler layer.
pub const MAX_TITLE_LEN: usize = 255;

/// A tiny helper for validating title lengths.
pub fn validate_title_len(len: usize) -> bool {
    len <= MAX_TITLE_LEN
}
