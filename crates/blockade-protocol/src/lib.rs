//! blockade-protocol
//!
//! Wire protocol for the blockade session server:
//! - opcodes and result codes
//! - frame codec and stream reassembly
//! - per-message body encoders/decoders

pub mod frame;
pub mod opcode;
pub mod payload;

pub use frame::{FrameAssembler, Message, HEADER_LEN, MAX_BODY_LEN};
pub use opcode::{EndReason, JoinResult, OpCode, NO_WINNER, RESULT_OK};
pub use payload::{ProtocolError, RoomSummary};
