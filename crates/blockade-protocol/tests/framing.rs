//! Frame codec and stream reassembly behavior.

use blockade_protocol::frame::{FrameAssembler, Message, HEADER_LEN};
use blockade_protocol::opcode::OpCode;
use blockade_protocol::payload;

fn drain(assembler: &mut FrameAssembler) -> Vec<Message> {
    let mut out = Vec::new();
    while let Some(msg) = assembler.next_message() {
        out.push(msg);
    }
    out
}

#[test]
fn round_trip_preserves_opcode_and_body() {
    let cases: Vec<Message> = vec![
        Message::new(OpCode::SearchRoom, Vec::new()),
        Message::new(OpCode::Login, b"HERO".to_vec()),
        Message::new(OpCode::GameStart, 0xDEAD_BEEFu32.to_be_bytes().to_vec()),
        Message::new(OpCode::CreateRoom, vec![0xFF; 1024]),
    ];

    for original in cases {
        let mut assembler = FrameAssembler::new();
        assembler.push(&original.encode());

        let decoded = drain(&mut assembler);
        assert_eq!(decoded, vec![original]);
        assert_eq!(assembler.pending(), 0);
    }
}

#[test]
fn login_frame_layout_matches_the_wire_format() {
    // [LEN=5][CMD=0x01][H E R O]
    let encoded = payload::login("HERO").encode();
    assert_eq!(encoded, b"\x00\x05\x01HERO");
}

#[test]
fn split_frame_is_reassembled() {
    // A LOGIN frame for "TESTUSER" delivered in two chunks: nothing must
    // come out until the tail arrives, then exactly one correct message.
    let full = payload::login("TESTUSER").encode();
    assert_eq!(full.len(), HEADER_LEN + 1 + "TESTUSER".len());

    let mut assembler = FrameAssembler::new();

    assembler.push(&full[..4]);
    assert!(assembler.next_message().is_none());

    assembler.push(&full[4..]);
    let messages = drain(&mut assembler);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].opcode, OpCode::Login as u8);
    assert_eq!(messages[0].body, b"TESTUSER");
}

#[test]
fn fragmentation_does_not_change_the_message_sequence() {
    let frames = [
        payload::login("alice"),
        payload::join_room(7),
        payload::player_move(3),
        payload::game_over(1200),
    ];

    let mut stream = Vec::new();
    for frame in &frames {
        stream.extend_from_slice(&frame.encode());
    }

    // Whole stream at once.
    let mut whole = FrameAssembler::new();
    whole.push(&stream);
    let expected = drain(&mut whole);
    assert_eq!(expected.len(), frames.len());

    // Byte-by-byte delivery must yield the identical ordered sequence.
    let mut trickle = FrameAssembler::new();
    let mut got = Vec::new();
    for byte in &stream {
        trickle.push(std::slice::from_ref(byte));
        got.extend(drain(&mut trickle));
    }
    assert_eq!(got, expected);

    // As must an arbitrary uneven chunking.
    let mut chunked = FrameAssembler::new();
    let mut got = Vec::new();
    for chunk in stream.chunks(5) {
        chunked.push(chunk);
        got.extend(drain(&mut chunked));
    }
    assert_eq!(got, expected);
}

#[test]
fn one_receive_may_carry_many_frames() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&payload::toggle_ready().encode());
    stream.extend_from_slice(&payload::attack(2).encode());

    let mut assembler = FrameAssembler::new();
    assembler.push(&stream);

    let messages = drain(&mut assembler);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].opcode, OpCode::ToggleReady as u8);
    assert_eq!(messages[1].opcode, OpCode::Attack as u8);
}

#[test]
fn zero_length_payload_is_skipped_not_fatal() {
    let mut stream = vec![0x00, 0x00]; // length 0: no opcode byte
    stream.extend_from_slice(&payload::leave_room().encode());

    let mut assembler = FrameAssembler::new();
    assembler.push(&stream);

    let messages = drain(&mut assembler);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].opcode, OpCode::LeaveRoom as u8);
}

#[test]
fn unknown_opcodes_still_decode_as_frames() {
    let mut assembler = FrameAssembler::new();
    assembler.push(&[0x00, 0x02, 0x7F, 0xAB]);

    let messages = drain(&mut assembler);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].opcode, 0x7F);
    assert_eq!(messages[0].body, vec![0xAB]);
    assert!(OpCode::from_u8(0x7F).is_none());
}
