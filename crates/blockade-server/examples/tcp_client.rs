//! Interactive line-driven client for poking at a running server.
//!
//! Commands:
//!   login <nickname>
//!   list
//!   create <title>
//!   join <room id>
//!   leave
//!   info
//!   ready            (host: start the match if everyone is ready)
//!   move <action>
//!   attack <lines>
//!   gameover <score>
//!   quit

use std::env;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use blockade_protocol::frame::{Message, HEADER_LEN};
use blockade_protocol::opcode::OpCode;
use blockade_protocol::payload;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("BLOCKADE_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    println!("Connecting to {}...", addr);
    let mut stream = TcpStream::connect(&addr).await?;
    println!("Connected. Type 'login <nickname>' to begin; 'quit' to leave.\n");

    let stdin = io::stdin();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let n = stdin.read_line(&mut line)?;
        if n == 0 {
            println!("\nEOF on stdin, exiting client.");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        let msg = match parse_command(trimmed) {
            Some(m) => m,
            None => {
                eprintln!("Unrecognized command. See the header of this file for the list.");
                continue;
            }
        };

        stream.write_all(&msg.encode()).await?;

        // Drain whatever the server pushes back until it goes quiet for
        // a moment.
        loop {
            match timeout(Duration::from_millis(250), read_frame(&mut stream)).await {
                Ok(Ok(frame)) => print_frame(&frame),
                Ok(Err(err)) => {
                    eprintln!("Connection lost: {}", err);
                    return Ok(());
                }
                Err(_) => break, // quiet; back to the prompt
            }
        }
    }

    Ok(())
}

fn parse_command(line: &str) -> Option<Message> {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd {
        "login" if !rest.is_empty() => Some(payload::login(rest)),
        "list" => Some(payload::search_room()),
        "create" if !rest.is_empty() => Some(payload::create_room(rest)),
        "join" => rest.parse::<u16>().ok().map(payload::join_room),
        "leave" => Some(payload::leave_room()),
        "info" => Some(payload::room_info()),
        "ready" => Some(payload::toggle_ready()),
        "move" => rest.parse::<u8>().ok().map(payload::player_move),
        "attack" => rest.parse::<u8>().ok().map(payload::attack),
        "gameover" => rest.parse::<u32>().ok().map(payload::game_over),
        _ => None,
    }
}

/// Read one `[len][opcode][body]` frame off the stream.
async fn read_frame(stream: &mut TcpStream) -> io::Result<Message> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await?;

    let payload_len = u16::from_be_bytes(header) as usize;
    if payload_len == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "zero-length frame",
        ));
    }

    let mut payload_buf = vec![0u8; payload_len];
    stream.read_exact(&mut payload_buf).await?;

    Ok(Message {
        opcode: payload_buf[0],
        body: payload_buf[1..].to_vec(),
    })
}

fn print_frame(msg: &Message) {
    let Some(opcode) = OpCode::from_u8(msg.opcode) else {
        println!("<- unknown opcode {:#04x} ({} body bytes)", msg.opcode, msg.body.len());
        return;
    };

    match opcode {
        OpCode::LoginResult => match payload::decode_login_result(&msg.body) {
            Ok(0) => println!("<- logged in"),
            Ok(code) => println!("<- login refused (code {})", code),
            Err(err) => println!("<- bad LOGIN_RESULT: {}", err),
        },
        OpCode::SearchRoom => match payload::decode_room_list(&msg.body) {
            Ok(rooms) if rooms.is_empty() => println!("<- no rooms"),
            Ok(rooms) => {
                for room in rooms {
                    println!(
                        "<- room #{} \"{}\"{}",
                        room.id,
                        room.title,
                        if room.in_match { " [in match]" } else { "" }
                    );
                }
            }
            Err(err) => println!("<- bad room list: {}", err),
        },
        OpCode::CreateRoomResult => match payload::decode_create_room_result(&msg.body) {
            Ok((0, id)) => println!("<- created room #{}", id),
            Ok((code, _)) => println!("<- create refused (code {})", code),
            Err(err) => println!("<- bad CREATE_ROOM_RESULT: {}", err),
        },
        OpCode::JoinRoomResult => match payload::decode_join_room_result(&msg.body) {
            Ok((result, seat)) => println!("<- join: {:?}, seat {}", result, seat),
            Err(err) => println!("<- bad JOIN_ROOM_RESULT: {}", err),
        },
        OpCode::EnterNotice => match payload::decode_enter_notice(&msg.body) {
            Ok((seat, nickname)) => println!("<- \"{}\" seated at {}", nickname, seat),
            Err(err) => println!("<- bad ENTER_NOTICE: {}", err),
        },
        OpCode::LeaveNotice => match payload::decode_leave_notice(&msg.body) {
            Ok(seat) => println!("<- seat {} vacated", seat),
            Err(err) => println!("<- bad LEAVE_NOTICE: {}", err),
        },
        OpCode::ReadyNotice => match payload::decode_ready_notice(&msg.body) {
            Ok((seat, ready)) => println!("<- seat {} {}", seat, if ready { "ready" } else { "not ready" }),
            Err(err) => println!("<- bad READY_NOTICE: {}", err),
        },
        OpCode::GameStart => match payload::decode_game_start(&msg.body) {
            Ok(seed) => println!("<- match started, seed {:#010x}", seed),
            Err(err) => println!("<- bad GAME_START: {}", err),
        },
        OpCode::MoveNotice => match payload::decode_move_notice(&msg.body) {
            Ok((seat, action)) => println!("<- seat {} action {}", seat, action),
            Err(err) => println!("<- bad MOVE_NOTICE: {}", err),
        },
        OpCode::GarbageNotice => match payload::decode_garbage_notice(&msg.body) {
            Ok((attacker, target, lines)) => {
                println!("<- seat {} sent {} garbage lines to seat {}", attacker, lines, target)
            }
            Err(err) => println!("<- bad GARBAGE_NOTICE: {}", err),
        },
        OpCode::ResultNotice => match payload::decode_result_notice(&msg.body) {
            Ok((Some(winner), reason)) => println!("<- seat {} wins ({:?})", winner, reason),
            Ok((None, reason)) => println!("<- no winner ({:?})", reason),
            Err(err) => println!("<- bad RESULT_NOTICE: {}", err),
        },
        other => println!("<- unexpected push {:?}", other),
    }
}
