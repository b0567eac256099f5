//! blockade-core
//!
//! Pure session-server logic:
//! - peer identity
//! - rooms and the room directory
//! - per-match game sessions
//! - the lobby coordinator (one handler per request opcode)
//!
//! Everything here is synchronous and transport-agnostic: outbound
//! traffic is queued into an [`Outbox`] and delivered by whoever owns
//! the sockets.

pub mod directory;
pub mod lobby;
pub mod outbox;
pub mod peer;
pub mod room;
pub mod session;

pub use directory::RoomDirectory;
pub use lobby::Lobby;
pub use outbox::Outbox;
pub use peer::{Peer, PeerId};
pub use room::{JoinRefusal, Occupant, Room, HOST_SEAT, MAX_SEATS};
pub use session::{GameSession, MatchOutcome};
