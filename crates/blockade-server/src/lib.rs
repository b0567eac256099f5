//! blockade-server
//!
//! Multi-client async TCP server for the blockade session protocol.

pub mod config;
pub mod server;
pub mod types;

// these are internal modules, not re-exported
mod client;
mod lobby_task;
mod router;
