//! # Remote Administration Client
//!
//! Client library for a game server's admin port: open an authenticated
//! session, run text commands over it, and close it again. On top of that sit
//! the few operations an operator tool needs against a local server.
//!
//! ## Session Model
//!
//! A session is an explicitly constructed [`RconClient`] value owned by the
//! caller. There is no shared global connection; code that needs two
//! concurrent conversations opens two sessions.
//!
//! ```text
//! connect ──► Connected ──authenticate──► Ready ──execute──► Ready ... ──close──► Closed
//!                 │                                  │
//!                 └──────── any failure ─────────────┴────────────────────────► Closed
//! ```
//!
//! Every request is followed by reading its reply before anything else is
//! sent, and every wait is bounded by the session's timeout (five seconds by
//! default). Nothing is retried automatically: a `stop` that could not be
//! confirmed is reported to the caller, never sent twice.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! The [`RconClient`] session type: connecting, the login exchange, command
//! execution and closing.
//!
//! ### Error Module (`error`)
//! [`ConnectError`] for opening a session and [`CommandError`] for a single
//! command, each mapping framing failures onto what the caller can act on.
//!
//! ### Supervisor Module (`supervisor`)
//! Liveness probing of the game port, graceful stop, one-off commands,
//! permission grants and a status report, each in its own short session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rcon_client::RconClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RconClient::connect("127.0.0.1", 25575, "testpassword").await?;
//!
//!     let players = client.execute("list").await;
//!     client.close().await;
//!
//!     println!("{}", players?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod network;
pub mod supervisor;

pub use error::{CommandError, ConnectError};
pub use network::{RconClient, SessionState};
