//! # Mock Administration Server
//!
//! A local server that speaks the remote administration protocol, for
//! exercising operator tooling without a real game server running.
//!
//! ## Behaviour
//!
//! - The first packet on a connection is expected to be a login. The right
//!   password is answered with the request's own id, a wrong one with `-1`.
//! - Commands from a logged-in session are answered by a [`network::Responder`],
//!   by default [`commands::default_response`].
//! - Commands before a login get the `-1` rejection.
//! - `stop` is answered and then shuts the listener down, the way a real
//!   server goes away after a graceful stop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rcon_server::network::AdminServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = AdminServer::bind("127.0.0.1:25575", "testpassword").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod network;
