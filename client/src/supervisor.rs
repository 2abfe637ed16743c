//! Operations a process supervisor or utility caller performs against a
//! running server: a liveness check on the game port, a graceful stop, and
//! one-off administrative commands.
//!
//! Each call opens its own session and closes it before returning, whatever
//! the outcome. Nothing here retries; a failed `stop` is reported, not resent.

use crate::error::{CommandError, ConnectError};
use crate::network::RconClient;
use log::{debug, info, warn};
use rcon_protocol::{
    DEFAULT_GAME_PORT, DEFAULT_HOST, DEFAULT_RCON_PORT, DEFAULT_TIMEOUT, LIVENESS_TIMEOUT,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;

/// Permissions handed out by [`grant_permissions`].
const GRANTED_PERMISSIONS: [&str; 2] = ["*", "luckperms.autoop"];

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("server is not running on {0}")]
    NotRunning(String),

    #[error("could not open admin session: {0}")]
    Connect(#[from] ConnectError),

    #[error("command failed: {0}")]
    Command(#[from] CommandError),

    #[error("no username provided")]
    InvalidUsername,
}

/// Addresses and credentials for one local server.
#[derive(Debug, Clone)]
pub struct ServerTarget {
    pub host: String,
    pub game_port: u16,
    pub rcon_port: u16,
    pub password: String,
    pub timeout: Duration,
}

impl ServerTarget {
    pub fn new(password: impl Into<String>) -> Self {
        ServerTarget {
            host: DEFAULT_HOST.to_string(),
            game_port: DEFAULT_GAME_PORT,
            rcon_port: DEFAULT_RCON_PORT,
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn game_addr(&self) -> String {
        format!("{}:{}", self.host, self.game_port)
    }

    async fn open_session(&self) -> Result<RconClient, ConnectError> {
        RconClient::connect_timeout(&self.host, self.rcon_port, &self.password, self.timeout).await
    }
}

/// How the admin port answered during a status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAccess {
    Unreachable,
    Rejected,
    Ready,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub host: String,
    pub game_port: u16,
    pub rcon_port: u16,
    pub running: bool,
    pub admin: AdminAccess,
    pub players: Option<String>,
}

/// True if something accepts TCP connections on `host:port` within `timeout`.
pub async fn is_server_running(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

async fn ensure_running(target: &ServerTarget) -> Result<(), SupervisorError> {
    if is_server_running(&target.host, target.game_port, LIVENESS_TIMEOUT).await {
        Ok(())
    } else {
        Err(SupervisorError::NotRunning(target.game_addr()))
    }
}

/// Runs one command in a fresh session and returns the server's reply.
pub async fn send_command(target: &ServerTarget, command: &str) -> Result<String, SupervisorError> {
    ensure_running(target).await?;

    let mut client = target.open_session().await?;
    let result = client.execute(command).await;
    client.close().await;

    Ok(result?)
}

/// Asks the server to shut itself down.
pub async fn stop_server(target: &ServerTarget) -> Result<String, SupervisorError> {
    info!("Stopping server on {}", target.game_addr());
    let reply = send_command(target, "stop").await?;
    info!("Stop command sent");
    Ok(reply)
}

/// Grants a player every permission through LuckPerms, returning each reply.
pub async fn grant_permissions(
    target: &ServerTarget,
    username: &str,
) -> Result<Vec<String>, SupervisorError> {
    let username = username.trim();
    if username.is_empty() || username.contains(char::is_whitespace) {
        return Err(SupervisorError::InvalidUsername);
    }
    ensure_running(target).await?;

    let mut client = target.open_session().await?;
    let mut replies = Vec::with_capacity(GRANTED_PERMISSIONS.len());
    for permission in GRANTED_PERMISSIONS {
        let command = format!("lp user {} permission set {} true", username, permission);
        match client.execute(&command).await {
            Ok(reply) => replies.push(reply),
            Err(e) => {
                client.close().await;
                return Err(e.into());
            }
        }
    }
    client.close().await;

    info!("Permissions granted to {}", username);
    Ok(replies)
}

/// Checks the game port, then tries a session on the admin port.
pub async fn status(target: &ServerTarget) -> ServerStatus {
    let running = is_server_running(&target.host, target.game_port, LIVENESS_TIMEOUT).await;

    let (admin, players) = match target.open_session().await {
        Ok(mut client) => {
            let players = match client.execute("list").await {
                Ok(reply) => Some(reply),
                Err(e) => {
                    debug!("Player list unavailable: {}", e);
                    None
                }
            };
            client.close().await;
            (AdminAccess::Ready, players)
        }
        Err(ConnectError::AuthenticationFailed) => {
            warn!("Admin port on {}:{} rejected the password", target.host, target.rcon_port);
            (AdminAccess::Rejected, None)
        }
        Err(e) => {
            debug!("Admin port unreachable: {}", e);
            (AdminAccess::Unreachable, None)
        }
    };

    ServerStatus {
        host: target.host.clone(),
        game_port: target.game_port,
        rcon_port: target.rcon_port,
        running,
        admin,
        players,
    }
}
