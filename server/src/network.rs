//! Listener and per-connection sessions for the mock admin server.

use crate::commands::default_response;
use log::{debug, error, info, warn};
use rcon_protocol::{packet_type, read_packet, write_packet, FrameError, Packet, AUTH_FAILURE_ID};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

/// Produces the reply text for an authenticated command.
pub type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What every session needs from the server that accepted it.
struct Shared {
    password: String,
    responder: Responder,
    shutdown: Arc<Notify>,
}

/// A local stand-in for a game server's admin port.
///
/// Each accepted connection is served on its own task. A `stop` command from
/// an authenticated session is answered and then ends [`AdminServer::run`],
/// which closes the listener.
pub struct AdminServer {
    listener: TcpListener,
    password: String,
    responder: Responder,
    shutdown: Arc<Notify>,
}

/// Ends a running [`AdminServer`] from outside.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // A stored permit covers a call made before `run` starts waiting.
        self.shutdown.notify_one();
    }
}

impl AdminServer {
    pub async fn bind(addr: &str, password: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Admin server listening on {}", listener.local_addr()?);

        Ok(AdminServer {
            listener,
            password: password.to_string(),
            responder: Arc::new(default_response),
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Replaces the reply text for commands. `stop` still ends the server.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Accepts connections until stopped.
    pub async fn run(self) -> io::Result<()> {
        let shared = Arc::new(Shared {
            password: self.password,
            responder: self.responder,
            shutdown: Arc::clone(&self.shutdown),
        });

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!("Connection from {}", addr);
                            let shared = Arc::clone(&shared);
                            tokio::spawn(async move {
                                if let Err(e) = serve(stream, &shared).await {
                                    warn!("Session with {} ended: {}", addr, e);
                                }
                            });
                        }
                        Err(e) => error!("Error accepting connection: {}", e),
                    }
                }

                _ = self.shutdown.notified() => {
                    info!("Admin server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Answers packets on one connection until the peer hangs up.
async fn serve(mut stream: TcpStream, shared: &Shared) -> Result<(), FrameError> {
    let mut authenticated = false;

    loop {
        let request = match read_packet(&mut stream).await {
            Ok(packet) => packet,
            Err(FrameError::Closed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let mut stopping = false;
        let reply = match request.packet_type {
            packet_type::AUTH => {
                if request.payload == shared.password {
                    authenticated = true;
                    Packet::new(request.request_id, packet_type::AUTH_RESPONSE, "")
                } else {
                    warn!("Rejected login attempt");
                    authenticated = false;
                    Packet::new(AUTH_FAILURE_ID, packet_type::AUTH_RESPONSE, "")
                }
            }
            packet_type::EXEC_COMMAND if authenticated => {
                let command = request.payload.trim();
                info!("Command: {}", command);
                stopping = command == "stop";
                let output = truncate((shared.responder)(command));
                Packet::new(request.request_id, packet_type::RESPONSE_VALUE, output)
            }
            packet_type::EXEC_COMMAND => {
                warn!("Command before login");
                Packet::new(AUTH_FAILURE_ID, packet_type::AUTH_RESPONSE, "")
            }
            other => {
                warn!("Unknown packet type {}", other);
                Packet::new(
                    request.request_id,
                    packet_type::RESPONSE_VALUE,
                    format!("Unknown request {}", other),
                )
            }
        };

        write_packet(&mut stream, &reply).await?;

        if stopping {
            shared.shutdown.notify_one();
        }
    }
}

/// Cuts a reply down to what fits in one packet, on a char boundary.
fn truncate(mut text: String) -> String {
    text.retain(|c| c != '\0');
    if text.len() > rcon_protocol::MAX_PAYLOAD_LENGTH {
        let mut end = rcon_protocol::MAX_PAYLOAD_LENGTH;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}
