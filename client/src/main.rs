use clap::{Parser, Subcommand};
use log::{error, info};
use rcon_client::supervisor::{self, ServerTarget, SupervisorError};
use rcon_protocol::{DEFAULT_GAME_PORT, DEFAULT_HOST, DEFAULT_RCON_PORT};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Control a local game server over its admin port")]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Admin (RCON) port
    #[arg(short, long, default_value_t = DEFAULT_RCON_PORT)]
    port: u16,

    /// Game port, checked to decide whether the server is running
    #[arg(short, long, default_value_t = DEFAULT_GAME_PORT)]
    game_port: u16,

    /// Admin password
    #[arg(short = 'P', long)]
    password: String,

    /// Seconds to wait for a connection or a reply
    #[arg(short, long, default_value_t = 5)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether the server is up and the admin port accepts the password
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop the server gracefully
    Stop,
    /// Run an arbitrary admin command and print the reply
    #[command(name = "command")]
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Grant a player every permission through LuckPerms
    Grant { username: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let target = ServerTarget {
        host: args.host,
        game_port: args.game_port,
        rcon_port: args.port,
        password: args.password,
        timeout: Duration::from_secs(args.timeout_secs),
    };

    match run(&target, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(target: &ServerTarget, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Status { json } => {
            let report = supervisor::status(target).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Server:  {}:{}", report.host, report.game_port);
                println!("Running: {}", if report.running { "yes" } else { "no" });
                println!("Admin:   {:?} (port {})", report.admin, report.rcon_port);
                if let Some(players) = report.players {
                    println!("Players: {}", players);
                }
            }
        }

        Command::Stop => match supervisor::stop_server(target).await {
            Ok(reply) => println!("Stop command sent: {}", reply),
            Err(e) => {
                if let Some(hint) = stop_failure_hint(&e) {
                    eprintln!("{}", hint);
                }
                return Err(e.into());
            }
        },

        Command::Run { words } => {
            let line = words.join(" ");
            info!("Sending: {}", line);
            let reply = supervisor::send_command(target, &line).await?;
            println!("{}", reply);
        }

        Command::Grant { username } => {
            let replies = supervisor::grant_permissions(target, &username).await?;
            for reply in replies.iter().filter(|r| !r.is_empty()) {
                println!("  {}", reply);
            }
            println!("Permissions granted to {}", username);
            println!("Player should relog to receive op status");
        }
    }

    Ok(())
}

/// Extra guidance after a failed stop. `main` already prints the error itself.
fn stop_failure_hint(err: &SupervisorError) -> Option<&'static str> {
    match err {
        SupervisorError::NotRunning(_) | SupervisorError::InvalidUsername => None,
        SupervisorError::Connect(_) | SupervisorError::Command(_) => {
            Some("You may need to stop the server manually")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rcon", "-P", "secret", "stop"]).unwrap();
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 25575);
        assert_eq!(args.game_port, 25565);
        assert_eq!(args.timeout_secs, 5);
        assert!(matches!(args.command, Command::Stop));
    }

    #[test]
    fn test_command_words_are_kept_whole() {
        let args = Args::try_parse_from([
            "rcon", "-P", "pw", "command", "lp", "user", "Steve", "permission", "set", "*", "true",
        ])
        .unwrap();

        match args.command {
            Command::Run { words } => {
                assert_eq!(words.join(" "), "lp user Steve permission set * true")
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_password_required() {
        assert!(Args::try_parse_from(["rcon", "status"]).is_err());
    }

    #[test]
    fn test_stop_hint_only_when_server_may_still_be_up() {
        let not_running = SupervisorError::NotRunning("127.0.0.1:25565".to_string());
        assert_eq!(stop_failure_hint(&not_running), None);

        let rejected = SupervisorError::Connect(rcon_client::ConnectError::AuthenticationFailed);
        assert!(stop_failure_hint(&rejected).is_some());

        let timed_out = SupervisorError::Command(rcon_client::CommandError::Timeout(
            Duration::from_secs(5),
        ));
        assert!(stop_failure_hint(&timed_out).is_some());
    }
}
