use clap::Parser;
use log::{error, info};
use rcon_protocol::{DEFAULT_HOST, DEFAULT_RCON_PORT};
use rcon_server::network::AdminServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local stand-in for a game server's admin port")]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Admin port to listen on
    #[arg(short, long, default_value_t = DEFAULT_RCON_PORT)]
    port: u16,

    /// Password sessions must log in with
    #[arg(short = 'P', long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let server = AdminServer::bind(&address, &args.password).await?;
    let shutdown = server.shutdown_handle();
    let server_handle = tokio::spawn(server.run());

    tokio::select! {
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Server stopped"),
                Ok(Err(e)) => error!("Server failed: {}", e),
                Err(e) => error!("Server task panicked: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            shutdown.shutdown();
        }
    }

    Ok(())
}
