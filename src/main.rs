use clap::Parser;
use mini_dns_wire::packet::RecordType;
use tracing::info;

#[derive(Parser)]
struct Cli {
    /// Domain name to look up
    name: String,

    #[arg(short = 't', long = "type", default_value = "A")]
    rtype: RecordType,

    /// Overrides DNS_SERVER
    #[arg(short, long)]
    server: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = mini_dns_wire::Config::from_env();
    if let Some(server) = cli.server {
        config.server_addr = server;
    }
    info!("config: {:?}", config);

    mini_dns_wire::run(config, &cli.name, cli.rtype).await
}
