//! CLI for cluster operations

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "kvadm")]
#[command(about = "kvadm cluster administration CLI")]
#[command(version)]
struct Cli {
    /// Admin service URL
    #[arg(long, default_value = "http://localhost:7100")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Safely remove a failed server from the cluster
    RemoveServer {
        /// Server id (CRDN-* or PRMR-*)
        id: String,
    },

    /// Schedule a shard move between storage servers
    MoveShard {
        #[arg(long)]
        database: String,

        #[arg(long)]
        collection: String,

        #[arg(long)]
        shard: String,

        /// Current leader or follower for the shard
        #[arg(long)]
        from: String,

        /// Server that should take the shard over
        #[arg(long)]
        to: String,
    },

    /// Show cluster health as seen by the supervision
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let http = reqwest::Client::new();

    match cli.command {
        Commands::RemoveServer { id } => {
            let resp = http
                .post(format!("{}/admin/cluster/remove-server", cli.server))
                .json(&json!({ "server": id }))
                .send()
                .await?;
            let status = resp.status();
            let body: Value = resp.json().await?;
            if status.is_success() {
                println!(
                    "Removed {} after {} attempt(s)",
                    body["server"].as_str().unwrap_or(&id),
                    body["attempts"]
                );
            } else {
                eprintln!("Removal failed ({}):", status);
                eprintln!("  {}", body["error"].as_str().unwrap_or("unknown error"));
                if let Some(locations) = body["usage_locations"].as_array() {
                    for location in locations {
                        eprintln!("  still in use: {}", location.as_str().unwrap_or("?"));
                    }
                }
                std::process::exit(1);
            }
        }

        Commands::MoveShard {
            database,
            collection,
            shard,
            from,
            to,
        } => {
            let resp = http
                .post(format!("{}/admin/cluster/move-shard", cli.server))
                .json(&json!({
                    "database": database,
                    "collection": collection,
                    "shard": shard,
                    "fromServer": from,
                    "toServer": to,
                }))
                .send()
                .await?;
            let status = resp.status();
            let body: Value = resp.json().await?;
            if status.is_success() {
                println!("Scheduled move-shard job {}", body["id"]);
            } else {
                eprintln!(
                    "Move rejected ({}): {}",
                    status,
                    body["error"].as_str().unwrap_or("unknown error")
                );
                std::process::exit(1);
            }
        }

        Commands::Health => {
            let resp = http
                .get(format!("{}/admin/cluster/health", cli.server))
                .send()
                .await?;
            let body: Value = resp.json().await?;
            if let Some(servers) = body["servers"].as_object() {
                println!("Cluster health:");
                for (id, record) in servers {
                    println!(
                        "  {} {} ({})",
                        id,
                        record["Status"].as_str().unwrap_or("?"),
                        record["ShortName"].as_str().unwrap_or("-")
                    );
                }
            }
            println!(
                "  Plan shards: {}  Current shards: {}",
                body["plan_shards"], body["current_shards"]
            );
        }
    }

    Ok(())
}
