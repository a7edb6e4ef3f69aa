use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "supplychain-cli")]
#[command(about = "CLI client for the supply-chain ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:3001)
    #[arg(long, global = true, default_value = "http://127.0.0.1:3001")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node's chain, pending pool and peers
    Chain,
    /// Create a transaction on the node and broadcast it to its peers
    Submit(SubmitArgs),
    /// Mine the pending pool into a new block
    Mine,
    /// Register a new node with this node and the rest of its network
    Register {
        /// URL of the node joining the network
        url: String,
    },
    /// Run longest-chain consensus against the node's peers
    Consensus,
}

#[derive(Args, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitArgs {
    #[arg(long)]
    sender: String,
    #[arg(long)]
    recipient: String,
    #[arg(long)]
    #[serde(rename = "productID")]
    product_id: String,
    #[arg(long)]
    product_type: String,
    #[arg(long)]
    quantity: u64,
    #[arg(long)]
    payment_mode: String,
    #[arg(long)]
    #[serde(rename = "paymentID")]
    payment_id: String,
    #[arg(long)]
    delivery_type: String,
    /// Order date, e.g. 2021-03-14
    #[arg(long)]
    order_date: String,
}

#[derive(Serialize)]
struct NewNode {
    #[serde(rename = "newNodeURL")]
    new_node_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = Client::new();
    let res = match cli.cmd {
        Command::Chain => client.get(format!("{node}/blockchain")).send().await?,
        Command::Submit(tx) => {
            client
                .post(format!("{node}/transactions/broadcast"))
                .json(&tx)
                .send()
                .await?
        }
        Command::Mine => client.get(format!("{node}/mine")).send().await?,
        Command::Register { url } => {
            client
                .post(format!("{node}/register-and-broadcast-node"))
                .json(&NewNode { new_node_url: url })
                .send()
                .await?
        }
        Command::Consensus => client.get(format!("{node}/consensus")).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, bytes = body.len(), "response received");
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
