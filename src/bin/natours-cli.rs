use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use natours::client::{PrintNavigator, SignupClient, SignupData, SignupOutcome, TerminalAlerts};

#[derive(Parser)]
#[command(name = "natours-cli")]
#[command(about = "Command line client for the Natours server", long_about = None)]
struct Cli {
    #[arg(short, long, env = "NATOURS_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        password_confirm: Option<String>,
    },
    /// List tours, optionally with a raw query such as "difficulty=easy&sort=price"
    Tours {
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
            password_confirm,
        } => {
            let base = url::Url::parse(&cli.url)?;
            let client = SignupClient::new(
                &cli.url,
                Arc::new(TerminalAlerts),
                Arc::new(PrintNavigator::new(base)),
            )?;
            let data = SignupData {
                name,
                email,
                password_confirm: password_confirm.unwrap_or_else(|| password.clone()),
                password,
            };

            match client.signup(&data).await {
                SignupOutcome::Success { navigation } => navigation.await?,
                SignupOutcome::Rejected { .. } => std::process::exit(1),
            }
        }
        Commands::Tours { query } => {
            let mut url = url::Url::parse(&cli.url)?.join("/api/v1/tours")?;
            url.set_query(query.as_deref());

            let res = reqwest::get(url).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {status}");
    }
    println!("{}", format_body(&text));
    Ok(())
}

/// Pretty-print JSON bodies. Anything else, such as the plain-text
/// rate-limit rejection, is shown as sent.
fn format_body(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| serde_json::to_string_pretty(&body).ok())
        .unwrap_or_else(|| text.to_owned())
}
