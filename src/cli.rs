use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "PractiScore live leaderboard")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Poll scoring devices and serve the leaderboard
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        /// Device to poll: ID=HOST[:PORT], HOST[:PORT] or ID=file:DEF[,SCORES]
        #[arg(short, long = "device")]
        devices: Vec<String>,
        /// Ticks between polls of a healthy device
        #[arg(long, default_value_t = 10)]
        poll_interval: u32,
        /// Poll intervals a failed device sits out
        #[arg(long, default_value_t = 6)]
        backoff: u32,
        /// Device read timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
        /// Scheduler tick in milliseconds
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        /// Stop when a device reports this match id
        #[arg(long)]
        shutdown_match: Option<String>,
        /// Division display substitution, FROM=TO
        #[arg(long = "division-name", value_parser = parse_substitution)]
        division_names: Vec<(String, String)>,
        /// Stage display substitution, FROM=TO
        #[arg(long = "stage-name", value_parser = parse_substitution)]
        stage_names: Vec<(String, String)>,
        /// Name announced to devices in status requests
        #[arg(long)]
        client_name: Option<String>,
    },
    /// Read status and match documents from one device and print a summary
    Inspect {
        /// Device: ID=HOST[:PORT], HOST[:PORT] or ID=file:DEF[,SCORES]
        device: String,
        /// Read timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_substitution(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(format!("expected FROM=TO, got '{}'", value)),
    }
}
