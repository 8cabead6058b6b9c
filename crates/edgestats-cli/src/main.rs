//! CLI for edgestats: poll dataplane interface counters and serve the
//! update history to a management-plane poller.

mod commands;

use clap::{Parser, Subcommand};

use commands::AgentArgs;

#[derive(Parser)]
#[command(name = "edgestats")]
#[command(about = "edgestats: interface counter deltas for network-edge agents")]
#[command(version = edgestats_core::VERSION)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll counters on an interval and serve the history over HTTP
    Serve {
        #[command(flatten)]
        agent: AgentArgs,

        /// Bind address (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port (default from config: 9480)
        #[arg(long)]
        port: Option<u16>,

        /// Wait up to this many seconds for the dataplane before polling
        #[arg(long)]
        wait_dataplane: Option<f64>,
    },

    /// Run a fixed number of polls, then drain and print the history as JSON
    Poll {
        #[command(flatten)]
        agent: AgentArgs,

        /// Number of polls
        #[arg(long, default_value = "2")]
        count: usize,
    },

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        agent: AgentArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Serve {
            agent,
            host,
            port,
            wait_dataplane,
        } => commands::serve::run(&agent, host, port, wait_dataplane),
        Commands::Poll { agent, count } => commands::poll::run(&agent, count),
        Commands::Config { agent } => commands::config::run(&agent),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
