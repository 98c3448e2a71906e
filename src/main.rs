use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use quotegrabs::configuration::config::Config;
use quotegrabs::configuration::types::BackendKind;
use quotegrabs::error_handling::types::CommandError;
use quotegrabs::irc::IrcMessage;
use quotegrabs::{QuoteGrabs, Reply};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quotegrabs")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and edit per-channel quote grab stores")]
struct Args {
    /// TOML configuration file; built-in defaults are used when absent
    #[arg(short, long, env = "QUOTEGRABS_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `storage.backend` from the configuration
    #[arg(short, long)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Action {
    /// Show the grab with the given id
    Get { channel: String, id: i64 },
    /// Show the latest grab of a nick
    Quote { channel: String, nick: String },
    /// List the grabs of a nick, newest first
    List { channel: String, nick: String },
    /// Show a random grab, optionally only from one nick
    Random { channel: String, nick: Option<String> },
    /// Search grabs for a piece of text
    Search { channel: String, text: String },
    /// Remove a grab, the newest one by default
    Ungrab { channel: String, id: Option<i64> },
    /// Store a message as a grab
    Add {
        channel: String,
        /// Speaker as `nick!user@host`
        prefix: String,
        text: String,
        #[arg(short, long, default_value = "quotegrabs")]
        grabber: String,
    },
}

fn load_config(args: &Args) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Importing configuration from {}", path.display());
            Config::from_file(path).map_err(|e| e.to_string())?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    if let Some(backend) = args.backend {
        config.storage.backend = backend;
    }
    Ok(config)
}

fn run(qg: &QuoteGrabs, action: &Action) -> Result<Reply, CommandError> {
    match action {
        Action::Get { channel, id } => qg.get(channel, *id),
        Action::Quote { channel, nick } => qg.quote(channel, nick),
        Action::List { channel, nick } => qg.list(channel, nick),
        Action::Random { channel, nick } => qg.random(channel, nick.as_deref()),
        Action::Search { channel, text } => qg.search(channel, text),
        Action::Ungrab { channel, id } => qg.ungrab(channel, *id),
        Action::Add {
            channel,
            prefix,
            text,
            grabber,
        } => qg.add(channel, &IrcMessage::privmsg(prefix, channel, text.as_str()), grabber),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        error!("Unable to import configuration: {}", e);
        std::process::exit(1);
    });

    let qg = QuoteGrabs::new(config);
    let result = run(&qg, &args.command);
    qg.close();

    match result {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
