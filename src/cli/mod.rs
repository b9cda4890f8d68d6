pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo CLI - drives the task API through the optimistic mutation pipeline")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "TODO_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the Todo API server"
    )]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Exchange a provider ID token for a session token")]
    Login {
        #[arg(help = "Identity provider credential (e.g. Google ID token)")]
        credential: String,
    },

    #[command(about = "Show the currently signed-in user")]
    Whoami {
        #[arg(long, env = "TODO_SESSION", help = "Session token from `todo login`")]
        token: String,
    },

    #[command(about = "List your tasks, newest first")]
    List {
        #[arg(long, env = "TODO_SESSION", help = "Session token from `todo login`")]
        token: String,
    },

    #[command(about = "Add a task")]
    Add {
        #[arg(help = "Task title")]
        title: String,
        #[arg(long, help = "Optional task description")]
        description: Option<String>,
        #[arg(long, env = "TODO_SESSION", help = "Session token from `todo login`")]
        token: String,
    },

    #[command(about = "Mark a task done (or not done without --done)")]
    Toggle {
        #[arg(help = "Task id")]
        id: String,
        #[arg(long, help = "Mark completed; omit to mark incomplete")]
        done: bool,
        #[arg(long, env = "TODO_SESSION", help = "Session token from `todo login`")]
        token: String,
    },

    #[command(about = "Delete a task")]
    Remove {
        #[arg(help = "Task id")]
        id: String,
        #[arg(long, env = "TODO_SESSION", help = "Session token from `todo login`")]
        token: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let base_url = cli.base_url.clone();

    match cli.command {
        Commands::Login { credential } => {
            commands::login(&base_url, &credential, output_format).await
        }
        Commands::Whoami { token } => commands::whoami(&base_url, &token, output_format).await,
        Commands::List { token } => commands::list(&base_url, &token, output_format).await,
        Commands::Add {
            title,
            description,
            token,
        } => commands::add(&base_url, &token, &title, description.as_deref(), output_format).await,
        Commands::Toggle { id, done, token } => {
            commands::toggle(&base_url, &token, &id, done, output_format).await
        }
        Commands::Remove { id, token } => {
            commands::remove(&base_url, &token, &id, output_format).await
        }
    }
}
