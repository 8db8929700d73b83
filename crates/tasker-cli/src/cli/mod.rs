//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tasker_core::{AuthGateway, SessionStore, TaskGateway, config};
use tasker_ui::Services;

mod commands;

#[derive(Parser)]
#[command(name = "tasker")]
#[command(version)]
#[command(about = "Track your tasks from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account; a verification code is emailed to you
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Confirm the pending sign-up with the emailed code
    Verify {
        /// 6-digit verification code
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Send the verification code again
    Resend,
    /// Log in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show who is logged in
    Whoami,
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Interactive mode
    Shell,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// all, pending, or completed
        #[arg(long, default_value = "all")]
        filter: String,
        /// newest, oldest, or name
        #[arg(long, default_value = "newest")]
        sort: String,
    },
    /// Add a task
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
        /// low, medium, or high
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },
    /// Change fields of a task
    Edit {
        #[arg(value_name = "TASK_ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// YYYY-MM-DD; an empty value clears the deadline
        #[arg(long)]
        deadline: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Mark a task completed
    Complete {
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
    /// Delete a task
    Delete {
        #[arg(value_name = "TASK_ID")]
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // logging is best effort
    let _log_guard = tasker_core::logging::init()
        .inspect_err(|e| eprintln!("Warning: logging disabled: {e:#}"))
        .ok();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => commands::auth::signup(services()?, name, email, password).await,
        Commands::Verify { code } => commands::auth::verify(services()?, code).await,
        Commands::Resend => commands::auth::resend(services()?).await,
        Commands::Login { email, password } => {
            commands::auth::login(services()?, email, password).await
        }
        Commands::Logout { yes } => commands::auth::logout(services()?, yes).await,
        Commands::Whoami => commands::auth::whoami(services()?).await,
        Commands::Tasks { command } => match command {
            TaskCommands::List { filter, sort } => {
                commands::tasks::list(services()?, &filter, &sort).await
            }
            TaskCommands::Add {
                name,
                description,
                deadline,
                priority,
            } => {
                let args = commands::tasks::AddArgs {
                    name,
                    description,
                    deadline,
                    priority,
                };
                commands::tasks::add(services()?, args).await
            }
            TaskCommands::Edit {
                id,
                name,
                description,
                deadline,
                priority,
            } => {
                let args = commands::tasks::EditArgs {
                    name,
                    description,
                    deadline,
                    priority,
                };
                commands::tasks::edit(services()?, id, args).await
            }
            TaskCommands::Complete { id } => commands::tasks::complete(services()?, id).await,
            TaskCommands::Delete { id, yes } => {
                commands::tasks::delete(services()?, id, yes).await
            }
        },
        Commands::Shell => commands::shell::run(services()?).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Gateways for commands that talk to the identity provider or task store.
fn services() -> Result<Services> {
    let config = config::Config::load().context("load config")?;
    let sessions = SessionStore::open_default().context("open session store")?;
    let auth = AuthGateway::from_config(&config.identity, sessions.clone())
        .context("configure identity provider")?;
    let tasks = TaskGateway::from_config(&config, sessions).context("configure task storage")?;
    tracing::debug!(
        config = %config::paths::config_path().display(),
        storage = %tasks.mode(),
        "Services ready"
    );
    Ok(Services { auth, tasks })
}
