//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tabs")]
#[command(version)]
#[command(about = "Terminal front-end for the tabs expense tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the backend API base URL from config
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the token pair
    Login {
        /// Account username
        #[arg(short, long)]
        username: Option<String>,
        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored token pair
    Logout,

    /// Create an account (a verification email is sent)
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Password (prompted twice when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Confirm an email address from the verification link
    VerifyEmail {
        /// The uidb64 segment of the link
        #[arg(value_name = "UID")]
        uid: String,
        /// The token segment of the link
        #[arg(value_name = "TOKEN")]
        token: String,
    },

    /// Re-send the verification email
    ResendVerification {
        #[arg(value_name = "EMAIL")]
        email: String,
    },

    /// OTP-based password reset
    ResetPassword {
        #[command(subcommand)]
        command: ResetPasswordCommands,
    },

    /// Show or update the signed-in profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Browse and manage expenses
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },

    /// Manage categories and their budgets
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ResetPasswordCommands {
    /// Email a one-time passcode
    Request {
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    /// Redeem the passcode for a new password
    Confirm {
        #[arg(value_name = "EMAIL")]
        email: String,
        /// The one-time passcode from the email
        #[arg(long)]
        otp: String,
        /// New password (prompted twice when omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Show the signed-in profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Path to a profile picture to upload
        #[arg(long, value_name = "FILE")]
        picture: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ExpenseCommands {
    /// List expenses, one page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
        /// Sort order: date, date-desc, amount, amount-desc
        #[arg(long)]
        sort: Option<String>,
        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        /// Latest date to include (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
    },
    /// Show a single expense
    Show {
        #[arg(value_name = "ID")]
        id: u64,
    },
    /// Record an expense
    Add {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Expense date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: String,
    },
    /// Update fields of an expense
    Edit {
        #[arg(value_name = "ID")]
        id: u64,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Delete an expense
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum CategoryCommands {
    /// List categories
    List,
    /// Create a category
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        /// Display color (hex)
        #[arg(long, default_value = "#64748b")]
        color: String,
        /// Monthly budget
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Update a category
    Edit {
        #[arg(value_name = "ID")]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        /// Remove the budget
        #[arg(long, conflicts_with = "budget")]
        no_budget: bool,
    },
    /// Delete a category
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so tables and prompts stay clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TABS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { username, password } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            commands::auth::login(&client, username, password).await
        }
        Commands::Logout => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            commands::auth::logout(&client)
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            commands::auth::register(&client, &username, &email, password).await
        }
        Commands::VerifyEmail { uid, token } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            commands::auth::verify_email(&client, &uid, &token).await
        }
        Commands::ResendVerification { email } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            commands::auth::resend_verification(&client, &email).await
        }
        Commands::ResetPassword { command } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            match command {
                ResetPasswordCommands::Request { email } => {
                    commands::auth::reset_request(&client, &email).await
                }
                ResetPasswordCommands::Confirm {
                    email,
                    otp,
                    password,
                } => commands::auth::reset_confirm(&client, &email, &otp, password).await,
            }
        }
        Commands::Profile { command } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            match command {
                ProfileCommands::Show => commands::profile::show(&client).await,
                ProfileCommands::Update {
                    username,
                    full_name,
                    gender,
                    picture,
                } => {
                    commands::profile::update(&client, username, full_name, gender, picture).await
                }
            }
        }
        Commands::Expenses { command } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            match command {
                ExpenseCommands::List {
                    page,
                    category,
                    sort,
                    from,
                    to,
                } => commands::expenses::list(&client, page, category, sort, from, to).await,
                ExpenseCommands::Show { id } => commands::expenses::show(&client, id).await,
                ExpenseCommands::Add {
                    amount,
                    category,
                    description,
                    date,
                } => commands::expenses::add(&client, &amount, &category, description, &date).await,
                ExpenseCommands::Edit {
                    id,
                    amount,
                    category,
                    description,
                    date,
                } => {
                    commands::expenses::edit(&client, id, amount, category, description, date)
                        .await
                }
                ExpenseCommands::Delete { id, yes } => {
                    commands::expenses::delete(&client, id, yes).await
                }
            }
        }
        Commands::Categories { command } => {
            let client = commands::build_client(cli.api_url.as_deref())?;
            match command {
                CategoryCommands::List => commands::categories::list(&client).await,
                CategoryCommands::Add {
                    name,
                    color,
                    budget,
                } => commands::categories::add(&client, &name, &color, budget).await,
                CategoryCommands::Edit {
                    id,
                    name,
                    color,
                    budget,
                    no_budget,
                } => {
                    commands::categories::edit(&client, id, name, color, budget, no_budget).await
                }
                CategoryCommands::Delete { id, yes } => {
                    commands::categories::delete(&client, id, yes).await
                }
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
