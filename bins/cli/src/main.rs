//! Budgetly CLI
//!
//! Command-line front end for the Budgetly backend.

mod commands;
mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budgetly_client::{ApiClient, FileTokenStore, SessionContext};
use budgetly_shared::{AppConfig, BudgetPeriod};

#[derive(Parser, Debug)]
#[command(name = "budgetly", version, about = "Monthly budget planner")]
struct Cli {
    /// Work against a throwaway in-process store instead of the backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

/// Month/year selection, 1-based month as people write it.
#[derive(clap::Args, Debug, Clone, Copy)]
struct PeriodArgs {
    /// Month, 1-12 (default: current month)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,

    /// Year (default: current year)
    #[arg(long)]
    year: Option<i32>,
}

impl PeriodArgs {
    fn resolve(self) -> anyhow::Result<BudgetPeriod> {
        let current = BudgetPeriod::current();
        let month = self.month.map_or(current.month(), |m| m - 1);
        let year = self.year.unwrap_or(current.year());
        Ok(BudgetPeriod::new(month, year)?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account (log in separately afterwards)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the budget overview for a month
    Show {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Set the total budget for a month
    SetTotal {
        /// New total; non-numeric or negative input counts as 0
        amount: String,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Edit one category's items, e.g. `edit expenses rent=15000 internet=1000`
    Edit {
        /// expenses, debt or savings
        category: budgetly_core::budget::Category,
        /// `item=amount` pairs; unlisted items keep their saved value
        assignments: Vec<String>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Ask the budget assistant a question about a month's budget
    Chat {
        /// The question; omit to list suggested questions
        message: Vec<String>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Clear the assistant's chat history
    ChatClear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budgetly=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    debug!(base_url = %config.api.base_url, offline = cli.offline, "Configuration loaded");

    let token_path = config.storage.resolve_token_path()?;
    let session = SessionContext::new(Arc::new(FileTokenStore::new(token_path)));
    let api = ApiClient::new(&config.api, session)?;
    let app = commands::App::new(api, cli.offline);

    match cli.command {
        Command::Login { email, password } => app.login(&email, &password).await,
        Command::Register {
            email,
            password,
            name,
        } => app.register(&email, &password, &name).await,
        Command::Logout => app.logout(),
        Command::Whoami => app.whoami().await,
        Command::Show { period } => app.show(period.resolve()?).await,
        Command::SetTotal { amount, period } => app.set_total(period.resolve()?, &amount).await,
        Command::Edit {
            category,
            assignments,
            period,
        } => app.edit(category, period.resolve()?, &assignments).await,
        Command::Chat { message, period } => app.chat(period.resolve()?, &message.join(" ")).await,
        Command::ChatClear => app.chat_clear().await,
    }
}
