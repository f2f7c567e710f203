//! Command line front end for the attribution engine.
//!
//! Drives the engine against the configured backend and prints observer callbacks,
//! which makes it handy for checking links and install referrers by hand.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a link as if the app had been opened with it
//! applink open "https://go.example.com/abc123"
//!
//! # Simulate a first install carrying a referrer
//! applink install --referrer "appsonair_app_link=go.example.com%2Fabc123"
//!
//! # Show the cached install referral
//! applink referral
//!
//! # Create a link
//! applink create --url https://example.com/product/1 --name "Spring sale" --prefix go.example.com
//!
//! # Forget the install and the cached referral
//! applink reset
//! ```
//!
//! # Environment Variables
//!
//! See [`applink::config`]. A `.env` file in the working directory is loaded first.

use applink::config;
use applink::domain::entities::{AttributionResult, NewAppLink, ReferralRecord};
use applink::domain::ports::{AppLinkObserver, ReferrerOutcome};
use applink::infrastructure::referrer::StaticReferrerSource;
use applink::runtime::Runtime;
use applink::telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Deep link attribution engine.
#[derive(Parser)]
#[command(name = "applink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle an inbound link and print the resolved link data
    Open {
        /// The link URI delivered to the app
        uri: String,

        /// Application package identifier used by the fallback
        #[arg(short, long, default_value = "com.example.app")]
        package: String,

        /// URL opened when the link cannot be handled
        #[arg(long)]
        fallback_url: Option<String>,

        /// Where the link came from (e.g. "push", "email")
        #[arg(long)]
        source: Option<String>,
    },

    /// Run install tracking and print the install referral
    Install(InstallArgs),

    /// Show the install referral cached by an earlier run
    Referral {
        /// Seconds to wait for a referral resolution
        #[arg(short, long, default_value_t = 1)]
        wait: u64,
    },

    /// Create a new app link
    Create(CreateArgs),

    /// Forget the counted install and the cached referral
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Args)]
#[group(multiple = false)]
struct InstallArgs {
    /// Raw install referrer string
    #[arg(short, long)]
    referrer: Option<String>,

    /// Simulate a platform without an install referrer facility
    #[arg(long)]
    unsupported: bool,

    /// Simulate an unreachable install referrer service
    #[arg(long)]
    unavailable: bool,

    /// Simulate a referrer service that dropped the connection
    #[arg(long)]
    disconnected: bool,
}

impl InstallArgs {
    fn outcome(&self) -> ReferrerOutcome {
        if self.unsupported {
            ReferrerOutcome::Unsupported
        } else if self.unavailable {
            ReferrerOutcome::Unavailable
        } else if self.disconnected {
            ReferrerOutcome::Disconnected
        } else {
            ReferrerOutcome::Ok(self.referrer.clone().unwrap_or_default())
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    /// Destination URL
    #[arg(long)]
    url: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Domain prefix the link is created under
    #[arg(long)]
    prefix: String,

    /// Custom short id (4-50 chars: a-z, 0-9, '-')
    #[arg(long)]
    short_id: Option<String>,

    /// Android fallback URL
    #[arg(long)]
    android_fallback: Option<String>,

    /// iOS fallback URL
    #[arg(long)]
    ios_fallback: Option<String>,

    /// Open in the browser instead of the app on both platforms
    #[arg(long)]
    browser_only: bool,
}

impl CreateArgs {
    fn into_new_link(self) -> NewAppLink {
        let mut link = NewAppLink::new(self.url, self.name, self.prefix);
        link.short_id = self.short_id;
        link.android_fallback_url = self.android_fallback;
        link.ios_fallback_url = self.ios_fallback;

        if self.browser_only {
            link.is_open_in_android_app = Some(false);
            link.is_open_in_ios_app = Some(false);
            link.is_open_in_browser_android = Some(true);
            link.is_open_in_browser_apple = Some(true);
        }

        link
    }
}

/// Prints observer callbacks to the terminal.
struct ConsoleObserver;

impl AppLinkObserver for ConsoleObserver {
    fn on_resolved(&self, uri: &str, payload: &Value) {
        println!("{} {}", "🔗 Link resolved:".green().bold(), uri.cyan());
        print_json(payload);
    }

    fn on_error(&self, uri: Option<&str>, message: &str) {
        println!(
            "{} {}",
            "❌ Link error:".red().bold(),
            uri.unwrap_or("-").cyan()
        );
        println!("  {}", message.red());
    }

    fn on_referral_ready(&self, payload: &Value) {
        println!("{}", "🎁 Referral ready".green().bold());
        print_json(payload);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init(&config.log_level, &config.log_format)?;
    config.print_summary();

    let referrer = match &cli.command {
        Commands::Install(args) => StaticReferrerSource::new(args.outcome()),
        _ => StaticReferrerSource::unsupported(),
    };

    let runtime = Runtime::build(&config, Arc::new(referrer), Arc::new(ConsoleObserver)).await?;

    match cli.command {
        Commands::Open {
            uri,
            package,
            fallback_url,
            source,
        } => {
            runtime
                .service()
                .handle_deep_link(
                    Some(&uri),
                    &package,
                    source.as_deref(),
                    fallback_url.as_deref(),
                )
                .await;
        }
        Commands::Install(_) => handle_install(&runtime, config.http_timeout()).await?,
        Commands::Referral { wait } => {
            handle_referral(&runtime, Duration::from_secs(wait)).await;
        }
        Commands::Create(args) => handle_create(&runtime, args).await?,
        Commands::Reset { yes } => handle_reset(&runtime, yes).await?,
    }

    runtime.shutdown().await
}

/// Runs install tracking to completion, then prints the referral it produced.
async fn handle_install(runtime: &Runtime, timeout: Duration) -> Result<()> {
    println!("{}", "📦 Install tracking".bright_blue().bold());
    println!();

    let install = runtime.service().initialize(None, "").await;
    install.await.context("Install tracking task failed")?;

    match runtime.service().get_referral_info_timeout(timeout).await {
        Some(record) => print_referral(&record),
        None => println!("{}", "  No install referral".yellow()),
    }

    Ok(())
}

async fn handle_referral(runtime: &Runtime, wait: Duration) {
    println!("{}", "🎁 Install referral".bright_blue().bold());
    println!();

    match runtime.service().get_referral_info_timeout(wait).await {
        Some(record) => print_referral(&record),
        None => {
            println!("{}", "  No referral cached".yellow());
            println!();
            println!(
                "  Run {} first",
                "applink install --referrer <REFERRER>".bright_cyan()
            );
        }
    }
}

async fn handle_create(runtime: &Runtime, args: CreateArgs) -> Result<()> {
    println!("{}", "✨ Create app link".bright_blue().bold());
    println!();

    let link = args.into_new_link();
    let result = runtime
        .service()
        .create_app_link(&link)
        .await
        .context("Link rejected")?;

    print_result(&result);
    Ok(())
}

/// Clears local state after confirmation (default: No).
async fn handle_reset(runtime: &Runtime, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Reset local state".bright_blue().bold());
    println!();
    println!("  Store: {}", runtime.store().root().display().to_string().cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Forget the counted install and the cached referral?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    runtime
        .store()
        .clear()
        .await
        .context("Failed to clear store")?;

    println!("{}", "✅ Local state cleared".green().bold());
    Ok(())
}

fn print_referral(record: &ReferralRecord) {
    let status = if record.is_resolved() {
        "RESOLVED".green()
    } else {
        "UNRESOLVED".yellow()
    };

    println!("  Link:    {}", record.referral_link.cyan());
    println!("  Status:  {}", status);
    println!("  Message: {}", record.message);
    print_json(&record.to_payload());
}

fn print_result(result: &AttributionResult) {
    let status = if result.is_ok() {
        result.status.as_str().green()
    } else {
        result.status.as_str().red()
    };

    println!("  Status:  {}", status);
    if !result.message.is_empty() {
        println!("  Message: {}", result.message);
    }
    if let Some(payload) = &result.payload {
        print_json(payload);
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            for line in text.lines() {
                println!("  {}", line.bright_black());
            }
        }
        Err(_) => println!("  {}", value),
    }
}
