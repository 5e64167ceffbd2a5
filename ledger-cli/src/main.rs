use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use ledger_core::{Category, ExpenseDraft, Ledger, classify, summary};
use ledger_ingest::{DraftSource, ManualEntry};
use ledger_remote::{CarrierCredentials, Extractor, GeminiClient, SheetClient};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod export;
mod save;
mod settings;
mod state;

use save::{SaveOutcome, SyncStatus};
use state::StateDir;

#[derive(Parser, Debug)]
#[command(
    name = "ledger",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEDGER_BUILD_SHA"), ")"),
    about = "Smart Ledger: personal expense tracking"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one expense by hand
    Add {
        #[arg(long)]
        amount: String,

        #[arg(long)]
        description: String,

        #[arg(long, default_value = "")]
        merchant: String,

        /// Defaults to the merchant rules' guess
        #[arg(long)]
        category: Option<Category>,

        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Extract expenses from a receipt or invoice image
    Scan {
        image: PathBuf,

        /// MIME type (default: guessed from the extension)
        #[arg(long)]
        mime: Option<String>,

        /// Save without asking
        #[arg(long)]
        yes: bool,
    },

    /// Extract expenses from free text
    Parse {
        text: String,

        #[arg(long)]
        yes: bool,
    },

    /// Import invoices from a mobile barcode carrier
    Carrier {
        /// Call the e-invoice API even if config says mock
        #[arg(long)]
        live: bool,

        #[arg(long, default_value = "")]
        card_no: String,

        /// Carrier verification code
        #[arg(long, default_value = "")]
        card_code: String,

        #[arg(long)]
        yes: bool,
    },

    /// List expenses grouped by day, newest first
    List,

    /// Totals and per-category breakdown
    Summary,

    /// Delete one expense locally (sheet copies are not touched)
    Delete {
        id: String,

        #[arg(long)]
        yes: bool,
    },

    /// Export all expenses
    Export {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Sheet endpoint, API key, and config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml
    Init,
    /// Print current settings
    Show,
    /// Test an Apps Script URL and save it if the test passes
    SetSheet { url: String },
    /// Stop mirroring to the sheet
    ClearSheet,
    /// Store the Gemini API key
    SetKey,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LEDGER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let state = StateDir::open_default()?;
    let cfg = config::load_config(&state)?;
    let sheet = SheetClient::new();

    match cli.command {
        Command::Add {
            amount,
            description,
            merchant,
            category,
            date,
        } => {
            let category = category.unwrap_or_else(|| classify(&merchant, &description));
            let drafts = DraftSource::Manual(vec![ManualEntry {
                date,
                amount,
                category,
                description,
                merchant,
            }])
            .into_drafts(today());
            commit_and_report(&state, &sheet, drafts).await?;
        }

        Command::Scan { image, mime, yes } => {
            let bytes = std::fs::read(&image).with_context(|| format!("read {}", image.display()))?;
            let mime = match mime {
                Some(m) => m,
                None => guess_mime(&image)?.to_string(),
            };
            let extractor = gemini_client(&state, &cfg)?;
            let records = extractor
                .extract_image(&bytes, &mime)
                .await
                .context("could not read the image; retry or enter it manually")?;
            let drafts = DraftSource::Extracted(records).into_drafts(today());
            review_and_commit(&state, &sheet, drafts, yes, "No expense recognized in the image.").await?;
        }

        Command::Parse { text, yes } => {
            if text.trim().is_empty() {
                bail!("nothing to parse");
            }
            let extractor = gemini_client(&state, &cfg)?;
            let records = extractor
                .extract_text(&text)
                .await
                .context("could not parse the text")?;
            let drafts = DraftSource::Extracted(records).into_drafts(today());
            review_and_commit(&state, &sheet, drafts, yes, "No expense recognized in the text.").await?;
        }

        Command::Carrier {
            live,
            card_no,
            card_code,
            yes,
        } => {
            let client = cfg.carrier_client(live);
            let creds = CarrierCredentials::new(card_no, card_code);
            let drafts = client
                .fetch(&creds, Local::now())
                .await
                .context("carrier import failed")?;
            review_and_commit(&state, &sheet, drafts, yes, "No invoices found.").await?;
        }

        Command::List => {
            let ledger = state.load_ledger()?;
            print_list(&ledger);
        }

        Command::Summary => {
            let ledger = state.load_ledger()?;
            print_summary(&ledger);
        }

        Command::Delete { id, yes } => {
            let mut ledger = state.load_ledger()?;
            let Some(e) = ledger.get(&id) else {
                bail!("no expense with id {id}");
            };
            println!("{}", format_expense(e));
            if !yes && !auth::confirm("Delete this record? Copies already synced to the sheet must be removed by hand")? {
                println!("Kept.");
                return Ok(());
            }
            ledger.delete(&id)?;
            state.save_ledger(&ledger)?;
            println!("Deleted {id}");
        }

        Command::Export { csv } => {
            let ledger = state.load_ledger()?;
            let n = export::write_csv(&csv, ledger.expenses())?;
            println!("Wrote {n} expenses to {}", csv.display());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&state)?,
            ConfigCommand::Show => {
                println!("State dir: {}", state.root().display());
                match state.load_script_config()? {
                    Some(s) => println!("Sheet:     {}", s.script_url),
                    None => println!("Sheet:     (not configured)"),
                }
                let key = if auth::resolve_api_key(&state)?.is_some() { "set" } else { "missing" };
                println!("API key:   {key}");
                println!("Model:     {}", cfg.extraction.model);
                println!("Carrier:   {}", if cfg.carrier.mock { "mock" } else { "live" });
            }
            ConfigCommand::SetSheet { url } => {
                let saved = settings::set_sheet(&state, &sheet, &url).await?;
                println!("Connection OK. Sheet saved: {}", saved.script_url);
            }
            ConfigCommand::ClearSheet => {
                if state.clear_script_config()? {
                    println!("Sheet sync disabled.");
                } else {
                    println!("No sheet was configured.");
                }
            }
            ConfigCommand::SetKey => auth::paste_api_key(&state)?,
        },
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    Local::now().date_naive()
}

/// Fails early, before any request, when no key is available.
fn gemini_client(state: &StateDir, cfg: &config::Config) -> Result<GeminiClient> {
    let Some(key) = auth::resolve_api_key(state)? else {
        bail!(
            "no Gemini API key; run: ledger config set-key (or set {})",
            auth::API_KEY_ENV
        );
    };
    Ok(GeminiClient::new(cfg.gemini(Some(key))))
}

fn guess_mime(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => bail!("cannot guess MIME type of {}; pass --mime", path.display()),
    })
}

fn format_draft(i: usize, d: &ExpenseDraft) -> String {
    let mark = if d.is_committable() { " " } else { "!" };
    format!(
        "{mark}{:>2}. {} | {:>10} | {} | {} | {}",
        i + 1,
        d.date,
        d.amount,
        d.category.label(),
        d.description,
        d.merchant
    )
}

fn format_expense(e: &ledger_core::Expense) -> String {
    format!(
        "{} | {} | ${:.2} | {} | {} | {}",
        e.id,
        e.date,
        e.amount,
        e.category.label(),
        e.description,
        e.merchant
    )
}

async fn review_and_commit(
    state: &StateDir,
    sheet: &SheetClient,
    drafts: Vec<ExpenseDraft>,
    yes: bool,
    empty_message: &str,
) -> Result<()> {
    if drafts.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }

    println!("Drafts (! = missing amount or description, will be skipped):");
    for (i, d) in drafts.iter().enumerate() {
        println!("{}", format_draft(i, d));
    }

    if !yes && !auth::confirm(&format!("Save {} draft(s)?", drafts.len()))? {
        println!("Discarded.");
        return Ok(());
    }
    commit_and_report(state, sheet, drafts).await
}

async fn commit_and_report(state: &StateDir, sheet: &SheetClient, drafts: Vec<ExpenseDraft>) -> Result<()> {
    let mut ledger = state.load_ledger()?;
    let script = state.load_script_config()?;
    let SaveOutcome { saved, sync } =
        save::save_drafts(state, &mut ledger, drafts, script.as_ref(), sheet).await?;

    for e in &saved {
        println!("Saved {}", format_expense(e));
    }
    match sync {
        SyncStatus::NotConfigured => {}
        SyncStatus::Synced => println!("Synced {} record(s) to the sheet.", saved.len()),
        SyncStatus::Failed(reason) => {
            eprintln!("Saved locally, but sheet sync failed: {reason}");
        }
    }
    Ok(())
}

fn print_list(ledger: &Ledger) {
    if ledger.is_empty() {
        println!("No expenses yet. Add one with: ledger add --amount <n> --description <text>");
        return;
    }
    for day in summary::group_by_date(ledger.expenses()) {
        println!("{}  (total ${:.2})", day.date, day.total);
        for e in day.expenses {
            println!("  {}", format_expense(e));
        }
    }
}

fn print_summary(ledger: &Ledger) {
    let xs = ledger.expenses();
    let now = Local::now();
    println!("Total:      ${:.2}", summary::total(xs));
    println!(
        "This month: ${:.2}",
        summary::month_total(xs, now.year(), now.month())
    );
    println!("Records:    {}", xs.len());

    let by_cat = summary::by_category(xs);
    if !by_cat.is_empty() {
        println!("\nBy category:");
        for (cat, sum) in by_cat {
            println!("  {:<4} {:<13} ${:.2}", cat.label(), cat.as_str(), sum);
        }
    }
}
