//! POS Inventory Intake - command line client
//!
//! Lists catalog data and submits intake drafts against the POS REST API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pos_intake_client::{ApiClient, ClientError, Config, IntakeDraft, IntakeSession, Services};
use shared::Category;

#[derive(Parser)]
#[command(name = "pos-intake", version, about = "Inventory intake for the POS catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog brands
    Brands,
    /// List the models (or accessories) of a brand
    Models {
        /// Brand name as listed by `brands`
        #[arg(short, long)]
        brand: String,
        #[arg(short, long, default_value = "mobile")]
        category: Category,
    },
    /// Submit an intake draft
    Submit {
        /// JSON draft file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        draft: PathBuf,
        /// Validate and print the payloads without sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pos_intake=info,pos_intake_client=info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    tracing::debug!("Environment: {}", config.environment);

    let api = Arc::new(ApiClient::new(&config.api)?);
    let services = Services::from_one(api);
    let owner_id = config.intake.owner_id.as_deref();

    match cli.command {
        Commands::Brands => {
            let session = IntakeSession::open(services, Category::Mobile, owner_id).await;
            for brand in session.brands() {
                println!("{}\t{}", brand.id, brand.name);
            }
        }
        Commands::Models { brand, category } => {
            let mut session = IntakeSession::open(services, category, owner_id).await;
            session.select_brand_by_name(&brand).await?;
            for variant in session.state().selection().model_suggestions("") {
                println!("{}\t{}", variant.id(), variant.label());
            }
        }
        Commands::Submit { draft, dry_run } => {
            let text = std::fs::read_to_string(&draft)?;
            let draft = IntakeDraft::from_json(&text)?;
            let mut session = IntakeSession::open(services, draft.category, owner_id).await;
            draft.apply(&mut session).await?;

            if dry_run {
                let payloads = session.preview().map_err(report_validation)?;
                println!("{}", serde_json::to_string_pretty(&payloads)?);
                return Ok(());
            }

            let report = session.submit().await.map_err(report_validation)?;
            println!("{}", report.notification());
            for failed in &report.failed {
                eprintln!("  unit {}: {} - {}", failed.index + 1, failed.description, failed.error.message);
            }
            if !report.is_complete() {
                anyhow::bail!("{} of {} units failed", report.failed.len(), report.failed.len() + report.created.len());
            }
        }
    }

    Ok(())
}

/// Print field errors before handing the error to anyhow
fn report_validation(err: ClientError) -> anyhow::Error {
    if let ClientError::Validation(errors) = &err {
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field, message);
        }
    }
    err.into()
}
