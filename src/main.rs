use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use garage_admin::admin::{AdminService, HttpsCallable};
use garage_admin::config::{load_env_file, Config};
use garage_admin::console::{Dashboard, ListingsView, OutputFormat, UsersView};
use garage_admin::generator::{DummyDataGenerator, DEFAULT_COUNT};
use garage_admin::geocode::MapsLoader;
use garage_admin::identity::{Credential, FirebaseIdentity, IdentityGate, Session};
use garage_admin::models::USERS;
use garage_admin::store::{DocumentStore, FirestoreClient, MemoryStore};
use garage_admin::Repository;

/// Garage sale listings admin console.
#[derive(Parser, Debug)]
#[command(name = "garage-admin", about = "Garage sale listings admin console")]
struct Cli {
    /// Output format: table or json.
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the signed-in operator and their admin status.
    Whoami,

    /// Dashboard statistics.
    Stats,

    /// List user accounts.
    Users,

    /// Grant the admin role to a user.
    Promote {
        /// Uid of the user to promote.
        uid: String,
    },

    /// List garage sale listings, newest first.
    Listings,

    /// Delete a listing by id.
    DeleteListing {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Generate dummy listings owned by the seed users.
    Generate {
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: usize,
        /// Seed for reproducible listings.
        #[arg(long)]
        seed: Option<u64>,
        /// Write into an in-memory store instead of Firestore.
        #[arg(long)]
        dry_run: bool,
    },
}

fn credential(config: &Config) -> Result<Credential> {
    if let Some(token) = &config.google_id_token {
        return Ok(Credential::GoogleIdToken(token.clone()));
    }
    if let Some(token) = &config.refresh_token {
        return Ok(Credential::RefreshToken(token.clone()));
    }
    bail!("No operator credential: set GARAGE_ADMIN_GOOGLE_ID_TOKEN or GARAGE_ADMIN_REFRESH_TOKEN")
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_whoami(session: &Session, is_admin: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "uid": session.uid,
                "email": session.email,
                "displayName": session.display_name,
                "admin": is_admin,
            })
        ),
        OutputFormat::Table => {
            println!("Signed in as {} ({})", session.email, session.uid);
            if let Some(name) = &session.display_name {
                println!("   Name: {}", name);
            }
            println!("   Role: {}", if is_admin { "Admin" } else { "User" });
        }
    }
}

/// In-memory store holding just the operator, for previewing generated data
fn dry_run_store(session: &Session) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let operator = json!({
        "uid": session.uid,
        "email": session.email,
        "admin": session.claims.admin,
        "listings": [],
    });
    if let Some(fields) = operator.as_object() {
        store.insert(USERS, &session.uid, fields.clone());
    }
    store
}

#[tokio::main]
async fn main() -> Result<()> {
    // Read before the logger starts so `.env` can set RUST_LOG
    let env_file = load_env_file();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = env_file {
        warn!("Ignoring unreadable .env file: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::load();

    info!("🏷️  Garage Sale Admin");

    let provider = Arc::new(
        FirebaseIdentity::new(&config.firebase.api_key).context("Failed to create identity client")?,
    );
    let gate = Arc::new(IdentityGate::new(provider));
    let session = gate
        .sign_in(&credential(&config)?)
        .await
        .context("Sign-in failed")?;

    let firestore: Arc<dyn DocumentStore> = Arc::new(
        FirestoreClient::new(&config.firebase.project_id, gate.clone())
            .context("Failed to create Firestore client")?,
    );
    let repo = Repository::new(firestore.clone());
    if let Err(e) = repo.record_sign_in(&session).await {
        warn!("Error setting up user record: {}", e);
    }

    let is_admin = gate.admin_status().is_admin();
    if matches!(cli.command, Commands::Whoami) {
        print_whoami(&session, is_admin, cli.output);
        return Ok(());
    }
    if !is_admin {
        bail!("You must be an admin to access this panel.");
    }

    let functions = Arc::new(
        HttpsCallable::new(
            &config.firebase.functions_region,
            &config.firebase.project_id,
            gate.clone(),
        )
        .context("Failed to create functions client")?,
    );
    let admin = AdminService::new(gate.clone(), functions);

    let maps = MapsLoader::new(config.maps_api_key.clone());
    maps.load();

    match cli.command {
        Commands::Whoami => {}
        Commands::Stats => {
            println!("{}", Dashboard::load(&repo).await.render(cli.output));
        }
        Commands::Users => {
            println!("{}", UsersView::load(&repo).await.render(cli.output));
        }
        Commands::Promote { uid } => {
            let mut view = UsersView::load(&repo).await;
            view.promote(&admin, &uid)
                .await
                .context("Error making user admin")?;
            info!("✅ Successfully made {} an admin", uid);
            println!("{}", view.render(cli.output));
        }
        Commands::Listings => {
            println!("{}", ListingsView::load(&repo).await.render(cli.output));
        }
        Commands::DeleteListing { id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this listing?")? {
                info!("Delete cancelled");
                return Ok(());
            }
            let mut view = ListingsView::load(&repo).await;
            view.delete(&repo, &id)
                .await
                .context("Error deleting listing")?;
            println!("{}", view.render(cli.output));
        }
        Commands::Generate {
            count,
            seed,
            dry_run,
        } => {
            let store: Arc<dyn DocumentStore> = if dry_run {
                info!("Dry run: writing to an in-memory store");
                dry_run_store(&session)
            } else {
                firestore.clone()
            };
            let target = Repository::new(store.clone());

            let mut generator = DummyDataGenerator::new(store, maps.geocoder())
                .with_geocode_timeout(config.geocode_timeout);
            if let Some(seed) = seed {
                generator = generator.with_seed(seed);
            }

            let mut view = ListingsView::load(&target).await;
            let generated = view
                .generate(&target, &generator, gate.current_user().as_ref(), count)
                .await
                .context("Error generating dummy listings")?;

            info!("✅ Successfully generated {} dummy listings", generated.len());
            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&generated)?),
                OutputFormat::Table => println!("{}", view.render(cli.output)),
            }
        }
    }

    maps.unload();
    gate.sign_out();
    Ok(())
}
