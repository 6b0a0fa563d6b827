use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ConfirmationPrompt, HttpItemService, RemoveOutcome, SubmitOutcome, SyncController,
};
use shared::domain::{Item, ItemId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;

use config::load_settings;
use prompt::{AssumeYes, StdinPrompt};

#[derive(Parser, Debug)]
#[command(name = "items", about = "Manage items on an item server")]
struct Args {
    /// Overrides `server_url` from the settings file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "items.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all items.
    List,
    /// Create a new item.
    Add { name: String },
    /// Rename an existing item.
    Rename { id: i64, name: String },
    /// Delete an item after confirmation.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config, |key| std::env::var(key).ok())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let service = HttpItemService::new(&settings.server_url, settings.request_timeout())?;
    info!(server_url = %service.base_url(), "using item server");
    let prompt: Arc<dyn ConfirmationPrompt> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(AssumeYes),
        _ => Arc::new(StdinPrompt),
    };
    let controller = SyncController::new(Arc::new(service), prompt);
    controller.refresh().await?;

    match args.command {
        Command::List => {}
        Command::Add { name } => {
            controller.begin_create();
            controller.set_draft(name);
            match controller.submit().await? {
                SubmitOutcome::Created(Some(item)) => println!("Created item {}", item.id),
                SubmitOutcome::Created(None) => println!("Created item"),
                SubmitOutcome::Updated(_) => {}
            }
        }
        Command::Rename { id, name } => {
            let item = controller
                .find(ItemId(id))
                .ok_or_else(|| anyhow!("item {id} not found"))?;
            controller.begin_edit(&item);
            controller.set_draft(name);
            controller.submit().await?;
            println!("Renamed item {id}");
        }
        Command::Delete { id, .. } => match controller.remove(ItemId(id)).await? {
            RemoveOutcome::Deleted => println!("Deleted item {id}"),
            RemoveOutcome::Cancelled => println!("Nothing deleted"),
        },
    }

    print_items(&controller.items());
    Ok(())
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    for item in items {
        println!("{:>5}  {}", item.id.0, item.name);
    }
}
