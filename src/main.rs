// src/main.rs

use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Select};
use lottery_picker::{
    config::Settings,
    file_utils::{get_app_data_dir, FileStore},
    selector, AppState, DrawOrchestrator, MemoryStore, PersistenceGateway,
};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

mod cli;
mod ui;

use crate::cli::Cli;

const MENU: &[&str] = &[
    "Draw",
    "Show entries",
    "Add entry",
    "Edit weight",
    "Edit all weights",
    "Reset all weights to 1",
    "Remove entry",
    "View history",
    "Export history (CSV)",
    "Clear history",
    "Reset everything",
    "Quit",
];

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run_app().await {
        eprintln!("\nApplication Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli_args = Cli::parse();
    let theme = ColorfulTheme::default();

    let mut settings = Settings::from_env();
    if let Some(dir) = &cli_args.data_dir {
        settings.data_dir = Some(PathBuf::from(shellexpand::tilde(dir).into_owned()));
    }
    if let Some(ms) = cli_args.delay_ms {
        settings.draw_delay = Duration::from_millis(ms);
    }

    let gateway = if cli_args.ephemeral {
        println!("Running without storage; nothing will be saved.");
        PersistenceGateway::new(MemoryStore::new())
    } else {
        let data_dir = get_app_data_dir(settings.data_dir.as_deref())?;
        log::info!("Using data directory '{}'", data_dir.display());
        PersistenceGateway::new(FileStore::new(data_dir))
    };

    let mut state = AppState::load(gateway);
    if cli_args.sample {
        let added = state.add_sample_entries();
        if added > 0 {
            println!("Added {} sample entries.", added);
        }
    }

    let orch = match cli_args.seed {
        Some(seed) => DrawOrchestrator::new(state, selector::seeded_source(seed), settings.draw_delay),
        None => DrawOrchestrator::new(state, selector::default_source(), settings.draw_delay),
    };

    ui::print_entries(orch.state().entries());

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU)
            .default(0)
            .interact_opt()?
            .unwrap_or(MENU.len() - 1);

        match MENU.get(choice).copied() {
            Some("Draw") => ui::draw(&orch).await?,
            Some("Show entries") => ui::print_entries(orch.state().entries()),
            Some("Add entry") => ui::add_entry(&orch, &theme)?,
            Some("Edit weight") => ui::edit_weight(&orch, &theme)?,
            Some("Edit all weights") => ui::edit_all_weights(&orch, &theme)?,
            Some("Reset all weights to 1") => ui::reset_weights(&orch, &theme)?,
            Some("Remove entry") => ui::remove_entry(&orch, &theme)?,
            Some("View history") => {
                let history = orch.state().history().records().to_vec();
                ui::view_history(&history, &theme)?;
            }
            Some("Export history (CSV)") => ui::export_history(&orch)?,
            Some("Clear history") => ui::clear_history(&orch, &theme)?,
            Some("Reset everything") => ui::reset_all(&orch, &theme)?,
            Some("Quit") | Some(_) | None => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}
