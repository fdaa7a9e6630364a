// src/ui.rs

use chrono::Utc;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use lottery_picker::{
    export, file_utils, history_manager::HistoryRecord, DrawOrchestrator, EntryStore,
    LotteryError,
};
use std::{env, error::Error};

/// Parses a weight typed by the user. Blank input yields `default` when one is given.
pub fn parse_weight(input: &str, default: Option<f64>) -> Result<f64, String> {
    let input = input.trim();
    match (input.is_empty(), default) {
        (true, Some(weight)) => Ok(weight),
        (true, None) => Err("Weight is required.".to_string()),
        _ => input
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number.", input)),
    }
}

fn pause(theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    Input::<String>::with_theme(theme)
        .with_prompt("Press Enter to continue...")
        .allow_empty(true)
        .interact()?;
    Ok(())
}

/// Prints the pool with each entry's current chance of winning.
pub fn print_entries(entries: &EntryStore) {
    if entries.is_empty() {
        println!("\n--- No entries yet, add one first ---");
        return;
    }
    println!("\n--- Entries ({}) ---", entries.len());
    for (entry, percent) in entries.probabilities() {
        println!("  {:<24} weight: {:<8} chance: {:.1}%", entry.name, entry.weight, percent);
    }
}

/// Lets the user pick one entry. Returns its id, or `None` on Esc / empty pool.
fn pick_entry(
    entries: &EntryStore,
    prompt: &str,
    theme: &ColorfulTheme,
) -> Result<Option<u64>, Box<dyn Error>> {
    if entries.is_empty() {
        println!("No entries yet.");
        return Ok(None);
    }
    let items: Vec<String> = entries
        .list()
        .iter()
        .map(|e| format!("{} (weight {})", e.name, e.weight))
        .collect();
    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(selection.and_then(|i| entries.list().get(i)).map(|e| e.id))
}

pub fn add_entry(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Entry name")
        .allow_empty(true)
        .interact_text()?;
    let raw_weight: String = Input::with_theme(theme)
        .with_prompt("Weight")
        .default("1".to_string())
        .interact_text()?;

    let weight = match parse_weight(&raw_weight, Some(1.0)) {
        Ok(weight) => weight,
        Err(msg) => {
            println!("{}", msg);
            return Ok(());
        }
    };

    match orch.state().add_entry(&name, weight) {
        Ok(entry) => println!("Added '{}'.", entry.name),
        Err(e) => println!("Could not add entry: {}", e),
    }
    Ok(())
}

pub fn remove_entry(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    let entries = orch.state().entries().clone();
    let Some(id) = pick_entry(&entries, "Remove which entry? (Esc to go back)", theme)? else {
        return Ok(());
    };
    if !Confirm::with_theme(theme)
        .with_prompt("Remove this entry?")
        .default(false)
        .interact()?
    {
        return Ok(());
    }
    if let Some(removed) = orch.state().remove_entry(id) {
        println!("Removed '{}'.", removed.name);
    }
    Ok(())
}

pub fn edit_weight(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    let entries = orch.state().entries().clone();
    let Some(id) = pick_entry(&entries, "Edit which entry? (Esc to go back)", theme)? else {
        return Ok(());
    };
    let current = entries.get(id).map(|e| e.weight).unwrap_or(1.0);
    let raw: String = Input::with_theme(theme)
        .with_prompt("New weight")
        .default(current.to_string())
        .interact_text()?;

    let result = parse_weight(&raw, None).and_then(|weight| {
        orch.state()
            .set_weight(id, weight)
            .map_err(|e| e.to_string())
    });
    match result {
        Ok(()) => println!("Weight updated."),
        Err(msg) => println!("Weight unchanged: {}", msg),
    }
    Ok(())
}

/// Walks every entry and asks for a new weight; invalid answers are skipped.
pub fn edit_all_weights(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    let entries = orch.state().entries().clone();
    if entries.is_empty() {
        println!("Add entries first.");
        return Ok(());
    }

    let mut edits = Vec::with_capacity(entries.len());
    for entry in entries.list() {
        let raw: String = Input::with_theme(theme)
            .with_prompt(format!("Weight for '{}'", entry.name))
            .default(entry.weight.to_string())
            .interact_text()?;
        if let Ok(weight) = parse_weight(&raw, Some(entry.weight)) {
            edits.push((entry.id, weight));
        }
    }

    let changed = orch.state().apply_weights(&edits);
    println!("{} weight(s) changed.", changed);
    Ok(())
}

pub fn reset_weights(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    if Confirm::with_theme(theme)
        .with_prompt("Reset every weight to 1?")
        .default(false)
        .interact()?
    {
        orch.state().reset_all_weights();
        println!("All weights reset to 1.");
    }
    Ok(())
}

/// Runs one draw, showing the names while the window is open.
pub async fn draw(orch: &DrawOrchestrator) -> Result<(), Box<dyn Error>> {
    let names: Vec<String> = orch
        .state()
        .entries()
        .list()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    if !names.is_empty() {
        println!("\nDrawing from: {}", names.join(" | "));
    }

    match orch.start_draw().await {
        Ok(outcome) => {
            println!(
                "\n🎉 Winner: {} (chance {:.1}%)",
                outcome.winner.name, outcome.record.probability_percent
            );
        }
        Err(LotteryError::InvalidState(e)) => println!("Cannot draw: {}", e),
        Err(e) => println!("Draw failed: {}", e),
    }
    Ok(())
}

/// Displays recent draws in an interactive list, newest first.
/// Selecting a record shows its details.
///
/// # Arguments
///
/// * `history` - The ledger records, newest first.
/// * `theme` - The dialoguer theme used for prompts.
pub fn view_history(history: &[HistoryRecord], theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    if history.is_empty() {
        println!("\n--- History is empty ---");
        return pause(theme);
    }

    let items: Vec<String> = history
        .iter()
        .map(|record| {
            format!(
                "🏆 {} ({:.1}%) at {}",
                record.winner_name,
                record.probability_percent,
                record.formatted_timestamp()
            )
        })
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("-- Draw History (Recent first) --\nSelect to view details, Esc to go back:")
        .items(&items)
        .default(0)
        .interact_opt()?; // Esc returns None

    if let Some(record) = selection.and_then(|index| history.get(index)) {
        println!("\n--- Selected Draw ---");
        println!("Winner: {}", record.winner_name);
        println!("Weight: {}", record.winner_weight);
        println!("Chance: {:.1}%", record.probability_percent);
        println!("Drawn at: {}", record.formatted_timestamp());
        println!("---------------------");
        pause(theme)?;
    }

    Ok(())
}

/// Writes the history as CSV into the current directory.
pub fn export_history(orch: &DrawOrchestrator) -> Result<(), Box<dyn Error>> {
    let rows = orch.state().history().export();
    if rows.is_empty() {
        println!("No history to export.");
        return Ok(());
    }
    let bytes = export::to_csv(&rows)?;
    let path = file_utils::write_export(&env::current_dir()?, &bytes, Utc::now())?;
    println!("Exported {} record(s) to '{}'.", rows.len(), path.display());
    Ok(())
}

pub fn clear_history(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    if orch.state().history().is_empty() {
        println!("History is already empty.");
        return Ok(());
    }
    if Confirm::with_theme(theme)
        .with_prompt("Clear all history?")
        .default(false)
        .interact()?
    {
        orch.state().clear_history();
        println!("History cleared.");
    }
    Ok(())
}

pub fn reset_all(orch: &DrawOrchestrator, theme: &ColorfulTheme) -> Result<(), Box<dyn Error>> {
    {
        let state = orch.state();
        if state.entries().is_empty() && state.history().is_empty() {
            println!("Nothing to reset.");
            return Ok(());
        }
    }
    if Confirm::with_theme(theme)
        .with_prompt("Delete all entries and history?")
        .default(false)
        .interact()?
    {
        orch.state().reset_all();
        println!("All data reset.");
    }
    Ok(())
}
