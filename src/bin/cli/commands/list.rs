use anyhow::Result;

use vocab_lib::vocabulary::ItemStatus;

use crate::app::App;
use crate::render::terminal::{accuracy_bar, status_label, truncate};
use crate::OutputFormat;

pub fn run(app: &App, status: Option<ItemStatus>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut items = app.list_words()?;
    if let Some(status) = status {
        items.retain(|i| i.status() == status);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            if items.is_empty() {
                println!("No words yet. Add one with `vocab-cli add <word> <definition>`.");
                return Ok(());
            }

            let word_width = items.iter().map(|i| i.word.chars().count()).max().unwrap_or(4).clamp(4, 24);
            let def_width = 32;

            println!(
                "{:<ww$} {:<dw$} {:<9} {:<10} {:>4}  {}",
                "Word", "Definition", "Status", "Accuracy", "Reps", "Next review",
                ww = word_width,
                dw = def_width
            );
            println!(
                "{} {} {} {} {}  {}",
                "\u{2500}".repeat(word_width),
                "\u{2500}".repeat(def_width),
                "\u{2500}".repeat(9),
                "\u{2500}".repeat(10),
                "\u{2500}".repeat(4),
                "\u{2500}".repeat(11)
            );

            for item in &items {
                let next = item
                    .next_review_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                // pad before coloring so ANSI codes don't break alignment
                let status = format!("{:<9}", item.status().to_string());
                let status = status.replacen(
                    &item.status().to_string(),
                    &status_label(item.status(), use_color),
                    1,
                );
                println!(
                    "{:<ww$} {:<dw$} {} {} {:>4}  {}",
                    truncate(&item.word, word_width),
                    truncate(&item.definition, def_width),
                    status,
                    accuracy_bar(item.accuracy),
                    item.repetitions,
                    next,
                    ww = word_width,
                    dw = def_width
                );
            }
        }
    }

    Ok(())
}
