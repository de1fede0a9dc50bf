use anyhow::Result;
use chrono::Utc;

use vocab_lib::vocabulary::select_words;

use crate::app::App;
use crate::render::terminal::status_label;
use crate::OutputFormat;

/// Show the words the next session would pick, in priority order
pub fn run(app: &App, amount: Option<usize>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let now = Utc::now();
    let amount = amount.unwrap_or(app.config.session.amount);
    let pool = app.list_words()?;
    let selected = select_words(&pool, amount, now);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
        OutputFormat::Plain => {
            if selected.is_empty() {
                println!("Nothing to practice.");
                return Ok(());
            }
            for (i, item) in selected.iter().enumerate() {
                let when = if item.repetitions == 0 {
                    "new".to_string()
                } else if item.is_due(now) {
                    "due".to_string()
                } else {
                    "extra".to_string()
                };
                println!(
                    "{:>3}. {} ({}, {:.0}%, {})",
                    i + 1,
                    item.word,
                    status_label(item.status(), use_color),
                    item.accuracy * 100.0,
                    when
                );
            }
        }
    }

    Ok(())
}
