use anyhow::{bail, Result};

use vocab_lib::vocabulary::scheduler::format_interval;

use crate::app::App;
use crate::render::terminal::status_label;
use crate::OutputFormat;

/// Record a single review outside of a practice session
pub async fn run(app: &App, word: &str, quality: i32, format: &OutputFormat, use_color: bool) -> Result<()> {
    if ![1, 3, 5].contains(&quality) {
        bail!("Quality must be 1 (forgot), 3 (partial) or 5 (knew it)");
    }

    let item = app.find_word(word)?;
    let scheduler = app.scheduler();
    let outcome = scheduler.review(&item, quality, &[]);
    scheduler.flush().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.item)?);
        }
        OutputFormat::Plain => {
            println!(
                "{}: {} \u{2192} {}, accuracy {:.0}%, next review in {}",
                outcome.item.word,
                status_label(item.status(), use_color),
                status_label(outcome.item.status(), use_color),
                outcome.item.accuracy * 100.0,
                format_interval(outcome.interval_days())
            );
        }
    }

    Ok(())
}
