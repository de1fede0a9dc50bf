use anyhow::Result;
use chrono::Utc;

use vocab_lib::vocabulary::scheduler::{format_interval, preview_intervals};

use crate::app::App;
use crate::render::terminal::{accuracy_bar, paint, status_label, Color};
use crate::OutputFormat;

pub fn run(app: &App, word: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let item = app.find_word(word)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    let mut heading = item.word.clone();
    if let Some(ipa) = &item.ipa {
        heading.push_str(&format!("  {}", ipa));
    }
    println!("{}", paint(&heading, Color::BOLD, use_color));
    if let Some(word_type) = &item.word_type {
        println!("{}", paint(word_type, Color::DIM, use_color));
    }
    println!("{}", item.definition);

    for example in &item.examples {
        println!("  \u{2022} {}", example);
    }

    println!();
    println!("Status:      {}", status_label(item.status(), use_color));
    println!("Accuracy:    {} {:.0}%", accuracy_bar(item.accuracy), item.accuracy * 100.0);
    println!("Reviews:     {}", item.repetitions);
    if let Some(at) = item.last_reviewed_at {
        println!("Last review: {}", at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(at) = item.next_review_at {
        println!("Next review: {}", at.format("%Y-%m-%d %H:%M"));
    }
    if !item.recent_attempts.is_empty() {
        let recent: Vec<String> = item.recent_attempts.iter().map(|a| a.quality.to_string()).collect();
        println!("Recent:      {}", recent.join(" "));
    }

    let [forgot, partial, knew] = preview_intervals(&item, Utc::now());
    println!(
        "If reviewed now: forgot {}, partial {}, knew {}",
        format_interval(forgot),
        format_interval(partial),
        format_interval(knew)
    );

    Ok(())
}
