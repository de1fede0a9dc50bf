use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("Words:     {}", stats.total_words);
            println!("  new      {}", stats.new_words);
            println!("  learning {}", stats.learning_words);
            println!("  mastered {}", stats.mastered_words);
            println!("Due now:   {}", stats.due_words);
            println!("Accuracy:  {:.0}%", stats.average_accuracy * 100.0);
        }
    }

    Ok(())
}
