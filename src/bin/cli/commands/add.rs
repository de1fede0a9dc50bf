use anyhow::Result;

use vocab_lib::vocabulary::NewWord;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, new_word: NewWord, format: &OutputFormat) -> Result<()> {
    let item = app.add_word(new_word)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        OutputFormat::Plain => {
            println!("Added \"{}\": {}", item.word, item.definition);
            if !item.examples.is_empty() {
                println!("  Examples: {}", item.examples.len());
            }
            println!("  ID: {}", item.id);
        }
    }

    Ok(())
}
