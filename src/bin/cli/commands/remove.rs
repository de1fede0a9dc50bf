use anyhow::Result;

use crate::app::App;

pub fn run(app: &App, word: &str) -> Result<()> {
    let item = app.find_word(word)?;
    app.remove_word(&item)?;
    println!("Removed \"{}\"", item.word);
    Ok(())
}
