use anyhow::{Context, Result};

use vocab_lib::config::Config;

use crate::app::App;

pub fn run(app: &App, init: bool) -> Result<()> {
    if init {
        if app.config_path.exists() {
            println!("Config already exists at {}", app.config_path.display());
        } else {
            Config::default()
                .save(&app.config_path)
                .context("Failed to write config")?;
            println!("Wrote default config to {}", app.config_path.display());
        }
        return Ok(());
    }

    println!("# {}", app.config_path.display());
    println!("{}", toml::to_string_pretty(&app.config)?);
    Ok(())
}
