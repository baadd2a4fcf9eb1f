use clap::Subcommand;
use meditation_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. `timer.default_minutes`
    Get {
        /// Dotted setting name: timer.default_minutes, timer.tick_interval_ms,
        /// display.timestamp_format or logging.filter
        key: String,
    },
    /// Change one setting; the new file is checked before it is written
    Set {
        /// Dotted setting name
        key: String,
        /// Minutes 1-60, milliseconds, a strftime layout or a log filter
        value: String,
    },
    /// Print every setting as JSON
    #[command(alias = "list")]
    Show,
    /// Print where the settings file lives
    Path,
    /// Put back the stock settings (5 minute sits, 1s ticks)
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let settings = Config::load()?;
            let value = settings
                .get(&key)
                .ok_or_else(|| format!("no setting named '{key}'; `config show` lists them"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Config::load()?;
            settings.set(&key, &value)?;
            settings.save()?;
            tracing::debug!(%key, %value, "setting saved");
            println!("{key} = {value}");
        }
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            let path = Config::path()?;
            Config::default().save_to(&path)?;
            println!("stock settings written to {}", path.display());
        }
    }
    Ok(())
}
