use bufferly_core::{BufferConfig, Policy};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    List,
    /// Get a value by dot-separated key (e.g. buffers.pre_minutes)
    Get { key: String },
    /// Set a scalar value by dot-separated key
    Set { key: String, value: String },
    /// Validate the configuration without touching the calendar
    Check,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List => {
            let config = BufferConfig::load_or_default();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = BufferConfig::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = BufferConfig::load_or_default();
            let previous = config.clone();
            config.set(&key, &value)?;
            // A bad pattern should surface now, not during the next pass
            if let Err(e) = Policy::compile(&config) {
                previous.save()?;
                return Err(e.into());
            }
            println!("config updated");
        }
        ConfigAction::Check => {
            let config = BufferConfig::load()?;
            Policy::compile(&config)?;
            println!("config ok");
        }
    }
    Ok(())
}
