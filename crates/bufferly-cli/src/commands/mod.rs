pub mod auth;
pub mod classify;
pub mod cleanup;
pub mod config;
pub mod run;

use bufferly_core::{BufferConfig, BufferEngine, GoogleCalendarAdapter, Policy};

/// Load config, compile policy, and connect the Google adapter.
pub fn engine() -> Result<BufferEngine<GoogleCalendarAdapter>, Box<dyn std::error::Error>> {
    let config = BufferConfig::load()?;
    let policy = Policy::compile(&config)?;
    let adapter = GoogleCalendarAdapter::new()?;
    Ok(BufferEngine::new(policy, adapter)?)
}
