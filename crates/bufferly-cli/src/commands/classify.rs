use std::io::Read;

use bufferly_core::CalendarEvent;
use clap::Args;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Path to an event JSON file; reads stdin when omitted
    #[arg(long)]
    pub file: Option<String>,
}

pub fn run(args: ClassifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let json = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: CalendarEvent = serde_json::from_str(&json)?;

    let engine = super::engine()?;
    let decision = engine.classify_only(&event);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
