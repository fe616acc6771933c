use chrono::Utc;
use clap::Args;

#[derive(Args)]
pub struct RunArgs {
    /// Use the extended lookahead horizon from config
    #[arg(long)]
    pub extended: bool,
    /// Override the horizon in hours
    #[arg(long)]
    pub hours: Option<i64>,
    /// Print the full summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = super::engine()?;
    let horizon = match args.hours {
        Some(h) => chrono::Duration::hours(h),
        None if args.extended => engine.policy().extended_lookahead,
        None => engine.policy().lookahead,
    };

    let summary = engine.run_buffer_pass(Utc::now(), horizon)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "scanned {} events, {} qualifying, {} buffers created",
            summary.scanned, summary.qualifying, summary.buffers_created
        );
        for outcome in &summary.outcomes {
            if let Some(placed) = &outcome.placement {
                println!(
                    "  {}: pre={} post={}",
                    outcome.title,
                    serde_json::to_string(&placed.pre)?,
                    serde_json::to_string(&placed.post)?,
                );
            }
        }
    }
    Ok(())
}
