use chrono::Utc;
use clap::Args;

#[derive(Args)]
pub struct CleanupArgs {
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

pub fn run(args: CleanupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = super::engine()?;
    let horizon = match args.hours {
        Some(h) => chrono::Duration::hours(h),
        None if args.extended => engine.policy().extended_lookahead,
        None => engine.policy().lookahead,
    };

    let summary = engine.run_cleanup_pass(Utc::now(), horizon)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "examined {} buffers, kept {}, deleted {}",
            summary.examined,
            summary.kept,
            summary.deleted.len()
        );
        for deleted in &summary.deleted {
            println!("  deleted: {}", deleted.title);
        }
        for err in &summary.errors {
            eprintln!("  warning: {err}");
        }
    }
    Ok(())
}
