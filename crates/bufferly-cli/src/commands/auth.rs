use bufferly_core::GoogleCalendarAdapter;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Authenticate with Google Calendar
    Login {
        /// OAuth client ID
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login {
            client_id,
            client_secret,
        } => {
            if let (Some(id), Some(secret)) = (client_id, client_secret) {
                GoogleCalendarAdapter::set_credentials(&id, &secret)?;
            }
            let adapter = GoogleCalendarAdapter::new()?;
            adapter.login()?;
            println!("authenticated with Google Calendar");
        }
        AuthAction::Logout => {
            let adapter = GoogleCalendarAdapter::new()?;
            adapter.logout()?;
            println!("logged out");
        }
        AuthAction::Status => {
            let adapter = GoogleCalendarAdapter::new()?;
            if adapter.is_authenticated() {
                println!("google: authenticated");
            } else {
                println!("google: not authenticated");
            }
        }
    }
    Ok(())
}
