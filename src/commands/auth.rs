use crate::auth::Auth;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Login to Microsoft Graph API
    Login,

    /// Logout and remove saved credentials
    Logout,

    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(self) -> Result<()> {
        let auth = Auth::new()?;

        match self.command {
            AuthCommands::Login => auth.login().await,
            AuthCommands::Logout => auth.logout(),
            AuthCommands::Status => auth.status().await,
        }
    }
}
