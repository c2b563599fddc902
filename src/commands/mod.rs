mod app;
mod auth;
mod completions;
mod todo;
mod user;

pub use app::AppCommand;
pub use auth::AuthCommand;
pub use completions::CompletionsCommand;
pub use todo::TodoCommand;
pub use user::UserCommand;

use anyhow::Result;
use clap::Subcommand;

use crate::auth::Auth;
use crate::graph_client::GraphClient;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage authentication with Microsoft Graph API
    Auth(AuthCommand),

    /// Manage Entra app registrations
    App(AppCommand),

    /// Manage Microsoft To Do task lists
    Todo(TodoCommand),

    /// Look up users in Entra ID
    User(UserCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Builds a Graph client from the cached token, refreshing it when expired
pub(crate) async fn build_graph_client() -> Result<GraphClient> {
    let auth = Auth::new()?;
    let token = auth.ensure_valid_token().await.map_err(|_| {
        anyhow::anyhow!("You are not authenticated. Please run 'm365ctl auth login' first.")
    })?;
    Ok(GraphClient::new(token.access_token))
}
