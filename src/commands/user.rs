use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::build_graph_client;
use crate::config::Settings;
use crate::error::CommandError;
use crate::output;
use crate::prompt::Prompter;
use crate::resolve::{Identifier, Lookup, is_valid_guid, resolve};

const USERS: Lookup = Lookup {
    collection: "users",
    label: "user",
    select: "id,displayName",
};

#[derive(Debug, Args)]
pub struct UserCommand {
    #[command(subcommand)]
    command: UserCommands,
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// Show details of a user
    Get(GetArgs),
}

impl UserCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            UserCommands::Get(args) => args.execute().await,
        }
    }
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Object id (GUID) of the user
    #[arg(long, short)]
    id: Option<String>,

    /// User principal name of the user
    #[arg(long, short)]
    upn: Option<String>,

    /// Email address of the user
    #[arg(long, short)]
    email: Option<String>,
}

impl GetArgs {
    async fn execute(self) -> Result<()> {
        let identifier = identifier_from_options(self.id, self.upn, self.email)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let user_id = resolve(&client, &prompter, &identifier, &USERS).await?;
        let user = client.get_json(&format!("users/{user_id}")).await?;

        output::print_json(&user)
    }
}

fn identifier_from_options(
    id: Option<String>,
    upn: Option<String>,
    email: Option<String>,
) -> Result<Identifier, CommandError> {
    match (id, upn, email) {
        (Some(id), None, None) => {
            if !is_valid_guid(&id) {
                return Err(CommandError::Validation(format!(
                    "{id} is not a valid GUID"
                )));
            }
            Ok(Identifier::Id(id))
        }
        (None, Some(upn), None) => Ok(Identifier::Upn(upn)),
        (None, None, Some(email)) => Ok(Identifier::Mail(email)),
        _ => Err(CommandError::Validation(
            "Specify either id, upn or email, but not multiple".to_string(),
        )),
    }
}
