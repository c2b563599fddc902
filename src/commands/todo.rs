use anyhow::Result;
use clap::{Args, Subcommand};
use tabled::{Table, Tabled};

use crate::commands::build_graph_client;
use crate::config::Settings;
use crate::error::CommandError;
use crate::output;
use crate::prompt::Prompter;
use crate::resolve::{Identifier, Lookup, resolve};

const TODO_LISTS: Lookup = Lookup {
    collection: "me/todo/lists",
    label: "Microsoft To Do task list",
    select: "id,displayName",
};

#[derive(Debug, Args)]
pub struct TodoCommand {
    #[command(subcommand)]
    command: TodoCommands,
}

#[derive(Debug, Subcommand)]
enum TodoCommands {
    /// Manage Microsoft To Do task lists
    List(ListCommand),
}

impl TodoCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            TodoCommands::List(cmd) => cmd.execute().await,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(subcommand)]
    command: ListCommands,
}

#[derive(Debug, Subcommand)]
enum ListCommands {
    /// Create a new task list
    Add(AddArgs),

    /// Show a specific task list
    Get(GetArgs),

    /// List all task lists
    List,
}

impl ListCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            ListCommands::Add(args) => args.execute().await,
            ListCommands::Get(args) => args.execute().await,
            ListCommands::List => list_lists().await,
        }
    }
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Display name of the new task list
    #[arg(long, short)]
    name: String,
}

impl AddArgs {
    async fn execute(self) -> Result<()> {
        let client = build_graph_client().await?;
        let created = client
            .post_json("me/todo/lists", &serde_json::json!({ "displayName": self.name }))
            .await?;

        output::print_json(&created)
    }
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Id of the task list
    #[arg(long, short)]
    id: Option<String>,

    /// Display name of the task list
    #[arg(long, short)]
    name: Option<String>,
}

impl GetArgs {
    async fn execute(self) -> Result<()> {
        // To Do list ids are opaque strings rather than GUIDs, so an explicit
        // id is taken as the key without format validation.
        let identifier = match (self.id, self.name) {
            (Some(id), None) => Identifier::Id(id),
            (None, Some(name)) => Identifier::Name(name),
            _ => {
                return Err(CommandError::Validation(
                    "Specify either id or name, but not both".to_string(),
                )
                .into());
            }
        };

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let list_id = resolve(&client, &prompter, &identifier, &TODO_LISTS).await?;
        let list = client.get_json(&format!("me/todo/lists/{list_id}")).await?;

        output::print_json(&list)
    }
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "Display name")]
    name: String,

    #[tabled(rename = "Id")]
    id: String,

    #[tabled(rename = "Well-known name")]
    well_known: String,
}

async fn list_lists() -> Result<()> {
    let client = build_graph_client().await?;
    let lists = client.get_collection("me/todo/lists").await?;

    if lists.is_empty() {
        println!("No task lists found.");
        return Ok(());
    }

    let width = output::text_column_width();
    let rows: Vec<ListRow> = lists
        .iter()
        .map(|list| ListRow {
            name: output::truncate(list["displayName"].as_str().unwrap_or(""), width),
            id: list["id"].as_str().unwrap_or("").to_string(),
            well_known: list["wellknownListName"]
                .as_str()
                .filter(|name| *name != "none")
                .unwrap_or("")
                .to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
