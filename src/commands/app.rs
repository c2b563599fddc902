use anyhow::Result;
use base64::Engine as _;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::debug;
use uuid::Uuid;

use crate::commands::build_graph_client;
use crate::config::Settings;
use crate::error::CommandError;
use crate::graph_client::GraphClient;
use crate::merge::{Platform, RedirectUriSet, merge_key_credentials};
use crate::options::{build_property_payload, parse_property, split_list};
use crate::output;
use crate::prompt::Prompter;
use crate::resolve::{Candidate, Identifier, Lookup, is_valid_guid, resolve};

const APPLICATIONS: Lookup = Lookup {
    collection: "applications",
    label: "Microsoft Entra application registration",
    select: "id,displayName",
};

/// Application fields managed by dedicated options. These are rejected in
/// the --property bag so a free-form property can't fight the option that
/// owns the same field.
const RESERVED_PROPERTIES: &[&str] = &[
    "id",
    "displayName",
    "identifierUris",
    "web",
    "spa",
    "publicClient",
    "isFallbackPublicClient",
    "keyCredentials",
    "appRoles",
];

#[derive(Debug, Args)]
pub struct AppCommand {
    #[command(subcommand)]
    command: AppCommands,
}

#[derive(Debug, Subcommand)]
enum AppCommands {
    /// Show details of an app registration
    Get(GetArgs),

    /// List app registrations in the tenant
    List,

    /// Update an app registration
    Set(SetArgs),

    /// Remove an app registration
    Remove(RemoveArgs),

    /// Manage roles defined on an app registration
    Role(RoleCommand),
}

impl AppCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            AppCommands::Get(args) => args.execute().await,
            AppCommands::List => list_apps().await,
            AppCommands::Set(args) => args.execute().await,
            AppCommands::Remove(args) => args.execute().await,
            AppCommands::Role(cmd) => cmd.execute().await,
        }
    }
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    id: Option<String>,

    /// Display name of the app registration
    #[arg(long, short)]
    name: Option<String>,
}

impl GetArgs {
    async fn execute(self) -> Result<()> {
        let identifier = Identifier::from_id_or_name(self.id, self.name)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let object_id = resolve(&client, &prompter, &identifier, &APPLICATIONS).await?;
        let application = client
            .get_json(&format!("applications/{object_id}"))
            .await?;

        output::print_json(&application)
    }
}

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "Display name")]
    name: String,

    #[tabled(rename = "App (client) ID")]
    app_id: String,

    #[tabled(rename = "Object ID")]
    object_id: String,

    #[tabled(rename = "Created")]
    created: String,
}

async fn list_apps() -> Result<()> {
    let client = build_graph_client().await?;
    let applications = client
        .get_collection("applications?$select=id,appId,displayName,createdDateTime")
        .await?;

    if applications.is_empty() {
        println!("No app registrations found.");
        return Ok(());
    }

    let width = output::text_column_width();
    let rows: Vec<AppRow> = applications
        .iter()
        .map(|app| AppRow {
            name: output::truncate(app["displayName"].as_str().unwrap_or(""), width),
            app_id: app["appId"].as_str().unwrap_or("").to_string(),
            object_id: app["id"].as_str().unwrap_or("").to_string(),
            created: output::relative_age(app["createdDateTime"].as_str().unwrap_or("")),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    id: Option<String>,

    /// Display name of the app registration
    #[arg(long, short)]
    name: Option<String>,

    /// Comma-separated application ID URIs to set
    #[arg(long, short)]
    uris: Option<String>,

    /// Comma-separated redirect URIs to add to the selected platform
    #[arg(long, short)]
    redirect_uris: Option<String>,

    /// Comma-separated redirect URIs to remove from every platform
    #[arg(long)]
    redirect_uris_to_remove: Option<String>,

    /// Platform the added redirect URIs belong to
    #[arg(long, value_enum)]
    platform: Option<Platform>,

    /// Allow device code and other public client flows
    #[arg(long)]
    allow_public_client_flows: Option<bool>,

    /// Path to the certificate (.cer) to register as a key credential
    #[arg(long)]
    certificate_file: Option<PathBuf>,

    /// Base64-encoded certificate to register as a key credential
    #[arg(long)]
    certificate_base64: Option<String>,

    /// Friendly name stored with the certificate
    #[arg(long)]
    certificate_display_name: Option<String>,

    /// Additional key=value properties to apply to the application
    #[arg(long = "property", short = 'p', value_parser = parse_property)]
    properties: Vec<(String, String)>,
}

impl SetArgs {
    async fn execute(self) -> Result<()> {
        let identifier = Identifier::from_id_or_name(self.id.clone(), self.name.clone())?;
        self.validate()?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let object_id = resolve(&client, &prompter, &identifier, &APPLICATIONS).await?;

        // Each aspect is its own request, applied strictly in sequence.
        // Earlier updates are not rolled back when a later one fails.
        self.update_properties(&client, &object_id).await?;
        self.update_identifier_uris(&client, &object_id).await?;
        self.update_redirect_uris(&client, &object_id).await?;
        self.update_public_client_flows(&client, &object_id).await?;
        self.update_certificate(&client, &object_id).await?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CommandError> {
        if self.certificate_file.is_some() && self.certificate_base64.is_some() {
            return Err(CommandError::Validation(
                "Specify either certificate-file or certificate-base64, but not both".to_string(),
            ));
        }

        if self.certificate_display_name.is_some()
            && self.certificate_file.is_none()
            && self.certificate_base64.is_none()
        {
            return Err(CommandError::Validation(
                "When you specify certificate-display-name you also need to specify certificate-file or certificate-base64"
                    .to_string(),
            ));
        }

        if let Some(path) = &self.certificate_file {
            if !path.exists() {
                return Err(CommandError::Validation(
                    "Certificate file not found".to_string(),
                ));
            }
        }

        if self.redirect_uris.is_some() && self.platform.is_none() {
            return Err(CommandError::Validation(
                "When you specify redirect-uris you also need to specify platform".to_string(),
            ));
        }

        // reserved-key check runs here so it fails before any request
        build_property_payload(&self.properties, RESERVED_PROPERTIES)?;

        Ok(())
    }

    async fn update_properties(
        &self,
        client: &GraphClient,
        object_id: &str,
    ) -> Result<(), CommandError> {
        if self.properties.is_empty() {
            return Ok(());
        }

        debug!("applying additional properties to the application");
        let payload = build_property_payload(&self.properties, RESERVED_PROPERTIES)?;
        client
            .patch_json(&format!("applications/{object_id}"), &payload)
            .await
    }

    async fn update_identifier_uris(
        &self,
        client: &GraphClient,
        object_id: &str,
    ) -> Result<(), CommandError> {
        let Some(uris) = &self.uris else {
            return Ok(());
        };

        debug!("configuring application ID URIs");
        let identifier_uris = split_list(uris);
        client
            .patch_json(
                &format!("applications/{object_id}"),
                &json!({ "identifierUris": identifier_uris }),
            )
            .await
    }

    async fn update_redirect_uris(
        &self,
        client: &GraphClient,
        object_id: &str,
    ) -> Result<(), CommandError> {
        if self.redirect_uris.is_none() && self.redirect_uris_to_remove.is_none() {
            return Ok(());
        }

        debug!("configuring application redirect URIs");
        let application = client
            .get_json(&format!(
                "applications/{object_id}?$select=publicClient,spa,web"
            ))
            .await?;

        let add = self.redirect_uris.as_deref().map(split_list).unwrap_or_default();
        let remove = self
            .redirect_uris_to_remove
            .as_deref()
            .map(split_list)
            .unwrap_or_default();

        let mut uris = RedirectUriSet::from_application(&application);
        uris.apply(self.platform, &add, &remove);

        client
            .patch_json(&format!("applications/{object_id}"), &uris.to_patch_body())
            .await
    }

    async fn update_public_client_flows(
        &self,
        client: &GraphClient,
        object_id: &str,
    ) -> Result<(), CommandError> {
        let Some(allow) = self.allow_public_client_flows else {
            return Ok(());
        };

        debug!("configuring allowPublicClientFlows");
        client
            .patch_json(
                &format!("applications/{object_id}"),
                &json!({ "isFallbackPublicClient": allow }),
            )
            .await
    }

    async fn update_certificate(
        &self,
        client: &GraphClient,
        object_id: &str,
    ) -> Result<(), CommandError> {
        let encoded = if let Some(encoded) = &self.certificate_base64 {
            encoded.clone()
        } else if let Some(path) = &self.certificate_file {
            let bytes = fs::read(path).map_err(|e| {
                CommandError::Validation(format!(
                    "Error reading certificate file: {e}. Please add the certificate using the certificate-base64 option."
                ))
            })?;
            base64::engine::general_purpose::STANDARD.encode(bytes)
        } else {
            return Ok(());
        };

        debug!("retrieving current key credentials for the application");
        let application = client
            .get_json(&format!("applications/{object_id}?$select=keyCredentials"))
            .await?;
        let current = application["keyCredentials"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut credential = serde_json::Map::new();
        credential.insert(
            "type".to_string(),
            Value::String("AsymmetricX509Cert".to_string()),
        );
        credential.insert("usage".to_string(), Value::String("Verify".to_string()));
        credential.insert("key".to_string(), Value::String(encoded));
        if let Some(display_name) = &self.certificate_display_name {
            credential.insert(
                "displayName".to_string(),
                Value::String(display_name.clone()),
            );
        }

        debug!("updating key credentials on the application");
        let key_credentials = merge_key_credentials(current, Value::Object(credential));
        client
            .patch_json(
                &format!("applications/{object_id}"),
                &json!({ "keyCredentials": key_credentials }),
            )
            .await
    }
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    id: Option<String>,

    /// Display name of the app registration
    #[arg(long, short)]
    name: Option<String>,

    /// Don't prompt for confirmation
    #[arg(long, short)]
    force: bool,
}

impl RemoveArgs {
    async fn execute(self) -> Result<()> {
        let identifier = Identifier::from_id_or_name(self.id, self.name)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);

        if !self.force {
            let proceed = prompter.confirm(&format!(
                "Are you sure you want to remove the app registration with {} '{}'?",
                identifier.property(),
                identifier.value()
            ));
            if !proceed {
                println!("Operation cancelled. No changes made.");
                return Ok(());
            }
        }

        let client = build_graph_client().await?;
        let object_id = resolve(&client, &prompter, &identifier, &APPLICATIONS).await?;
        client.delete(&format!("applications/{object_id}")).await?;
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct RoleCommand {
    #[command(subcommand)]
    command: RoleCommands,
}

#[derive(Debug, Subcommand)]
enum RoleCommands {
    /// Add a role to an app registration
    Add(RoleAddArgs),

    /// List roles defined on an app registration
    List(RoleListArgs),

    /// Remove a role from an app registration
    Remove(RoleRemoveArgs),
}

impl RoleCommand {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            RoleCommands::Add(args) => args.execute().await,
            RoleCommands::List(args) => args.execute().await,
            RoleCommands::Remove(args) => args.execute().await,
        }
    }
}

#[derive(Debug, Args)]
struct RoleAddArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    app_id: Option<String>,

    /// Display name of the app registration
    #[arg(long)]
    app_name: Option<String>,

    /// Display name of the new role
    #[arg(long, short)]
    name: String,

    /// Claim value emitted in tokens for principals holding the role
    #[arg(long, short)]
    claim: String,

    /// Who the role can be assigned to
    #[arg(long, value_enum)]
    allowed_members: AllowedMembers,

    /// Description shown on consent and assignment screens
    #[arg(long, short)]
    description: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AllowedMembers {
    #[value(name = "usersGroups")]
    UsersGroups,
    #[value(name = "applications")]
    Applications,
    #[value(name = "both")]
    Both,
}

impl AllowedMembers {
    fn member_types(self) -> Vec<&'static str> {
        match self {
            AllowedMembers::UsersGroups => vec!["User"],
            AllowedMembers::Applications => vec!["Application"],
            AllowedMembers::Both => vec!["User", "Application"],
        }
    }
}

/// Claim values travel inside issued tokens, so Graph constrains their shape
fn validate_claim(claim: &str) -> Result<(), CommandError> {
    if claim.len() > 120 {
        return Err(CommandError::Validation(
            "Claim must not be longer than 120 characters".to_string(),
        ));
    }

    if claim.starts_with('.') {
        return Err(CommandError::Validation(
            "Claim must not begin with '.'".to_string(),
        ));
    }

    if claim.chars().any(|c| !c.is_ascii_graphic()) {
        return Err(CommandError::Validation(
            "Claim can contain only printable ASCII characters without spaces".to_string(),
        ));
    }

    Ok(())
}

impl RoleAddArgs {
    async fn execute(self) -> Result<()> {
        let app_identifier = Identifier::from_id_or_name(self.app_id.clone(), self.app_name.clone())?;
        validate_claim(&self.claim)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let object_id = resolve(&client, &prompter, &app_identifier, &APPLICATIONS).await?;

        let application = client
            .get_json(&format!("applications/{object_id}?$select=id,appRoles"))
            .await?;
        let mut roles = application["appRoles"].as_array().cloned().unwrap_or_default();

        // the update replaces the whole collection, so the existing roles
        // ride along with the new one
        roles.push(json!({
            "allowedMemberTypes": self.allowed_members.member_types(),
            "description": self.description,
            "displayName": self.name,
            "id": Uuid::new_v4().to_string(),
            "isEnabled": true,
            "value": self.claim,
        }));

        debug!("adding the app role to the application");
        client
            .patch_json(
                &format!("applications/{object_id}"),
                &json!({ "appRoles": roles }),
            )
            .await?;
        Ok(())
    }
}

#[derive(Debug, Args)]
struct RoleListArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    app_id: Option<String>,

    /// Display name of the app registration
    #[arg(long)]
    app_name: Option<String>,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "Display name")]
    name: String,

    #[tabled(rename = "Claim")]
    claim: String,

    #[tabled(rename = "Id")]
    id: String,

    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl RoleListArgs {
    async fn execute(self) -> Result<()> {
        let identifier = Identifier::from_id_or_name(self.app_id, self.app_name)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);
        let client = build_graph_client().await?;

        let object_id = resolve(&client, &prompter, &identifier, &APPLICATIONS).await?;
        let application = client
            .get_json(&format!("applications/{object_id}?$select=id,appRoles"))
            .await?;
        let roles = application["appRoles"].as_array().cloned().unwrap_or_default();

        if roles.is_empty() {
            println!("No app roles defined.");
            return Ok(());
        }

        let width = output::text_column_width();
        let rows: Vec<RoleRow> = roles
            .iter()
            .map(|role| RoleRow {
                name: output::truncate(role["displayName"].as_str().unwrap_or(""), width),
                claim: role["value"].as_str().unwrap_or("").to_string(),
                id: role["id"].as_str().unwrap_or("").to_string(),
                enabled: role["isEnabled"].as_bool().unwrap_or(false).to_string(),
            })
            .collect();

        println!("{}", Table::new(rows));
        Ok(())
    }
}

#[derive(Debug, Args)]
struct RoleRemoveArgs {
    /// Object id (GUID) of the app registration
    #[arg(long)]
    app_id: Option<String>,

    /// Display name of the app registration
    #[arg(long)]
    app_name: Option<String>,

    /// Display name of the role to remove
    #[arg(long, short)]
    name: Option<String>,

    /// Claim value of the role to remove
    #[arg(long, short)]
    claim: Option<String>,

    /// Id (GUID) of the role to remove
    #[arg(long, short)]
    id: Option<String>,

    /// Don't prompt for confirmation
    #[arg(long, short)]
    force: bool,
}

/// Which property the role to remove is matched on
#[derive(Debug, Clone, PartialEq)]
enum RoleSelector {
    Name(String),
    Claim(String),
    Id(String),
}

impl RoleSelector {
    fn from_options(
        name: Option<String>,
        claim: Option<String>,
        id: Option<String>,
    ) -> Result<Self, CommandError> {
        match (name, claim, id) {
            (Some(name), None, None) => Ok(RoleSelector::Name(name)),
            (None, Some(claim), None) => Ok(RoleSelector::Claim(claim)),
            (None, None, Some(id)) => {
                if !is_valid_guid(&id) {
                    return Err(CommandError::Validation(format!(
                        "{id} is not a valid GUID"
                    )));
                }
                Ok(RoleSelector::Id(id))
            }
            _ => Err(CommandError::Validation(
                "Specify either name, claim or id of the role, but not multiple".to_string(),
            )),
        }
    }

    fn field(&self) -> &'static str {
        match self {
            RoleSelector::Name(_) => "displayName",
            RoleSelector::Claim(_) => "value",
            RoleSelector::Id(_) => "id",
        }
    }

    fn value(&self) -> &str {
        match self {
            RoleSelector::Name(value)
            | RoleSelector::Claim(value)
            | RoleSelector::Id(value) => value,
        }
    }

    fn property(&self) -> &'static str {
        match self {
            RoleSelector::Name(_) => "name",
            RoleSelector::Claim(_) => "claim",
            RoleSelector::Id(_) => "id",
        }
    }
}

impl RoleRemoveArgs {
    async fn execute(self) -> Result<()> {
        let app_identifier = Identifier::from_id_or_name(self.app_id, self.app_name)?;
        let selector = RoleSelector::from_options(self.name, self.claim, self.id)?;

        let settings = Settings::load()?;
        let prompter = Prompter::new(settings.prompt);

        if !self.force {
            let proceed = prompter.confirm("Are you sure you want to remove the app role?");
            if !proceed {
                println!("Operation cancelled. No changes made.");
                return Ok(());
            }
        }

        let client = build_graph_client().await?;
        let object_id = resolve(&client, &prompter, &app_identifier, &APPLICATIONS).await?;

        let application = client
            .get_json(&format!("applications/{object_id}?$select=id,appRoles"))
            .await?;
        let roles = application["appRoles"].as_array().cloned().unwrap_or_default();

        let role = select_role(&roles, &selector, &prompter)?;
        let role_id = role["id"]
            .as_str()
            .ok_or_else(|| {
                CommandError::UnexpectedResponse("app role without an id".to_string())
            })?
            .to_string();

        // An enabled role can't be deleted outright: Graph requires disabling
        // it in one update and removing it in the next. Both updates replace
        // the whole appRoles collection.
        if role["isEnabled"].as_bool().unwrap_or(false) {
            disable_role(&client, &object_id, &roles, &role_id).await?;
        }
        delete_role(&client, &object_id, &roles, &role_id).await?;
        Ok(())
    }
}

fn matching_roles(roles: &[Value], selector: &RoleSelector) -> Vec<Value> {
    roles
        .iter()
        .filter(|role| role[selector.field()].as_str() == Some(selector.value()))
        .cloned()
        .collect()
}

/// Picks the role to remove. Display names aren't unique, so several
/// matches hand off to the disambiguation prompt.
fn select_role(
    roles: &[Value],
    selector: &RoleSelector,
    prompter: &Prompter,
) -> Result<Value, CommandError> {
    let mut matches = matching_roles(roles, selector);

    match matches.len() {
        0 => Err(CommandError::NotFound {
            label: "app role".to_string(),
            property: selector.property().to_string(),
            value: selector.value().to_string(),
        }),
        1 => Ok(matches.swap_remove(0)),
        _ => {
            let candidates: Vec<Candidate> = matches
                .iter()
                .map(|role| Candidate {
                    id: role["id"].as_str().unwrap_or("").to_string(),
                    display_name: role["displayName"].as_str().map(String::from),
                })
                .collect();
            let message = format!(
                "Multiple app roles with {} '{}' found.",
                selector.property(),
                selector.value()
            );
            let chosen = prompter.pick_one(&message, candidates)?;
            matches
                .into_iter()
                .find(|role| role["id"].as_str() == Some(chosen.id.as_str()))
                .ok_or_else(|| {
                    CommandError::UnexpectedResponse(
                        "chosen role missing from the candidate set".to_string(),
                    )
                })
        }
    }
}

async fn disable_role(
    client: &GraphClient,
    object_id: &str,
    roles: &[Value],
    role_id: &str,
) -> Result<(), CommandError> {
    debug!("disabling the app role");
    let updated: Vec<Value> = roles
        .iter()
        .cloned()
        .map(|mut role| {
            if role["id"].as_str() == Some(role_id) {
                role["isEnabled"] = Value::Bool(false);
            }
            role
        })
        .collect();

    client
        .patch_json(
            &format!("applications/{object_id}"),
            &json!({ "appRoles": updated }),
        )
        .await
}

async fn delete_role(
    client: &GraphClient,
    object_id: &str,
    roles: &[Value],
    role_id: &str,
) -> Result<(), CommandError> {
    debug!("deleting the app role");
    let remaining: Vec<Value> = roles
        .iter()
        .filter(|role| role["id"].as_str() != Some(role_id))
        .cloned()
        .collect();

    client
        .patch_json(
            &format!("applications/{object_id}"),
            &json!({ "appRoles": remaining }),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_args() -> SetArgs {
        SetArgs {
            id: Some("d75be2e1-0204-4f95-857d-51a37cf40be8".to_string()),
            name: None,
            uris: None,
            redirect_uris: None,
            redirect_uris_to_remove: None,
            platform: None,
            allow_public_client_flows: None,
            certificate_file: None,
            certificate_base64: None,
            certificate_display_name: None,
            properties: Vec::new(),
        }
    }

    fn roles() -> Vec<Value> {
        vec![
            json!({ "id": "A", "displayName": "Reader", "value": "read", "isEnabled": true }),
            json!({ "id": "B", "displayName": "Writer", "value": "write", "isEnabled": true }),
            json!({ "id": "C", "displayName": "Writer", "value": "write.legacy", "isEnabled": false }),
        ]
    }

    #[test]
    fn test_redirect_uris_require_a_platform() {
        let mut args = set_args();
        args.redirect_uris = Some("https://contoso.com/auth".to_string());

        let error = args.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "When you specify redirect-uris you also need to specify platform"
        );

        args.platform = Some(Platform::Spa);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_certificate_sources_are_mutually_exclusive() {
        let mut args = set_args();
        args.certificate_file = Some(PathBuf::from("/tmp/cert.cer"));
        args.certificate_base64 = Some("AAAA".to_string());

        let error = args.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Specify either certificate-file or certificate-base64, but not both"
        );
    }

    #[test]
    fn test_certificate_display_name_requires_a_certificate() {
        let mut args = set_args();
        args.certificate_display_name = Some("signing cert".to_string());

        assert!(args.validate().is_err());

        args.certificate_base64 = Some("AAAA".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_reserved_properties_fail_validation() {
        let mut args = set_args();
        args.properties = vec![("keyCredentials".to_string(), "[]".to_string())];

        assert!(args.validate().is_err());
    }

    #[test]
    fn test_claim_shape_is_constrained() {
        assert!(validate_claim("Tasks.Read").is_ok());
        assert!(validate_claim(&"a".repeat(121)).is_err());
        assert!(validate_claim(".leading-dot").is_err());
        assert!(validate_claim("has space").is_err());
        assert!(validate_claim("żółć").is_err());
    }

    #[test]
    fn test_allowed_members_map_to_graph_member_types() {
        assert_eq!(AllowedMembers::UsersGroups.member_types(), vec!["User"]);
        assert_eq!(
            AllowedMembers::Both.member_types(),
            vec!["User", "Application"]
        );
    }

    #[test]
    fn test_role_selector_requires_exactly_one_option() {
        assert!(RoleSelector::from_options(None, None, None).is_err());
        assert!(
            RoleSelector::from_options(
                Some("Reader".to_string()),
                Some("read".to_string()),
                None
            )
            .is_err()
        );
        assert_eq!(
            RoleSelector::from_options(None, Some("read".to_string()), None).unwrap(),
            RoleSelector::Claim("read".to_string())
        );
    }

    #[test]
    fn test_role_selector_validates_the_id_format() {
        let error = RoleSelector::from_options(None, None, Some("abc".to_string())).unwrap_err();
        assert_eq!(error.to_string(), "abc is not a valid GUID");
    }

    #[test]
    fn test_roles_match_on_the_selected_property() {
        let selector = RoleSelector::Claim("write".to_string());
        let matches = matching_roles(&roles(), &selector);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["id"], "B");
    }

    #[test]
    fn test_single_matching_role_is_selected_without_prompting() {
        let prompter = Prompter::new(false);
        let selector = RoleSelector::Name("Reader".to_string());

        let role = select_role(&roles(), &selector, &prompter).unwrap();
        assert_eq!(role["id"], "A");
    }

    #[test]
    fn test_missing_role_reports_not_found() {
        let prompter = Prompter::new(false);
        let selector = RoleSelector::Name("Admin".to_string());

        let error = select_role(&roles(), &selector, &prompter).unwrap_err();
        assert_eq!(error.to_string(), "No app role with name 'Admin' found");
    }

    #[test]
    fn test_duplicate_role_names_fail_without_prompting() {
        let prompter = Prompter::new(false);
        let selector = RoleSelector::Name("Writer".to_string());

        let error = select_role(&roles(), &selector, &prompter).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Multiple app roles with name 'Writer' found. Found: B, C."
        );
    }
}
