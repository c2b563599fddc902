use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::CommandError;
use crate::graph_client::GraphClient;
use crate::prompt::Prompter;

/// How the user referred to a remote resource on the command line.
///
/// Exactly one variant is supplied per operation; command validation
/// enforces the mutual exclusivity of the corresponding options.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// The object id itself, used as the resource key directly
    Id(String),
    /// Resolved by filtering on displayName
    Name(String),
    /// Resolved by filtering on userPrincipalName
    Upn(String),
    /// Resolved by filtering on mail
    Mail(String),
}

impl Identifier {
    /// Builds an identifier from the common `--id`/`--name` option pair,
    /// requiring exactly one of them and a well-formed GUID for `--id`.
    pub fn from_id_or_name(
        id: Option<String>,
        name: Option<String>,
    ) -> Result<Self, CommandError> {
        match (id, name) {
            (Some(id), None) => {
                if !is_valid_guid(&id) {
                    return Err(CommandError::Validation(format!(
                        "{id} is not a valid GUID"
                    )));
                }
                Ok(Identifier::Id(id))
            }
            (None, Some(name)) => Ok(Identifier::Name(name)),
            _ => Err(CommandError::Validation(
                "Specify either id or name, but not both".to_string(),
            )),
        }
    }

    /// The field a filter query is scoped to; None when no lookup is needed
    pub fn filter_field(&self) -> Option<&'static str> {
        match self {
            Identifier::Id(_) => None,
            Identifier::Name(_) => Some("displayName"),
            Identifier::Upn(_) => Some("userPrincipalName"),
            Identifier::Mail(_) => Some("mail"),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Identifier::Id(value)
            | Identifier::Name(value)
            | Identifier::Upn(value)
            | Identifier::Mail(value) => value,
        }
    }

    /// How this identifier is named in user-facing messages, e.g. "name"
    pub fn property(&self) -> &'static str {
        match self {
            Identifier::Id(_) => "id",
            Identifier::Name(_) => "name",
            Identifier::Upn(_) => "user principal name",
            Identifier::Mail(_) => "mail",
        }
    }
}

pub fn is_valid_guid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// The filter query used to resolve a non-GUID identifier to an object id.
pub struct Lookup {
    /// Collection path under the Graph base url, e.g. "applications"
    pub collection: &'static str,
    /// Human-readable label used in lookup error messages
    pub label: &'static str,
    /// Fields requested for each candidate
    pub select: &'static str,
}

/// A remote object returned by a filter query, carrying its id and the
/// fields needed to display it during disambiguation.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// Resolves an identifier to a single object id.
///
/// Explicit ids are returned unchanged without a network call; they are
/// never looked up by filter even though a filter would also match by id.
/// Anything else goes through one filter query: zero candidates fail with
/// NotFound, one resolves directly, and several are handed to the prompter
/// for disambiguation.
pub async fn resolve(
    client: &GraphClient,
    prompter: &Prompter,
    identifier: &Identifier,
    lookup: &Lookup,
) -> Result<String, CommandError> {
    let Some(url) = lookup_url(identifier, lookup) else {
        return Ok(identifier.value().to_string());
    };

    debug!(
        collection = lookup.collection,
        value = identifier.value(),
        "resolving identifier via filter query"
    );

    let results = client.get_collection(&url).await?;
    let candidates: Vec<Candidate> = results
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .map_err(|e| CommandError::UnexpectedResponse(e.to_string()))?;

    resolve_candidates(candidates, identifier, lookup, prompter)
}

/// Builds the filter query url, or None when the identifier needs no lookup
fn lookup_url(identifier: &Identifier, lookup: &Lookup) -> Option<String> {
    let field = identifier.filter_field()?;
    Some(format!(
        "{}?$filter={} eq '{}'&$select={}",
        lookup.collection,
        field,
        escape_odata(identifier.value()),
        lookup.select
    ))
}

/// Candidate-set handling, split out from the request so the zero/one/many
/// cases stay independent of the transport.
fn resolve_candidates(
    mut candidates: Vec<Candidate>,
    identifier: &Identifier,
    lookup: &Lookup,
    prompter: &Prompter,
) -> Result<String, CommandError> {
    match candidates.len() {
        0 => Err(CommandError::NotFound {
            label: lookup.label.to_string(),
            property: identifier.property().to_string(),
            value: identifier.value().to_string(),
        }),
        1 => Ok(candidates.swap_remove(0).id),
        _ => {
            let message = format!(
                "Multiple {}s with {} '{}' found.",
                lookup.label,
                identifier.property(),
                identifier.value()
            );
            let chosen = prompter.pick_one(&message, candidates)?;
            Ok(chosen.id)
        }
    }
}

/// Single quotes in OData filter literals are escaped by doubling
fn escape_odata(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLICATIONS: Lookup = Lookup {
        collection: "applications",
        label: "Microsoft Entra application registration",
        select: "id,displayName",
    };

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            display_name: Some(format!("app-{id}")),
        }
    }

    #[test]
    fn test_explicit_id_needs_no_lookup() {
        let identifier = Identifier::Id("d75be2e1-0204-4f95-857d-51a37cf40be8".to_string());
        assert!(lookup_url(&identifier, &APPLICATIONS).is_none());
    }

    #[test]
    fn test_name_lookup_filters_on_display_name() {
        let identifier = Identifier::Name("myapp".to_string());
        assert_eq!(
            lookup_url(&identifier, &APPLICATIONS).unwrap(),
            "applications?$filter=displayName eq 'myapp'&$select=id,displayName"
        );
    }

    #[test]
    fn test_upn_lookup_filters_on_user_principal_name() {
        let identifier = Identifier::Upn("megan@contoso.com".to_string());
        let lookup = Lookup {
            collection: "users",
            label: "user",
            select: "id,displayName",
        };
        assert_eq!(
            lookup_url(&identifier, &lookup).unwrap(),
            "users?$filter=userPrincipalName eq 'megan@contoso.com'&$select=id,displayName"
        );
    }

    #[test]
    fn test_quotes_in_filter_values_are_doubled() {
        assert_eq!(escape_odata("Megan's app"), "Megan''s app");
        assert_eq!(escape_odata("plain"), "plain");
    }

    #[test]
    fn test_single_candidate_resolves_without_prompting() {
        let prompter = Prompter::new(false);
        let identifier = Identifier::Name("myapp".to_string());

        let resolved =
            resolve_candidates(vec![candidate("A")], &identifier, &APPLICATIONS, &prompter)
                .unwrap();
        assert_eq!(resolved, "A");
    }

    #[test]
    fn test_zero_candidates_fail_with_not_found() {
        let prompter = Prompter::new(true);
        let identifier = Identifier::Name("myapp".to_string());

        let error =
            resolve_candidates(Vec::new(), &identifier, &APPLICATIONS, &prompter).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No Microsoft Entra application registration with name 'myapp' found"
        );
    }

    #[test]
    fn test_multiple_candidates_fail_when_prompting_disabled() {
        let prompter = Prompter::new(false);
        let identifier = Identifier::Name("myapp".to_string());

        let error = resolve_candidates(
            vec![candidate("A"), candidate("B")],
            &identifier,
            &APPLICATIONS,
            &prompter,
        )
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Multiple Microsoft Entra application registrations with name 'myapp' found. Found: A, B."
        );
    }

    #[test]
    fn test_guid_validation_on_id_option() {
        assert!(is_valid_guid("d75be2e1-0204-4f95-857d-51a37cf40be8"));
        assert!(!is_valid_guid("not-a-guid"));

        let error = Identifier::from_id_or_name(Some("not-a-guid".to_string()), None).unwrap_err();
        assert_eq!(error.to_string(), "not-a-guid is not a valid GUID");
    }

    #[test]
    fn test_exactly_one_identifying_option_is_required() {
        assert!(Identifier::from_id_or_name(None, None).is_err());
        assert!(
            Identifier::from_id_or_name(
                Some("d75be2e1-0204-4f95-857d-51a37cf40be8".to_string()),
                Some("myapp".to_string())
            )
            .is_err()
        );
        assert_eq!(
            Identifier::from_id_or_name(None, Some("myapp".to_string())).unwrap(),
            Identifier::Name("myapp".to_string())
        );
    }
}
