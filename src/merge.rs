use clap::ValueEnum;
use serde_json::{Value, json};

/// Application platform owning one of the parallel redirect URI collections
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Platform {
    #[value(name = "spa")]
    Spa,
    #[value(name = "web")]
    Web,
    #[value(name = "publicClient")]
    PublicClient,
}

/// Applies an add/remove delta to a whole-collection snapshot.
///
/// Removal runs first, addition second; the ordering is fixed, so a value
/// named in both lists ends up present. Additions already present are
/// skipped, existing order is preserved and new values are appended in
/// input order. The result is the complete replacement collection to
/// submit; a partial list would delete the omitted entries server-side.
pub fn apply_delta(current: &[String], add: &[String], remove: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = current
        .iter()
        .filter(|value| !remove.contains(value))
        .cloned()
        .collect();

    for value in add {
        if !merged.contains(value) {
            merged.push(value.clone());
        }
    }

    merged
}

/// Redirect URIs grouped by application platform.
///
/// Graph exposes these as three parallel collections that must each be
/// replaced whole on update. Removal applies across every platform;
/// addition targets only the destination platform.
#[derive(Debug, Default, PartialEq)]
pub struct RedirectUriSet {
    pub spa: Vec<String>,
    pub web: Vec<String>,
    pub public_client: Vec<String>,
}

impl RedirectUriSet {
    /// Reads the current redirect URIs out of an application snapshot
    pub fn from_application(application: &Value) -> Self {
        Self {
            spa: platform_uris(application, "spa"),
            web: platform_uris(application, "web"),
            public_client: platform_uris(application, "publicClient"),
        }
    }

    pub fn apply(&mut self, platform: Option<Platform>, add: &[String], remove: &[String]) {
        self.spa = apply_delta(&self.spa, &[], remove);
        self.web = apply_delta(&self.web, &[], remove);
        self.public_client = apply_delta(&self.public_client, &[], remove);

        if let Some(platform) = platform {
            let target = match platform {
                Platform::Spa => &mut self.spa,
                Platform::Web => &mut self.web,
                Platform::PublicClient => &mut self.public_client,
            };
            *target = apply_delta(target, add, &[]);
        }
    }

    /// The replacement PATCH body. All three collections are always carried
    /// in full; omitting existing entries would delete them server-side.
    pub fn to_patch_body(&self) -> Value {
        json!({
            "publicClient": { "redirectUris": self.public_client },
            "spa": { "redirectUris": self.spa },
            "web": { "redirectUris": self.web },
        })
    }
}

fn platform_uris(application: &Value, platform: &str) -> Vec<String> {
    application[platform]["redirectUris"]
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Replaces any credential carrying the same key and appends the new one.
/// The whole list is what gets submitted on update.
pub fn merge_key_credentials(current: Vec<Value>, new_credential: Value) -> Vec<Value> {
    let key = new_credential["key"].clone();
    let mut credentials: Vec<Value> = current
        .into_iter()
        .filter(|credential| credential["key"] != key)
        .collect();
    credentials.push(new_credential);
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_delta_removes_then_adds() {
        let merged = apply_delta(&list(&["a", "b", "c"]), &list(&["d"]), &list(&["b"]));
        assert_eq!(merged, list(&["a", "c", "d"]));
    }

    #[test]
    fn test_delta_is_idempotent() {
        let once = apply_delta(&list(&["a"]), &list(&["b", "c"]), &[]);
        let twice = apply_delta(&once, &list(&["b", "c"]), &[]);
        assert_eq!(once, twice);
        assert_eq!(twice, list(&["a", "b", "c"]));
    }

    // The ordering is observed behavior and must not be flipped: removal
    // runs first, so a value named in both lists ends up present.
    #[test]
    fn test_value_in_both_lists_ends_up_present() {
        let merged = apply_delta(&list(&["a", "x"]), &list(&["x"]), &list(&["x"]));
        assert_eq!(merged, list(&["a", "x"]));
    }

    #[test]
    fn test_delta_preserves_existing_order() {
        let merged = apply_delta(&list(&["c", "a", "b"]), &list(&["e", "d"]), &[]);
        assert_eq!(merged, list(&["c", "a", "b", "e", "d"]));
    }

    #[test]
    fn test_redirect_uris_added_to_selected_platform_only() {
        let application = json!({
            "spa": { "redirectUris": ["x"] },
            "web": { "redirectUris": [] },
            "publicClient": { "redirectUris": [] },
        });

        let mut uris = RedirectUriSet::from_application(&application);
        uris.apply(Some(Platform::Spa), &list(&["y"]), &[]);

        assert_eq!(
            uris.to_patch_body(),
            json!({
                "publicClient": { "redirectUris": [] },
                "spa": { "redirectUris": ["x", "y"] },
                "web": { "redirectUris": [] },
            })
        );
    }

    #[test]
    fn test_redirect_uris_removed_from_every_platform() {
        let application = json!({
            "spa": { "redirectUris": ["https://app/spa", "https://shared"] },
            "web": { "redirectUris": ["https://shared"] },
            "publicClient": { "redirectUris": ["https://shared", "https://app/native"] },
        });

        let mut uris = RedirectUriSet::from_application(&application);
        uris.apply(None, &[], &list(&["https://shared"]));

        assert_eq!(uris.spa, list(&["https://app/spa"]));
        assert_eq!(uris.web, Vec::<String>::new());
        assert_eq!(uris.public_client, list(&["https://app/native"]));
    }

    #[test]
    fn test_missing_platforms_read_as_empty() {
        let uris = RedirectUriSet::from_application(&json!({ "spa": {} }));
        assert_eq!(uris, RedirectUriSet::default());
    }

    #[test]
    fn test_key_credential_with_same_key_is_replaced() {
        let current = vec![
            json!({ "key": "old", "displayName": "previous" }),
            json!({ "key": "cert", "displayName": "stale copy" }),
        ];
        let merged = merge_key_credentials(
            current,
            json!({ "key": "cert", "displayName": "renewed", "type": "AsymmetricX509Cert" }),
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["key"], "old");
        assert_eq!(merged[1]["displayName"], "renewed");
    }
}
