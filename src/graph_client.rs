use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::CommandError;

/// Url constant for Microsoft Graph API
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// UserInfo returned from Microsoft Graph
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Client for interacting with Microsoft Graph API.
///
/// Owns the bearer token and the resource base url, and is passed explicitly
/// into every resolver and merger call. Each command issues its requests
/// strictly in sequence through this client.
pub struct GraphClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    /// Create a new Microsoft Graph client with the given access token
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, GRAPH_BASE_URL.to_string())
    }

    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            base_url,
        }
    }

    /// Get the authenticated user's information
    pub async fn get_user_info(&self) -> Result<UserInfo, CommandError> {
        let response = self.send(Method::GET, "me", None).await?;

        let user_info: UserInfo = response
            .json()
            .await
            .map_err(|e| CommandError::UnexpectedResponse(e.to_string()))?;

        Ok(user_info)
    }

    /// Issue a GET request and parse the JSON response
    pub async fn get_json(&self, path: &str) -> Result<Value, CommandError> {
        let response = self.send(Method::GET, path, None).await?;
        let data: Value = response
            .json()
            .await
            .map_err(|e| CommandError::UnexpectedResponse(e.to_string()))?;
        Ok(data)
    }

    /// Issue a GET request against a collection endpoint, following
    /// @odata.nextLink pagination until the collection is exhausted
    pub async fn get_collection(&self, path: &str) -> Result<Vec<Value>, CommandError> {
        let mut items = Vec::new();
        let mut url = path.to_string();

        loop {
            let data = self.get_json(&url).await?;
            let page = data["value"].as_array().ok_or_else(|| {
                CommandError::UnexpectedResponse("expected a collection response".to_string())
            })?;
            items.extend(page.iter().cloned());

            match data["@odata.nextLink"].as_str() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        Ok(items)
    }

    /// Issue a PATCH request with a JSON body. Graph replies 204 No Content
    /// on success, so nothing is parsed back.
    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<(), CommandError> {
        self.send(Method::PATCH, path, Some(body)).await?;
        Ok(())
    }

    /// Issue a POST request with a JSON body and parse the JSON response
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, CommandError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        let data: Value = response
            .json()
            .await
            .map_err(|e| CommandError::UnexpectedResponse(e.to_string()))?;
        Ok(data)
    }

    /// Issue a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), CommandError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, CommandError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request to Microsoft Graph");

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json;odata.metadata=none");

        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not get error details".to_string());
            return Err(CommandError::Api {
                status: status.as_u16(),
                message: extract_odata_message(&error_text),
            });
        }

        Ok(response)
    }

    /// Relative paths are resolved against the resource base url;
    /// @odata.nextLink values come back absolute and pass through unchanged.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Pull the human-readable message out of an OData error envelope,
/// falling back to the raw body when the envelope isn't there.
fn extract_odata_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|data| data["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_message_from_odata_envelope() {
        let body = r#"{"error":{"code":"Request_ResourceNotFound","message":"Resource 'x' does not exist."}}"#;
        assert_eq!(extract_odata_message(body), "Resource 'x' does not exist.");
    }

    #[test]
    fn test_falls_back_to_raw_body_without_envelope() {
        assert_eq!(extract_odata_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(
            extract_odata_message(r#"{"detail":"nope"}"#),
            r#"{"detail":"nope"}"#
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_base_url() {
        let client = GraphClient::new("token".to_string());
        assert_eq!(
            client.url("applications?$select=id"),
            format!("{}/applications?$select=id", GRAPH_BASE_URL)
        );
        assert_eq!(
            client.url("https://graph.microsoft.com/v1.0/me/todo/lists?$skiptoken=abc"),
            "https://graph.microsoft.com/v1.0/me/todo/lists?$skiptoken=abc"
        );
    }
}
