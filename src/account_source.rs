//! Remote account source
//!
//! Looks up profile data for an address. The wallet calls it when an unknown
//! account is added and when cached accounts are refreshed.

use crate::account::{Account, Address};
use crate::config::{AccountSourceConfig, ACCOUNT_API_KEY_ENV};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Fetch the current account record, `None` when the address is unknown
    async fn fetch(&self, address: &Address) -> Result<Option<Account>>;
}

const ACCOUNT_QUERY: &str = r#"
    query AccountQuery($address: AddressScalar!) {
        account(address: $address) {
            address
            imageUrl
            user {
                publicUsername
            }
        }
    }
"#;

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<AccountData>,
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: Option<AccountNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountNode {
    address: String,
    image_url: Option<String>,
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    public_username: Option<String>,
}

impl From<AccountNode> for Account {
    fn from(node: AccountNode) -> Self {
        Account {
            address: Address::new(node.address),
            username: node.user.and_then(|u| u.public_username),
            image_url: node.image_url,
            fetched_at: Some(Utc::now()),
        }
    }
}

/// Account source backed by a GraphQL endpoint
pub struct GraphqlAccountSource {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl GraphqlAccountSource {
    pub fn new(config: &AccountSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Read the API key from ACCOUNT_API_KEY, if set
    pub fn with_env_api_key(self) -> Self {
        match std::env::var(ACCOUNT_API_KEY_ENV) {
            Ok(key) => self.with_api_key(SecretString::from(key)),
            Err(_) => self,
        }
    }
}

#[async_trait]
impl AccountSource for GraphqlAccountSource {
    async fn fetch(&self, address: &Address) -> Result<Option<Account>> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "query": ACCOUNT_QUERY,
            "variables": { "address": address.as_str() }
        }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = request.send().await?.error_for_status()?;
        let body: GraphQLResponse = response.json().await?;
        parse_account_response(body)
    }
}

fn parse_account_response(body: GraphQLResponse) -> Result<Option<Account>> {
    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        return Err(Error::AccountSource(format!("GraphQL errors: {:?}", errors)));
    }
    let data = body
        .data
        .ok_or_else(|| Error::AccountSource("No data in GraphQL response".to_string()))?;
    Ok(data.account.map(Account::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> Result<Option<Account>> {
        parse_account_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn parses_found_account() {
        let account = parse(json!({
            "data": {
                "account": {
                    "address": "0xAbC",
                    "imageUrl": "https://img/abc.png",
                    "user": { "publicUsername": "alice" }
                }
            }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(account.address, Address::new("0xabc"));
        assert_eq!(account.username.as_deref(), Some("alice"));
        assert_eq!(account.image_url.as_deref(), Some("https://img/abc.png"));
        assert!(account.fetched_at.is_some());
    }

    #[test]
    fn missing_account_is_not_found() {
        let account = parse(json!({ "data": { "account": null } })).unwrap();
        assert!(account.is_none());
    }

    #[test]
    fn graphql_errors_surface() {
        let err = parse(json!({ "data": null, "errors": [{ "message": "boom" }] })).unwrap_err();
        assert!(matches!(err, Error::AccountSource(msg) if msg.contains("boom")));
    }

    #[test]
    fn builds_from_config() {
        let source = GraphqlAccountSource::new(&AccountSourceConfig::default())
            .unwrap()
            .with_api_key(SecretString::from("secret".to_string()));
        assert!(source.api_key.is_some());
    }
}
