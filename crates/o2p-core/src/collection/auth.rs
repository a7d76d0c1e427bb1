use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::GrantType;

const GRANT_TYPE: &str = "grant_type";
const TOKEN_NAME: &str = "tokenName";
const CHALLENGE_ALGORITHM: &str = "challengeAlgorithm";
const ACCESS_TOKEN_URL: &str = "accessTokenUrl";
const CLIENT_ID: &str = "clientId";
const CLIENT_SECRET: &str = "clientSecret";
const ADD_TOKEN_TO: &str = "addTokenTo";
const CLIENT_AUTHENTICATION: &str = "client_authentication";
const AUDIENCE: &str = "audience";
const AUTH_URL: &str = "authUrl";
const REDIRECT_URI: &str = "redirect_uri";

const APIKEY_KEY: &str = "key";
const APIKEY_VALUE: &str = "value";
const APIKEY_IN: &str = "in";

/// A single typed key/value entry of a Postman auth block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParam {
    pub key: String,
    pub value: String,
    #[serde(rename = "type", default = "string_type")]
    pub param_type: String,
}

fn string_type() -> String {
    "string".to_string()
}

impl AuthParam {
    fn string(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            param_type: string_type(),
        }
    }
}

/// Grant-specific part of an OAuth2 scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuth2Flow {
    ClientCredentials,
    /// Authorization-code flows carry the redirect step's URLs.
    AuthorizationCode {
        auth_url: String,
        redirect_uri: String,
    },
}

impl OAuth2Flow {
    pub fn grant_type(&self) -> GrantType {
        match self {
            OAuth2Flow::ClientCredentials => GrantType::ClientCredentials,
            OAuth2Flow::AuthorizationCode { .. } => GrantType::AuthorizationCode,
        }
    }
}

/// OAuth2 settings. Credential fields hold `{{variable}}` references, never secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Scheme {
    pub flow: OAuth2Flow,
    pub token_name: String,
    pub challenge_algorithm: String,
    pub access_token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub add_token_to: String,
    pub client_authentication: String,
    pub audience: String,
}

/// A static header carrying a client identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentifier {
    pub header: String,
    pub value: String,
}

/// Authentication attached to a collection or a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAuth", into = "RawAuth")]
pub enum AuthScheme {
    OAuth2(OAuth2Scheme),
    StaticIdentifier(StaticIdentifier),
}

impl AuthScheme {
    /// Postman `type` of this block.
    pub fn auth_type(&self) -> &'static str {
        match self {
            AuthScheme::OAuth2(_) => "oauth2",
            AuthScheme::StaticIdentifier(_) => "apikey",
        }
    }

    /// The ordered parameter list as it appears in the collection.
    pub fn params(&self) -> Vec<AuthParam> {
        match self {
            AuthScheme::OAuth2(scheme) => {
                let mut params = vec![
                    AuthParam::string(GRANT_TYPE, scheme.flow.grant_type().as_str()),
                    AuthParam::string(TOKEN_NAME, &scheme.token_name),
                    AuthParam::string(CHALLENGE_ALGORITHM, &scheme.challenge_algorithm),
                    AuthParam::string(ACCESS_TOKEN_URL, &scheme.access_token_url),
                    AuthParam::string(CLIENT_ID, &scheme.client_id),
                    AuthParam::string(CLIENT_SECRET, &scheme.client_secret),
                    AuthParam::string(ADD_TOKEN_TO, &scheme.add_token_to),
                    AuthParam::string(CLIENT_AUTHENTICATION, &scheme.client_authentication),
                    AuthParam::string(AUDIENCE, &scheme.audience),
                ];
                match &scheme.flow {
                    OAuth2Flow::ClientCredentials => {}
                    OAuth2Flow::AuthorizationCode {
                        auth_url,
                        redirect_uri,
                    } => {
                        params.push(AuthParam::string(AUTH_URL, auth_url));
                        params.push(AuthParam::string(REDIRECT_URI, redirect_uri));
                    }
                }
                params
            }
            AuthScheme::StaticIdentifier(identifier) => vec![
                AuthParam::string(APIKEY_KEY, &identifier.header),
                AuthParam::string(APIKEY_VALUE, &identifier.value),
                AuthParam::string(APIKEY_IN, "header"),
            ],
        }
    }

    /// Look up a parameter value by key.
    pub fn param(&self, key: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|p| p.key == key)
            .map(|p| p.value)
    }
}

/// Wire shape of a Postman auth block.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAuth {
    #[serde(rename = "type")]
    auth_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    oauth2: Vec<AuthParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    apikey: Vec<AuthParam>,
}

impl From<AuthScheme> for RawAuth {
    fn from(scheme: AuthScheme) -> Self {
        let params = scheme.params();
        let auth_type = scheme.auth_type().to_string();
        match scheme {
            AuthScheme::OAuth2(_) => RawAuth {
                auth_type,
                oauth2: params,
                apikey: Vec::new(),
            },
            AuthScheme::StaticIdentifier(_) => RawAuth {
                auth_type,
                oauth2: Vec::new(),
                apikey: params,
            },
        }
    }
}

impl TryFrom<RawAuth> for AuthScheme {
    type Error = String;

    fn try_from(raw: RawAuth) -> Result<Self, Self::Error> {
        match raw.auth_type.as_str() {
            "oauth2" => {
                let mut params: IndexMap<String, String> =
                    raw.oauth2.into_iter().map(|p| (p.key, p.value)).collect();
                let mut take = |key: &str| {
                    params
                        .shift_remove(key)
                        .ok_or_else(|| format!("oauth2 auth is missing `{key}`"))
                };
                let flow = match take(GRANT_TYPE)?.as_str() {
                    "client_credentials" => OAuth2Flow::ClientCredentials,
                    "authorization_code" => OAuth2Flow::AuthorizationCode {
                        auth_url: take(AUTH_URL)?,
                        redirect_uri: take(REDIRECT_URI)?,
                    },
                    other => return Err(format!("unsupported oauth2 grant type `{other}`")),
                };
                Ok(AuthScheme::OAuth2(OAuth2Scheme {
                    flow,
                    token_name: take(TOKEN_NAME)?,
                    challenge_algorithm: take(CHALLENGE_ALGORITHM)?,
                    access_token_url: take(ACCESS_TOKEN_URL)?,
                    client_id: take(CLIENT_ID)?,
                    client_secret: take(CLIENT_SECRET)?,
                    add_token_to: take(ADD_TOKEN_TO)?,
                    client_authentication: take(CLIENT_AUTHENTICATION)?,
                    audience: take(AUDIENCE)?,
                }))
            }
            "apikey" => {
                let find = |key: &str| {
                    raw.apikey
                        .iter()
                        .find(|p| p.key == key)
                        .map(|p| p.value.clone())
                        .ok_or_else(|| format!("apikey auth is missing `{key}`"))
                };
                Ok(AuthScheme::StaticIdentifier(StaticIdentifier {
                    header: find(APIKEY_KEY)?,
                    value: find(APIKEY_VALUE)?,
                }))
            }
            other => Err(format!("unsupported auth type `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_identifier_wire_shape() {
        let scheme = AuthScheme::StaticIdentifier(StaticIdentifier {
            header: "x-client-id".to_string(),
            value: "{{clientId}}".to_string(),
        });
        let value = serde_json::to_value(&scheme).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "apikey",
                "apikey": [
                    { "key": "key", "value": "x-client-id", "type": "string" },
                    { "key": "value", "value": "{{clientId}}", "type": "string" },
                    { "key": "in", "value": "header", "type": "string" }
                ]
            })
        );
    }

    #[test]
    fn test_oauth2_deserializes_back_into_closed_variant() {
        let scheme = AuthScheme::OAuth2(OAuth2Scheme {
            flow: OAuth2Flow::AuthorizationCode {
                auth_url: "{{oauth2AuthUrl}}".to_string(),
                redirect_uri: "{{oauth2RedirectUri}}".to_string(),
            },
            token_name: "User access token".to_string(),
            challenge_algorithm: "S256".to_string(),
            access_token_url: "{{oauth2AccessTokenUrl}}".to_string(),
            client_id: "{{oauth2ClientId}}".to_string(),
            client_secret: "{{oauth2ClientSecret}}".to_string(),
            add_token_to: "header".to_string(),
            client_authentication: "header".to_string(),
            audience: "https://api.publiq.be".to_string(),
        });
        let json = serde_json::to_string(&scheme).unwrap();
        let parsed: AuthScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scheme);
    }

    #[test]
    fn test_authorization_code_without_auth_url_is_rejected() {
        let json = r#"{
            "type": "oauth2",
            "oauth2": [
                { "key": "grant_type", "value": "authorization_code" },
                { "key": "redirect_uri", "value": "{{oauth2RedirectUri}}" }
            ]
        }"#;
        let err = serde_json::from_str::<AuthScheme>(json).unwrap_err();
        assert!(err.to_string().contains("authUrl"));
    }

    #[test]
    fn test_unknown_auth_type_is_rejected() {
        let err = serde_json::from_str::<AuthScheme>(r#"{"type":"bearer"}"#).unwrap_err();
        assert!(err.to_string().contains("bearer"));
    }
}
