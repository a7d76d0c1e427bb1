use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::FolderStrategy;
use crate::error::ConfigError;

/// Deployment stage a collection is generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Acc,
    #[default]
    Test,
    Prod,
}

impl Environment {
    /// Name used in `servers[].description` for this stage.
    pub const fn display_name(self) -> &'static str {
        match self {
            Environment::Acc => "Acceptance",
            Environment::Test => "Testing",
            Environment::Prod => "Production",
        }
    }

    /// Host suffix used by the identity provider (`account-acc`, `account-test`, `account`).
    pub const fn host_suffix(self) -> &'static str {
        match self {
            Environment::Acc => "-acc",
            Environment::Test => "-test",
            Environment::Prod => "",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Environment::Acc => "acc",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acc" => Ok(Environment::Acc),
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// OAuth2 grant type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    ClientCredentials,
    AuthorizationCode,
}

impl GrantType {
    pub const fn as_str(self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::AuthorizationCode => "authorization_code",
        }
    }
}

impl FromStr for GrantType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client_credentials" => Ok(GrantType::ClientCredentials),
            "authorization_code" => Ok(GrantType::AuthorizationCode),
            other => Err(ConfigError::UnknownGrantType(other.to_string())),
        }
    }
}

/// Token grant with the data only that grant needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    ClientCredentials,
    AuthorizationCode { callback_url: String },
}

/// How requests in the generated collection authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthOptions {
    /// No auth block at all.
    #[default]
    None,
    /// A static `x-client-id` header.
    ClientId { client_id: String },
    /// OAuth2 token flow.
    Token {
        grant: TokenGrant,
        client_id: String,
        client_secret: String,
        auth_per_request: bool,
    },
}

/// Caller input for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub environment: Environment,
    pub custom_base_url: Option<String>,
    pub auth: AuthOptions,
}

/// Identity provider endpoints and audience used to fill OAuth2 variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProvider {
    pub token_url: String,
    pub authorize_url: String,
    pub audience: String,
}

const DEFAULT_TOKEN_URL: &str = "https://account{suffix}.uitid.be/oauth/token";
const DEFAULT_AUTHORIZE_URL: &str =
    "https://account{suffix}.uitid.be/authorize?audience=https://api.publiq.be&prompt=login";
const DEFAULT_AUDIENCE: &str = "https://api.publiq.be";

impl IdentityProvider {
    /// The publiq UiTiD endpoints for the given environment.
    pub fn for_environment(environment: Environment) -> Self {
        IdentityConfig::default().resolve(environment)
    }
}

/// Which auth method to configure, as written in the config file or on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AuthMethod {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "x-client-id")]
    ClientId,
    #[serde(rename = "token")]
    Token,
}

impl FromStr for AuthMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AuthMethod::None),
            "x-client-id" => Ok(AuthMethod::ClientId),
            "token" => Ok(AuthMethod::Token),
            other => Err(ConfigError::UnknownAuthMethod(other.to_string())),
        }
    }
}

/// Loose auth settings; validated into [`AuthOptions`] by [`AuthConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub method: AuthMethod,
    pub grant_type: Option<GrantType>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_url: Option<String>,
    pub auth_per_request: bool,
}

impl AuthConfig {
    pub fn resolve(&self) -> Result<AuthOptions, ConfigError> {
        match self.method {
            AuthMethod::None => Ok(AuthOptions::None),
            AuthMethod::ClientId => Ok(AuthOptions::ClientId {
                client_id: required(&self.client_id, "client_id")?,
            }),
            AuthMethod::Token => {
                let grant = match self
                    .grant_type
                    .ok_or(ConfigError::MissingAuthOption("grant_type"))?
                {
                    GrantType::ClientCredentials => TokenGrant::ClientCredentials,
                    GrantType::AuthorizationCode => TokenGrant::AuthorizationCode {
                        callback_url: required(&self.callback_url, "callback_url")?,
                    },
                };
                Ok(AuthOptions::Token {
                    grant,
                    client_id: required(&self.client_id, "client_id")?,
                    client_secret: required(&self.client_secret, "client_secret")?,
                    auth_per_request: self.auth_per_request,
                })
            }
        }
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingAuthOption(name))
}

/// Overrides for the identity provider. `{suffix}` expands to the environment's host suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub token_url: Option<String>,
    pub authorize_url: Option<String>,
    pub audience: Option<String>,
}

impl IdentityConfig {
    pub fn resolve(&self, environment: Environment) -> IdentityProvider {
        let expand = |template: &str| template.replace("{suffix}", environment.host_suffix());
        IdentityProvider {
            token_url: expand(self.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL)),
            authorize_url: expand(
                self.authorize_url
                    .as_deref()
                    .unwrap_or(DEFAULT_AUTHORIZE_URL),
            ),
            audience: self
                .audience
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
        }
    }
}

/// Top-level project configuration loaded from `.o2p.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub input: String,
    pub output: Option<String>,
    pub environment: Environment,
    pub base_url: Option<String>,
    pub auth: AuthConfig,
    pub identity: IdentityConfig,
    pub folder_strategy: FolderStrategy,
    pub collapse_folders: bool,
    pub pretty: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "openapi.json".to_string(),
            output: None,
            environment: Environment::default(),
            base_url: None,
            auth: AuthConfig::default(),
            identity: IdentityConfig::default(),
            folder_strategy: FolderStrategy::default(),
            collapse_folders: false,
            pretty: true,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".o2p.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProjectConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# o2p configuration
input: openapi.json
# output: collection.json   # omit to write to stdout
environment: test           # acc | test | prod
# base_url: https://api-test.example.com

auth:
  method: none              # none | x-client-id | token
  # grant_type: client_credentials   # client_credentials | authorization_code
  # client_id: my-client
  # client_secret: my-secret
  # callback_url: https://oauth.pstmn.io/v1/callback
  auth_per_request: false

identity: {}
  # token_url: https://account{suffix}.uitid.be/oauth/token
  # authorize_url: https://account{suffix}.uitid.be/authorize?audience=https://api.publiq.be&prompt=login
  # audience: https://api.publiq.be

folder_strategy: tags       # tags | paths
collapse_folders: false
pretty: true
"#
}
