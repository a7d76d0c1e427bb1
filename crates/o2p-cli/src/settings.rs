use std::path::PathBuf;

use clap::{Args, ValueEnum};

use o2p_core::config::{
    AuthMethod, Environment, EnvironmentConfig, GrantType, IdentityConfig, ProjectConfig,
};
use o2p_core::error::ConfigError;
use o2p_core::{ConversionOptions, FolderStrategy};

#[derive(Clone, Copy, ValueEnum)]
pub enum FolderStrategyArg {
    Tags,
    Paths,
}

impl From<FolderStrategyArg> for FolderStrategy {
    fn from(arg: FolderStrategyArg) -> Self {
        match arg {
            FolderStrategyArg::Tags => FolderStrategy::Tags,
            FolderStrategyArg::Paths => FolderStrategy::Paths,
        }
    }
}

/// Flags for `o2p convert`. Anything left unset falls back to `.o2p.yaml`.
#[derive(Args, Default)]
pub struct ConvertArgs {
    /// Path to the root OpenAPI document (JSON or YAML)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Where to write the collection (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target environment: acc, test or prod
    #[arg(short, long)]
    pub environment: Option<Environment>,

    /// Base URL to use instead of the one found in `servers`
    #[arg(long)]
    pub base_url: Option<String>,

    /// Authentication method: none, x-client-id or token
    #[arg(long)]
    pub auth_method: Option<AuthMethod>,

    /// OAuth2 grant type: client_credentials or authorization_code
    #[arg(long)]
    pub grant_type: Option<GrantType>,

    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub client_secret: Option<String>,

    /// Redirect URI for the authorization_code grant
    #[arg(long)]
    pub callback_url: Option<String>,

    /// Put the auth block on every request instead of once on the collection
    #[arg(long)]
    pub auth_per_request: bool,

    /// Group requests by tag or by first path segment
    #[arg(long)]
    pub folder_strategy: Option<FolderStrategyArg>,

    /// Replace folders holding a single request with that request
    #[arg(long)]
    pub collapse_folders: bool,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    pub compact: bool,

    /// Print progress while converting
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything one `convert` run needs, after merging flags over config.
#[derive(Debug)]
pub struct ConvertSettings {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub environment: EnvironmentConfig,
    pub identity: IdentityConfig,
    pub options: ConversionOptions,
    pub pretty: bool,
    pub verbose: bool,
}

pub fn resolve(args: ConvertArgs, config: ProjectConfig) -> Result<ConvertSettings, ConfigError> {
    let mut auth = config.auth;
    if let Some(method) = args.auth_method {
        auth.method = method;
    }
    if args.grant_type.is_some() {
        auth.grant_type = args.grant_type;
    }
    if args.client_id.is_some() {
        auth.client_id = args.client_id;
    }
    if args.client_secret.is_some() {
        auth.client_secret = args.client_secret;
    }
    if args.callback_url.is_some() {
        auth.callback_url = args.callback_url;
    }
    auth.auth_per_request |= args.auth_per_request;

    Ok(ConvertSettings {
        input: args.input.unwrap_or_else(|| PathBuf::from(&config.input)),
        output: args.output.or_else(|| config.output.map(PathBuf::from)),
        environment: EnvironmentConfig {
            environment: args.environment.unwrap_or(config.environment),
            custom_base_url: args
                .base_url
                .or(config.base_url)
                .filter(|url| !url.is_empty()),
            auth: auth.resolve()?,
        },
        identity: config.identity,
        options: ConversionOptions {
            folder_strategy: args
                .folder_strategy
                .map(FolderStrategy::from)
                .unwrap_or(config.folder_strategy),
            collapse_folders: args.collapse_folders || config.collapse_folders,
        },
        pretty: config.pretty && !args.compact,
        verbose: args.verbose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use o2p_core::config::{AuthOptions, TokenGrant};

    #[test]
    fn test_defaults_without_flags_or_config() {
        let settings = resolve(ConvertArgs::default(), ProjectConfig::default()).unwrap();
        assert_eq!(settings.input, PathBuf::from("openapi.json"));
        assert_eq!(settings.output, None);
        assert_eq!(settings.environment, EnvironmentConfig::default());
        assert_eq!(settings.options, ConversionOptions::default());
        assert!(settings.pretty);
    }

    #[test]
    fn test_flags_override_config() {
        let config: ProjectConfig = serde_yaml_ng::from_str(
            r#"
input: api/openapi.json
output: collection.json
environment: prod
base_url: https://from-config.example.com
auth:
  method: token
  grant_type: client_credentials
  client_id: config-id
  client_secret: config-secret
"#,
        )
        .unwrap();
        let args = ConvertArgs {
            environment: Some(Environment::Acc),
            client_id: Some("flag-id".to_string()),
            auth_per_request: true,
            folder_strategy: Some(FolderStrategyArg::Paths),
            compact: true,
            ..ConvertArgs::default()
        };

        let settings = resolve(args, config).unwrap();
        assert_eq!(settings.input, PathBuf::from("api/openapi.json"));
        assert_eq!(settings.output, Some(PathBuf::from("collection.json")));
        assert_eq!(settings.environment.environment, Environment::Acc);
        assert_eq!(
            settings.environment.custom_base_url.as_deref(),
            Some("https://from-config.example.com")
        );
        assert_eq!(
            settings.environment.auth,
            AuthOptions::Token {
                grant: TokenGrant::ClientCredentials,
                client_id: "flag-id".to_string(),
                client_secret: "config-secret".to_string(),
                auth_per_request: true,
            }
        );
        assert_eq!(settings.options.folder_strategy, FolderStrategy::Paths);
        assert!(!settings.pretty);
    }

    #[test]
    fn test_empty_base_url_flag_means_none() {
        let args = ConvertArgs {
            base_url: Some(String::new()),
            ..ConvertArgs::default()
        };
        let settings = resolve(args, ProjectConfig::default()).unwrap();
        assert_eq!(settings.environment.custom_base_url, None);
    }

    #[test]
    fn test_incomplete_token_flags_are_rejected() {
        let args = ConvertArgs {
            auth_method: Some(AuthMethod::Token),
            grant_type: Some(GrantType::AuthorizationCode),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            ..ConvertArgs::default()
        };
        let err = resolve(args, ProjectConfig::default()).unwrap_err();
        assert!(err.to_string().contains("callback_url"));
    }
}
