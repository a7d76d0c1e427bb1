use crate::collection::Collection;
use crate::config::Environment;
use crate::parse::server::Server;

pub const BASE_URL_VAR: &str = "baseUrl";

/// Where the resolved base URL came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrlSource {
    /// Supplied by the caller.
    Custom,
    /// A server whose description names the target environment.
    Server,
    /// Derived from the Testing server by swapping `-test.` for `-acc.`.
    GuessedFromTesting { testing_url: String },
    /// Nothing matched; the URL is empty.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrlResolution {
    pub url: String,
    pub source: BaseUrlSource,
}

impl BaseUrlResolution {
    /// Warning text for resolutions the caller has to double-check.
    pub fn warning(&self, environment: Environment) -> Option<String> {
        match &self.source {
            BaseUrlSource::Custom | BaseUrlSource::Server => None,
            BaseUrlSource::GuessedFromTesting { testing_url } => Some(format!(
                "No server found in OpenAPI schema for {} environment, guessed base URL {} from the {} server {}. Verify it after importing the Postman collection!",
                environment.display_name(),
                self.url,
                Environment::Test.display_name(),
                testing_url,
            )),
            BaseUrlSource::Missing => Some(format!(
                "Could not configure base URL, no server found in OpenAPI schema for {} environment. Make sure to configure the correct base URL yourself after importing the Postman collection!",
                environment.display_name(),
            )),
        }
    }
}

/// Pick the base URL. First match wins:
/// 1. a non-empty custom URL;
/// 2. the server described as the environment's display name;
/// 3. for `acc` only, the Testing server with `-test.` replaced by `-acc.`;
/// 4. an empty string.
pub fn resolve_base_url(
    servers: &[Server],
    environment: Environment,
    custom_base_url: Option<&str>,
) -> BaseUrlResolution {
    if let Some(custom) = custom_base_url.filter(|url| !url.is_empty()) {
        return BaseUrlResolution {
            url: custom.to_string(),
            source: BaseUrlSource::Custom,
        };
    }

    let find = |name: &str| {
        servers
            .iter()
            .find(|server| server.description.as_deref() == Some(name))
    };

    if let Some(server) = find(environment.display_name()) {
        return BaseUrlResolution {
            url: server.expanded_url(),
            source: BaseUrlSource::Server,
        };
    }

    if environment == Environment::Acc {
        if let Some(testing) = find(Environment::Test.display_name()) {
            let testing_url = testing.expanded_url();
            return BaseUrlResolution {
                url: testing_url.replacen("-test.", "-acc.", 1),
                source: BaseUrlSource::GuessedFromTesting { testing_url },
            };
        }
    }

    BaseUrlResolution {
        url: String::new(),
        source: BaseUrlSource::Missing,
    }
}

/// Discard any `baseUrl` variable already present and append the resolved one.
pub fn apply_base_url(mut collection: Collection, resolution: &BaseUrlResolution) -> Collection {
    collection.remove_variable(BASE_URL_VAR);
    collection.set_variable(BASE_URL_VAR, resolution.url.clone());
    collection
}
