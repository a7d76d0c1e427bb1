use crate::collection::{
    AuthScheme, Collection, OAuth2Flow, OAuth2Scheme, RequestItem, StaticIdentifier, Variable,
};
use crate::config::{AuthOptions, IdentityProvider, TokenGrant};

use super::map_requests;

pub const OAUTH2_CLIENT_ID_VAR: &str = "oauth2ClientId";
pub const OAUTH2_CLIENT_SECRET_VAR: &str = "oauth2ClientSecret";
pub const OAUTH2_ACCESS_TOKEN_URL_VAR: &str = "oauth2AccessTokenUrl";
pub const OAUTH2_AUTH_URL_VAR: &str = "oauth2AuthUrl";
pub const OAUTH2_REDIRECT_URI_VAR: &str = "oauth2RedirectUri";
pub const CLIENT_ID_VAR: &str = "clientId";

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const USER_TOKEN_NAME: &str = "User access token";
pub const CLIENT_TOKEN_NAME: &str = "Client access token";

const CHALLENGE_ALGORITHM: &str = "S256";
const TOKEN_PLACEMENT: &str = "header";
const CLIENT_AUTHENTICATION: &str = "header";

/// Where the synthesized scheme is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlacement {
    /// Once on the collection root; every request inherits (`auth: null`).
    Collection,
    /// A copy on every request; nothing on the root.
    PerRequest,
}

/// A synthesized scheme plus the collection variables it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSetup {
    pub scheme: AuthScheme,
    pub variables: Vec<Variable>,
    pub placement: AuthPlacement,
}

fn reference(variable: &str) -> String {
    format!("{{{{{variable}}}}}")
}

/// Build the OAuth2 scheme for a grant. Credentials are variable references only.
pub fn oauth2_scheme(grant: &TokenGrant, identity: &IdentityProvider) -> OAuth2Scheme {
    let (flow, token_name) = match grant {
        TokenGrant::ClientCredentials => (OAuth2Flow::ClientCredentials, CLIENT_TOKEN_NAME),
        TokenGrant::AuthorizationCode { .. } => (
            OAuth2Flow::AuthorizationCode {
                auth_url: reference(OAUTH2_AUTH_URL_VAR),
                redirect_uri: reference(OAUTH2_REDIRECT_URI_VAR),
            },
            USER_TOKEN_NAME,
        ),
    };
    OAuth2Scheme {
        flow,
        token_name: token_name.to_string(),
        challenge_algorithm: CHALLENGE_ALGORITHM.to_string(),
        access_token_url: reference(OAUTH2_ACCESS_TOKEN_URL_VAR),
        client_id: reference(OAUTH2_CLIENT_ID_VAR),
        client_secret: reference(OAUTH2_CLIENT_SECRET_VAR),
        add_token_to: TOKEN_PLACEMENT.to_string(),
        client_authentication: CLIENT_AUTHENTICATION.to_string(),
        audience: identity.audience.clone(),
    }
}

/// The variables an OAuth2 scheme for `grant` refers to, with their literal values.
pub fn oauth2_variables(
    grant: &TokenGrant,
    client_id: &str,
    client_secret: &str,
    identity: &IdentityProvider,
) -> Vec<Variable> {
    let mut variables = vec![
        Variable::new(OAUTH2_CLIENT_ID_VAR, client_id),
        Variable::new(OAUTH2_CLIENT_SECRET_VAR, client_secret),
        Variable::new(OAUTH2_ACCESS_TOKEN_URL_VAR, &identity.token_url),
    ];
    if let TokenGrant::AuthorizationCode { callback_url } = grant {
        variables.push(Variable::new(OAUTH2_AUTH_URL_VAR, &identity.authorize_url));
        variables.push(Variable::new(OAUTH2_REDIRECT_URI_VAR, callback_url));
    }
    variables
}

/// Build the auth setup for the caller's options. `None` means no auth at all.
pub fn synthesize_auth(auth: &AuthOptions, identity: &IdentityProvider) -> Option<AuthSetup> {
    match auth {
        AuthOptions::None => None,
        AuthOptions::ClientId { client_id } => Some(AuthSetup {
            scheme: AuthScheme::StaticIdentifier(StaticIdentifier {
                header: CLIENT_ID_HEADER.to_string(),
                value: reference(CLIENT_ID_VAR),
            }),
            variables: vec![Variable::new(CLIENT_ID_VAR, client_id)],
            placement: AuthPlacement::Collection,
        }),
        AuthOptions::Token {
            grant,
            client_id,
            client_secret,
            auth_per_request,
        } => Some(AuthSetup {
            scheme: AuthScheme::OAuth2(oauth2_scheme(grant, identity)),
            variables: oauth2_variables(grant, client_id, client_secret, identity),
            placement: if *auth_per_request {
                AuthPlacement::PerRequest
            } else {
                AuthPlacement::Collection
            },
        }),
    }
}

/// Install `setup` on the collection and give every request a defined `auth`.
///
/// Without a setup the root carries no auth and every request inherits.
pub fn apply_auth(mut collection: Collection, setup: Option<&AuthSetup>) -> Collection {
    let Some(setup) = setup else {
        collection.auth = None;
        collection.item = map_requests(collection.item, &mut |mut item: RequestItem| {
            item.request.auth = None;
            item
        });
        return collection;
    };

    match setup.placement {
        AuthPlacement::Collection => {
            collection.auth = Some(setup.scheme.clone());
            collection.item = map_requests(collection.item, &mut |mut item: RequestItem| {
                item.request.auth = None;
                item
            });
        }
        AuthPlacement::PerRequest => {
            collection.auth = None;
            collection.item = map_requests(collection.item, &mut |mut item: RequestItem| {
                item.request.auth = Some(setup.scheme.clone());
                item
            });
        }
    }

    for variable in &setup.variables {
        collection.set_variable(&variable.key, variable.value.clone());
    }
    collection
}
