//! Endpoints and response shapes of every supported provider.

use serde_json::Value;
use unilogin_application::TokenAuthMethod;
use unilogin_domain::{ProviderType, UserProfile};

use super::mapping::lookup;

/// How the access token is presented to the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// A query parameter with the given name.
    Query(&'static str),
}

/// Where the identity fields live in a profile response.
///
/// Each field lists dotted JSON paths in preference order; numeric
/// segments index into arrays (`data.0.id`).
#[derive(Debug, Clone, Copy)]
pub struct ProfileMapping {
    /// User id paths. The id is required.
    pub user_id: &'static [&'static str],
    /// Display name paths.
    pub display_name: &'static [&'static str],
    /// Given name paths.
    pub first_name: &'static [&'static str],
    /// Email paths.
    pub email: &'static [&'static str],
    /// Avatar URL paths.
    pub avatar_url: &'static [&'static str],
}

/// Static description of one provider's OAuth flow.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    /// Provider described.
    pub provider: ProviderType,
    /// Authorization endpoint.
    pub authorization_endpoint: &'static str,
    /// Token endpoint.
    pub token_endpoint: &'static str,
    /// Profile endpoint.
    pub profile_endpoint: &'static str,
    /// Scopes requested unless disabled by the config.
    pub default_scopes: &'static [&'static str],
    /// Scope added when the config requires an email address.
    pub email_scope: Option<&'static str>,
    /// Separator between scopes.
    pub scope_joiner: &'static str,
    /// Client authentication at the token endpoint.
    pub auth_method: TokenAuthMethod,
    /// Whether a PKCE S256 challenge is sent.
    pub pkce: bool,
    /// How the profile endpoint receives the token.
    pub token_placement: TokenPlacement,
    /// Fixed query parameters of the profile request.
    pub profile_params: &'static [(&'static str, &'static str)],
    /// Header carrying the client id on profile requests.
    pub client_id_header: Option<&'static str>,
    /// Query parameter carrying the client id on profile requests.
    pub client_id_param: Option<&'static str>,
    /// Profile field locations.
    pub mapping: ProfileMapping,
    /// Token-response field holding the email address.
    pub token_email_field: Option<&'static str>,
    /// Provider-specific fix-ups after mapping.
    pub adjust: Option<fn(&Value, &mut UserProfile)>,
}

const NONE: &[&str] = &[];

static FACEBOOK: ProviderSpec = ProviderSpec {
    provider: ProviderType::Facebook,
    authorization_endpoint: "https://www.facebook.com/v19.0/dialog/oauth",
    token_endpoint: "https://graph.facebook.com/v19.0/oauth/access_token",
    profile_endpoint: "https://graph.facebook.com/v19.0/me",
    default_scopes: &["public_profile"],
    email_scope: Some("email"),
    scope_joiner: ",",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[("fields", "id,name,first_name,email,picture.type(large)")],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["id"],
        display_name: &["name"],
        first_name: &["first_name"],
        email: &["email"],
        avatar_url: &["picture.data.url"],
    },
    token_email_field: None,
    adjust: None,
};

static GOOGLE: ProviderSpec = ProviderSpec {
    provider: ProviderType::Google,
    authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth",
    token_endpoint: "https://oauth2.googleapis.com/token",
    profile_endpoint: "https://openidconnect.googleapis.com/v1/userinfo",
    default_scopes: &["openid", "profile"],
    email_scope: Some("email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: true,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["sub"],
        display_name: &["name"],
        first_name: &["given_name"],
        email: &["email"],
        avatar_url: &["picture"],
    },
    token_email_field: None,
    adjust: None,
};

static KAKAO: ProviderSpec = ProviderSpec {
    provider: ProviderType::Kakao,
    authorization_endpoint: "https://kauth.kakao.com/oauth/authorize",
    token_endpoint: "https://kauth.kakao.com/oauth/token",
    profile_endpoint: "https://kapi.kakao.com/v2/user/me",
    default_scopes: &["profile_nickname", "profile_image"],
    email_scope: Some("account_email"),
    scope_joiner: ",",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["id"],
        display_name: &["kakao_account.profile.nickname", "properties.nickname"],
        first_name: NONE,
        email: &["kakao_account.email"],
        avatar_url: &[
            "kakao_account.profile.profile_image_url",
            "properties.profile_image",
        ],
    },
    token_email_field: None,
    adjust: None,
};

static LINE: ProviderSpec = ProviderSpec {
    provider: ProviderType::Line,
    authorization_endpoint: "https://access.line.me/oauth2/v2.1/authorize",
    token_endpoint: "https://api.line.me/oauth2/v2.1/token",
    profile_endpoint: "https://api.line.me/v2/profile",
    default_scopes: &["profile", "openid"],
    email_scope: Some("email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: true,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["userId"],
        display_name: &["displayName"],
        first_name: NONE,
        email: &["email"],
        avatar_url: &["pictureUrl"],
    },
    token_email_field: None,
    adjust: None,
};

static NAVER: ProviderSpec = ProviderSpec {
    provider: ProviderType::Naver,
    authorization_endpoint: "https://nid.naver.com/oauth2.0/authorize",
    token_endpoint: "https://nid.naver.com/oauth2.0/token",
    profile_endpoint: "https://openapi.naver.com/v1/nid/me",
    default_scopes: NONE,
    email_scope: None,
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["response.id"],
        display_name: &["response.name", "response.nickname"],
        first_name: NONE,
        email: &["response.email"],
        avatar_url: &["response.profile_image"],
    },
    token_email_field: None,
    adjust: None,
};

static TWITTER: ProviderSpec = ProviderSpec {
    provider: ProviderType::Twitter,
    authorization_endpoint: "https://twitter.com/i/oauth2/authorize",
    token_endpoint: "https://api.twitter.com/2/oauth2/token",
    profile_endpoint: "https://api.twitter.com/2/users/me",
    default_scopes: &["users.read", "tweet.read"],
    email_scope: None,
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretBasic,
    pkce: true,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[("user.fields", "profile_image_url")],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["data.id"],
        display_name: &["data.name", "data.username"],
        first_name: NONE,
        email: NONE,
        avatar_url: &["data.profile_image_url"],
    },
    token_email_field: None,
    adjust: None,
};

static GITHUB: ProviderSpec = ProviderSpec {
    provider: ProviderType::Github,
    authorization_endpoint: "https://github.com/login/oauth/authorize",
    token_endpoint: "https://github.com/login/oauth/access_token",
    profile_endpoint: "https://api.github.com/user",
    default_scopes: &["read:user"],
    email_scope: Some("user:email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["id"],
        display_name: &["name", "login"],
        first_name: NONE,
        email: &["email"],
        avatar_url: &["avatar_url"],
    },
    token_email_field: None,
    adjust: None,
};

static LINKEDIN: ProviderSpec = ProviderSpec {
    provider: ProviderType::Linkedin,
    authorization_endpoint: "https://www.linkedin.com/oauth/v2/authorization",
    token_endpoint: "https://www.linkedin.com/oauth/v2/accessToken",
    profile_endpoint: "https://api.linkedin.com/v2/userinfo",
    default_scopes: &["openid", "profile"],
    email_scope: Some("email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["sub"],
        display_name: &["name"],
        first_name: &["given_name"],
        email: &["email"],
        avatar_url: &["picture"],
    },
    token_email_field: None,
    adjust: None,
};

static WORDPRESS: ProviderSpec = ProviderSpec {
    provider: ProviderType::Wordpress,
    authorization_endpoint: "https://public-api.wordpress.com/oauth2/authorize",
    token_endpoint: "https://public-api.wordpress.com/oauth2/token",
    profile_endpoint: "https://public-api.wordpress.com/rest/v1.1/me",
    default_scopes: &["auth"],
    email_scope: None,
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["ID"],
        display_name: &["display_name", "username"],
        first_name: NONE,
        email: &["email"],
        avatar_url: &["avatar_URL"],
    },
    token_email_field: None,
    adjust: None,
};

static YAHOO: ProviderSpec = ProviderSpec {
    provider: ProviderType::Yahoo,
    authorization_endpoint: "https://api.login.yahoo.com/oauth2/request_auth",
    token_endpoint: "https://api.login.yahoo.com/oauth2/get_token",
    profile_endpoint: "https://api.login.yahoo.com/openid/v1/userinfo",
    default_scopes: &["openid", "profile"],
    email_scope: Some("email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretBasic,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["sub"],
        display_name: &["name", "nickname"],
        first_name: &["given_name"],
        email: &["email"],
        avatar_url: &["picture"],
    },
    token_email_field: None,
    adjust: None,
};

static VK: ProviderSpec = ProviderSpec {
    provider: ProviderType::Vk,
    authorization_endpoint: "https://oauth.vk.com/authorize",
    token_endpoint: "https://oauth.vk.com/access_token",
    profile_endpoint: "https://api.vk.com/method/users.get",
    default_scopes: NONE,
    email_scope: Some("email"),
    scope_joiner: ",",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Query("access_token"),
    profile_params: &[("fields", "photo_200"), ("v", "5.131")],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["response.0.id"],
        display_name: NONE,
        first_name: &["response.0.first_name"],
        email: NONE,
        avatar_url: &["response.0.photo_200"],
    },
    token_email_field: Some("email"),
    adjust: Some(vk_full_name),
};

static DISQUS: ProviderSpec = ProviderSpec {
    provider: ProviderType::Disqus,
    authorization_endpoint: "https://disqus.com/api/oauth/2.0/authorize/",
    token_endpoint: "https://disqus.com/api/oauth/2.0/access_token/",
    profile_endpoint: "https://disqus.com/api/3.0/users/details.json",
    default_scopes: &["read"],
    email_scope: Some("email"),
    scope_joiner: ",",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Query("access_token"),
    profile_params: &[],
    client_id_header: None,
    client_id_param: Some("api_key"),
    mapping: ProfileMapping {
        user_id: &["response.id"],
        display_name: &["response.name", "response.username"],
        first_name: NONE,
        email: &["response.email"],
        avatar_url: &["response.avatar.permalink"],
    },
    token_email_field: None,
    adjust: None,
};

static FOURSQUARE: ProviderSpec = ProviderSpec {
    provider: ProviderType::Foursquare,
    authorization_endpoint: "https://foursquare.com/oauth2/authenticate",
    token_endpoint: "https://foursquare.com/oauth2/access_token",
    profile_endpoint: "https://api.foursquare.com/v2/users/self",
    default_scopes: NONE,
    email_scope: None,
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Query("oauth_token"),
    profile_params: &[("v", "20180401")],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["response.user.id"],
        display_name: NONE,
        first_name: &["response.user.firstName"],
        email: &["response.user.contact.email"],
        avatar_url: NONE,
    },
    token_email_field: None,
    adjust: Some(foursquare_name_and_photo),
};

static TWITCH: ProviderSpec = ProviderSpec {
    provider: ProviderType::Twitch,
    authorization_endpoint: "https://id.twitch.tv/oauth2/authorize",
    token_endpoint: "https://id.twitch.tv/oauth2/token",
    profile_endpoint: "https://api.twitch.tv/helix/users",
    default_scopes: NONE,
    email_scope: Some("user:read:email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: false,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: Some("Client-Id"),
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["data.0.id"],
        display_name: &["data.0.display_name", "data.0.login"],
        first_name: NONE,
        email: &["data.0.email"],
        avatar_url: &["data.0.profile_image_url"],
    },
    token_email_field: None,
    adjust: None,
};

static MICROSOFT: ProviderSpec = ProviderSpec {
    provider: ProviderType::Microsoft,
    authorization_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
    token_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
    profile_endpoint: "https://graph.microsoft.com/v1.0/me",
    default_scopes: &["openid", "User.Read"],
    email_scope: Some("email"),
    scope_joiner: " ",
    auth_method: TokenAuthMethod::ClientSecretPost,
    pkce: true,
    token_placement: TokenPlacement::Bearer,
    profile_params: &[],
    client_id_header: None,
    client_id_param: None,
    mapping: ProfileMapping {
        user_id: &["id"],
        display_name: &["displayName"],
        first_name: &["givenName"],
        email: &["mail", "userPrincipalName"],
        avatar_url: NONE,
    },
    token_email_field: None,
    adjust: None,
};

/// The catalog entry of a provider.
#[must_use]
pub fn spec(provider: ProviderType) -> &'static ProviderSpec {
    match provider {
        ProviderType::Facebook => &FACEBOOK,
        ProviderType::Google => &GOOGLE,
        ProviderType::Kakao => &KAKAO,
        ProviderType::Line => &LINE,
        ProviderType::Naver => &NAVER,
        ProviderType::Twitter => &TWITTER,
        ProviderType::Github => &GITHUB,
        ProviderType::Linkedin => &LINKEDIN,
        ProviderType::Wordpress => &WORDPRESS,
        ProviderType::Yahoo => &YAHOO,
        ProviderType::Vk => &VK,
        ProviderType::Disqus => &DISQUS,
        ProviderType::Foursquare => &FOURSQUARE,
        ProviderType::Twitch => &TWITCH,
        ProviderType::Microsoft => &MICROSOFT,
    }
}

fn join_names(first: Option<String>, last: Option<String>) -> Option<String> {
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (first, last) => first.or(last),
    }
}

fn vk_full_name(profile_json: &Value, profile: &mut UserProfile) {
    let last = lookup(profile_json, "response.0.last_name");
    profile.display_name = join_names(profile.first_name.clone(), last);
}

fn foursquare_name_and_photo(profile_json: &Value, profile: &mut UserProfile) {
    let last = lookup(profile_json, "response.user.lastName");
    profile.display_name = join_names(profile.first_name.clone(), last);

    let prefix = lookup(profile_json, "response.user.photo.prefix");
    let suffix = lookup(profile_json, "response.user.photo.suffix");
    if let (Some(prefix), Some(suffix)) = (prefix, suffix) {
        profile.avatar_url = Some(format!("{prefix}original{suffix}"));
    }
}
