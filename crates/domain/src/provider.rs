//! Identity provider identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A supported third-party identity provider.
///
/// Each provider owns a unique platform request code. Sessions use it to
/// recognize the callback events addressed to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Facebook Login
    Facebook,
    /// Google Sign-In
    Google,
    /// Kakao Login
    Kakao,
    /// LINE Login
    Line,
    /// Naver Login
    Naver,
    /// Twitter (X) OAuth 2.0
    Twitter,
    /// GitHub OAuth Apps
    Github,
    /// Sign In with LinkedIn
    Linkedin,
    /// WordPress.com OAuth
    Wordpress,
    /// Yahoo OpenID Connect
    Yahoo,
    /// VK ID
    Vk,
    /// Disqus API
    Disqus,
    /// Foursquare
    Foursquare,
    /// Twitch
    Twitch,
    /// Microsoft identity platform
    #[serde(alias = "windows")]
    Microsoft,
}

impl ProviderType {
    /// Every supported provider, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Facebook,
        Self::Google,
        Self::Kakao,
        Self::Line,
        Self::Naver,
        Self::Twitter,
        Self::Github,
        Self::Linkedin,
        Self::Wordpress,
        Self::Yahoo,
        Self::Vk,
        Self::Disqus,
        Self::Foursquare,
        Self::Twitch,
        Self::Microsoft,
    ];

    /// Stable lowercase identifier, used in configuration files and URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Line => "line",
            Self::Naver => "naver",
            Self::Twitter => "twitter",
            Self::Github => "github",
            Self::Linkedin => "linkedin",
            Self::Wordpress => "wordpress",
            Self::Yahoo => "yahoo",
            Self::Vk => "vk",
            Self::Disqus => "disqus",
            Self::Foursquare => "foursquare",
            Self::Twitch => "twitch",
            Self::Microsoft => "microsoft",
        }
    }

    /// Human-readable provider name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::Kakao => "Kakao",
            Self::Line => "LINE",
            Self::Naver => "Naver",
            Self::Twitter => "Twitter",
            Self::Github => "GitHub",
            Self::Linkedin => "LinkedIn",
            Self::Wordpress => "WordPress",
            Self::Yahoo => "Yahoo",
            Self::Vk => "VK",
            Self::Disqus => "Disqus",
            Self::Foursquare => "Foursquare",
            Self::Twitch => "Twitch",
            Self::Microsoft => "Microsoft",
        }
    }

    /// Platform request code that tags callback events for this provider.
    #[must_use]
    pub const fn request_code(self) -> i32 {
        match self {
            // Facebook's SDK reserves 0xface for its login activity.
            Self::Facebook => 64206,
            Self::Google => 9001,
            Self::Kakao => 9002,
            Self::Line => 9003,
            Self::Naver => 9004,
            Self::Twitter => 140,
            Self::Github => 9005,
            Self::Linkedin => 9006,
            Self::Wordpress => 9007,
            Self::Yahoo => 9008,
            Self::Vk => 10485,
            Self::Disqus => 9009,
            Self::Foursquare => 9010,
            Self::Twitch => 9011,
            Self::Microsoft => 9012,
        }
    }

    /// Looks up the provider owning a request code.
    #[must_use]
    pub fn from_request_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.request_code() == code)
    }

    /// Returns true if the provider needs a one-time, process-wide SDK
    /// bootstrap before any session can be created.
    #[must_use]
    pub const fn requires_sdk_bootstrap(self) -> bool {
        matches!(
            self,
            Self::Kakao | Self::Twitter | Self::Facebook | Self::Vk
        )
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "windows" {
            return Ok(Self::Microsoft);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownProvider(s.to_string()))
    }
}
