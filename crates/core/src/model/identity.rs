use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg";
const FALLBACK_NAME: &str = "User";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("user id cannot be empty")]
    EmptyId,

    #[error("invalid avatar URL: {0}")]
    InvalidAvatarUrl(#[from] url::ParseError),
}

/// Normalized signed-in user, independent of the identity provider's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    id: String,
    email: String,
    display_name: String,
    avatar_url: Url,
}

impl UserIdentity {
    /// Builds an identity from raw provider fields.
    ///
    /// Missing display names fall back to the email local part, then `"User"`.
    /// Missing avatars fall back to a generated avatar seeded by the email.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the id is blank or the avatar URL does not parse.
    pub fn normalize(
        id: impl Into<String>,
        email: Option<&str>,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Self, IdentityError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityError::EmptyId);
        }
        let email = email.map(str::trim).unwrap_or_default().to_string();

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| email.split('@').next().filter(|local| !local.is_empty()))
            .unwrap_or(FALLBACK_NAME)
            .to_string();

        let avatar_url = match photo_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(raw) => Url::parse(raw)?,
            None => default_avatar_url(&email)?,
        };

        Ok(Self {
            id,
            email,
            display_name,
            avatar_url,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn avatar_url(&self) -> &Url {
        &self.avatar_url
    }
}

/// Generated avatar for users without a profile photo.
///
/// # Errors
///
/// Returns `url::ParseError` only if the base URL constant is malformed.
pub fn default_avatar_url(email: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(AVATAR_BASE, &[("seed", email)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let user = UserIdentity::normalize("u1", Some("ada@example.com"), None, None).unwrap();
        assert_eq!(user.display_name(), "ada");
        assert_eq!(user.email(), "ada@example.com");
    }

    #[test]
    fn display_name_falls_back_to_user_without_email() {
        let user = UserIdentity::normalize("u1", None, Some("  "), None).unwrap();
        assert_eq!(user.display_name(), "User");
        assert_eq!(user.email(), "");
    }

    #[test]
    fn avatar_defaults_to_generated_seed() {
        let user = UserIdentity::normalize("u1", Some("ada@example.com"), Some("Ada"), None)
            .unwrap();
        assert_eq!(user.avatar_url().host_str(), Some("api.dicebear.com"));
        let seed = user
            .avatar_url()
            .query_pairs()
            .find(|(key, _)| key == "seed")
            .map(|(_, value)| value.into_owned());
        assert_eq!(seed.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn explicit_photo_is_kept() {
        let user = UserIdentity::normalize(
            "u1",
            Some("ada@example.com"),
            None,
            Some("https://img.example.com/ada.png"),
        )
        .unwrap();
        assert_eq!(
            user.avatar_url().as_str(),
            "https://img.example.com/ada.png"
        );
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = UserIdentity::normalize(" ", None, None, None).unwrap_err();
        assert_eq!(err, IdentityError::EmptyId);
    }
}
