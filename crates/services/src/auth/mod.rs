//! Sign-up, sign-in and session observation over an external identity provider.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use study_core::model::UserIdentity;
use tokio::sync::watch;
use tracing::{info, warn};

pub use crate::error::AuthError;
pub use memory::InMemoryIdentityProvider;

/// Account record as the identity provider returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProviderUser {
    /// Normalize into the identity the rest of the app sees.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Identity` if the record is unusable.
    pub fn to_identity(&self) -> Result<UserIdentity, AuthError> {
        Ok(UserIdentity::normalize(
            self.uid.clone(),
            self.email.as_deref(),
            self.display_name.as_deref(),
            self.photo_url.as_deref(),
        )?)
    }
}

/// Operations the app needs from an identity provider.
///
/// Failures are reported as `AuthError::Provider` carrying the provider's message.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError>;

    async fn update_display_name(
        &self,
        uid: &str,
        display_name: &str,
    ) -> Result<ProviderUser, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Tracks the signed-in user and broadcasts every change.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    current: Arc<watch::Sender<Option<UserIdentity>>>,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            provider,
            current: Arc::new(current),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.current.borrow().clone()
    }

    /// Receiver that observes the current identity and every later change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.current.subscribe()
    }

    /// Create an account, set its display name, and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for blank credentials or any provider failure.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserIdentity, AuthError> {
        let email = validate_credentials(email, password)?;
        let created = self
            .provider
            .create_user(email, password)
            .await
            .inspect_err(|err| warn!(error = %err, "sign-up failed"))?;

        let name = display_name.trim();
        let user = if name.is_empty() {
            created
        } else {
            self.provider
                .update_display_name(&created.uid, name)
                .await
                .inspect_err(|err| warn!(error = %err, "display name update failed"))?
        };

        let identity = user.to_identity()?;
        info!(user_id = identity.id(), "signed up");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// # Errors
    ///
    /// Returns `AuthError` for blank credentials or any provider failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let email = validate_credentials(email, password)?;
        let user = self
            .provider
            .sign_in(email, password)
            .await
            .inspect_err(|err| warn!(error = %err, "sign-in failed"))?;

        let identity = user.to_identity()?;
        info!(user_id = identity.id(), "signed in");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the provider refuses to end the session.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider
            .sign_out()
            .await
            .inspect_err(|err| warn!(error = %err, "sign-out failed"))?;
        if self.current.send_replace(None).is_some() {
            info!("signed out");
        }
        Ok(())
    }
}

fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::MissingEmail);
    }
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryIdentityProvider::new()))
    }

    #[tokio::test]
    async fn sign_up_signs_in_and_publishes_identity() {
        let auth = service();
        let mut rx = auth.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let user = auth
            .sign_up("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        assert_eq!(user.display_name(), "Ada");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&user));
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn blank_display_name_falls_back_to_email() {
        let auth = service();
        let user = auth
            .sign_up("grace@example.com", "secret1", "  ")
            .await
            .unwrap();
        assert_eq!(user.display_name(), "grace");
    }

    #[tokio::test]
    async fn provider_message_is_surfaced_verbatim() {
        let auth = service();
        auth.sign_up("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        auth.sign_out().await.unwrap();

        let err = auth
            .sign_in("ada@example.com", "wrong-pass")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "auth/wrong-password");
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_provider() {
        let auth = service();
        assert_eq!(
            auth.sign_in(" ", "x").await.unwrap_err(),
            AuthError::MissingEmail
        );
        assert_eq!(
            auth.sign_in("a@b.c", "").await.unwrap_err(),
            AuthError::MissingPassword
        );
    }

    #[tokio::test]
    async fn sign_out_clears_identity() {
        let auth = service();
        auth.sign_up("ada@example.com", "secret1", "")
            .await
            .unwrap();
        let mut rx = auth.subscribe();
        auth.sign_out().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
        assert!(auth.current_user().is_none());
    }
}
