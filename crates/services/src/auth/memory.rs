use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AuthError, IdentityProvider, ProviderUser};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user: ProviderUser,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    // Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    signed_in: Option<String>,
    next_uid: u64,
}

/// Identity provider kept entirely in memory, with provider-style error codes.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    inner: Mutex<Inner>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uid of the account with an open session, if any.
    #[must_use]
    pub fn signed_in_uid(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.signed_in.clone())
    }

    fn with_inner<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, AuthError>,
    ) -> Result<T, AuthError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| AuthError::provider(e.to_string()))?;
        f(&mut guard)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError> {
        self.with_inner(|inner| {
            if !email.contains('@') {
                return Err(AuthError::provider("auth/invalid-email"));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::provider(
                    "auth/weak-password: Password should be at least 6 characters",
                ));
            }
            let key = email.to_lowercase();
            if inner.accounts.contains_key(&key) {
                return Err(AuthError::provider("auth/email-already-in-use"));
            }

            inner.next_uid += 1;
            let user = ProviderUser {
                uid: format!("user-{}", inner.next_uid),
                email: Some(email.to_string()),
                display_name: None,
                photo_url: None,
            };
            inner.accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                },
            );
            inner.signed_in = Some(user.uid.clone());
            Ok(user)
        })
    }

    async fn update_display_name(
        &self,
        uid: &str,
        display_name: &str,
    ) -> Result<ProviderUser, AuthError> {
        self.with_inner(|inner| {
            let account = inner
                .accounts
                .values_mut()
                .find(|account| account.user.uid == uid)
                .ok_or_else(|| AuthError::provider("auth/user-not-found"))?;
            account.user.display_name = Some(display_name.to_string());
            Ok(account.user.clone())
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError> {
        self.with_inner(|inner| {
            let account = inner
                .accounts
                .get(&email.to_lowercase())
                .ok_or_else(|| AuthError::provider("auth/user-not-found"))?;
            if account.password != password {
                return Err(AuthError::provider("auth/wrong-password"));
            }
            let user = account.user.clone();
            inner.signed_in = Some(user.uid.clone());
            Ok(user)
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.with_inner(|inner| {
            inner.signed_in = None;
            Ok(())
        })
    }
}
