use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Non-secret identity/storage provider keys kept in client-local storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messaging_sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
}

/// Raw form of `ProviderConfig`, as typed by the user or read from disk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfigDraft {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderConfigError {
    #[error("storage bucket must be a bare bucket name")]
    InvalidStorageBucket,
}

impl ProviderConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `ProviderConfigError::InvalidStorageBucket` if the bucket contains a
    /// scheme, a path separator, or whitespace.
    pub fn validate(self) -> Result<ProviderConfig, ProviderConfigError> {
        let storage_bucket = normalize_optional(self.storage_bucket);
        let invalid = |bucket: &str| bucket.contains('/') || bucket.contains(char::is_whitespace);
        if storage_bucket.as_deref().is_some_and(invalid) {
            return Err(ProviderConfigError::InvalidStorageBucket);
        }

        Ok(ProviderConfig {
            api_key: normalize_optional(self.api_key),
            auth_domain: normalize_optional(self.auth_domain),
            project_id: normalize_optional(self.project_id),
            storage_bucket,
            messaging_sender_id: normalize_optional(self.messaging_sender_id),
            app_id: normalize_optional(self.app_id),
        })
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn auth_domain(&self) -> Option<&str> {
        self.auth_domain.as_deref()
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    #[must_use]
    pub fn storage_bucket(&self) -> Option<&str> {
        self.storage_bucket.as_deref()
    }

    #[must_use]
    pub fn messaging_sender_id(&self) -> Option<&str> {
        self.messaging_sender_id.as_deref()
    }

    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// True once the keys needed to reach the identity provider are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.project_id.is_some()
    }

    /// Back to an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> ProviderConfigDraft {
        ProviderConfigDraft {
            api_key: self.api_key.clone(),
            auth_domain: self.auth_domain.clone(),
            project_id: self.project_id.clone(),
            storage_bucket: self.storage_bucket.clone(),
            messaging_sender_id: self.messaging_sender_id.clone(),
            app_id: self.app_id.clone(),
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_become_absent() {
        let config = ProviderConfigDraft {
            api_key: Some("  key ".into()),
            project_id: Some("   ".into()),
            ..ProviderConfigDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.api_key(), Some("key"));
        assert_eq!(config.project_id(), None);
        assert!(!config.is_configured());
    }

    #[test]
    fn bucket_with_scheme_is_rejected() {
        let err = ProviderConfigDraft {
            storage_bucket: Some("gs://bucket".into()),
            ..ProviderConfigDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ProviderConfigError::InvalidStorageBucket);
    }

    #[test]
    fn serializes_as_flat_camel_case_object() {
        let config = ProviderConfigDraft {
            api_key: Some("k".into()),
            storage_bucket: Some("demo.appspot.com".into()),
            ..ProviderConfigDraft::default()
        }
        .validate()
        .unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "apiKey": "k", "storageBucket": "demo.appspot.com" })
        );
    }

    #[test]
    fn draft_tolerates_missing_keys() {
        let draft: ProviderConfigDraft =
            serde_json::from_str(r#"{ "projectId": "demo" }"#).unwrap();
        assert_eq!(draft.project_id.as_deref(), Some("demo"));
        assert!(draft.api_key.is_none());
    }
}
