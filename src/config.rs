// Settings module: loads `appsettings.json` and checks that every key the
// sample needs is present. Nothing here talks to the network, so a bad
// config stops the run before any token or Graph request is made.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory by [`AppSettings::load`].
pub const SETTINGS_FILE: &str = "appsettings.json";

/// Validated application settings. All fields are required and non-empty.
#[derive(Clone)]
pub struct AppSettings {
    pub application_id: String,
    pub application_secret: String,
    pub redirect_uri: String,
    pub tenant_id: String,
    pub domain: String,
}

/// Errors raised while reading or validating the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required setting: {0}")]
    MissingField(&'static str),
}

/// Raw file shape. Every key is optional here so that a missing key and an
/// empty string are reported the same way.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    application_id: Option<String>,
    application_secret: Option<String>,
    redirect_uri: Option<String>,
    tenant_id: Option<String>,
    domain: Option<String>,
}

impl AppSettings {
    /// Load `appsettings.json` from the current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(SETTINGS_FILE)
    }

    /// Load and validate settings from an explicit path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate settings from a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(content)?;
        Ok(AppSettings {
            application_id: required(raw.application_id, "applicationId")?,
            application_secret: required(raw.application_secret, "applicationSecret")?,
            redirect_uri: required(raw.redirect_uri, "redirectUri")?,
            tenant_id: required(raw.tenant_id, "tenantId")?,
            domain: required(raw.domain, "domain")?,
        })
    }

    /// Identity authority for the configured tenant.
    pub fn authority(&self) -> String {
        format!("https://login.microsoftonline.com/{}/v2.0", self.tenant_id)
    }

    /// OAuth2 token endpoint for the configured tenant.
    pub fn token_endpoint(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant_id
        )
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(key)),
    }
}

// The secret must never end up in logs.
impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("application_id", &self.application_id)
            .field("application_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("tenant_id", &self.tenant_id)
            .field("domain", &self.domain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "applicationId": "app-id",
        "applicationSecret": "s3cret",
        "redirectUri": "https://localhost:8080",
        "tenantId": "contoso-tenant",
        "domain": "contoso.onmicrosoft.com"
    }"#;

    #[test]
    fn loads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.application_id, "app-id");
        assert_eq!(settings.domain, "contoso.onmicrosoft.com");
        assert_eq!(
            settings.authority(),
            "https://login.microsoftonline.com/contoso-tenant/v2.0"
        );
        assert_eq!(
            settings.token_endpoint(),
            "https://login.microsoftonline.com/contoso-tenant/oauth2/v2.0/token"
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppSettings::load_from(dir.path().join(SETTINGS_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn each_required_key_is_checked() {
        for key in [
            "applicationId",
            "applicationSecret",
            "redirectUri",
            "tenantId",
            "domain",
        ] {
            let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
            value.as_object_mut().unwrap().remove(key);
            let err = AppSettings::from_json(&value.to_string()).unwrap_err();
            match err {
                ConfigError::MissingField(k) => assert_eq!(k, key),
                other => panic!("unexpected error for {key}: {other}"),
            }
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let json = VALID.replace("\"s3cret\"", "\"\"");
        let err = AppSettings::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("applicationSecret")));
    }

    #[test]
    fn whitespace_value_is_accepted() {
        let json = VALID.replace("\"contoso.onmicrosoft.com\"", "\" \"");
        let settings = AppSettings::from_json(&json).unwrap();
        assert_eq!(settings.domain, " ");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = AppSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn debug_hides_secret() {
        let settings = AppSettings::from_json(VALID).unwrap();
        let printed = format!("{settings:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("<redacted>"));
    }
}
