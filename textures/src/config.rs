use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("API and admin listeners cannot share {0}")]
    ListenerConflict(String),

    #[error("api_key cannot be empty")]
    EmptyApiKey,

    #[error("Collection name cannot be empty")]
    EmptyCollection,

    #[error("legacy_host must be an http(s) base URL, got {0}")]
    InvalidLegacyHost(String),
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum StoreConfig {
    Memory,
    Filesystem {
        base_dir: PathBuf,
        #[serde(default = "default_collection")]
        collection: String,
    },
}

fn default_collection() -> String {
    "skins".into()
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3001,
    }
}

fn default_legacy_host() -> Url {
    Url::parse("http://skins.minecraft.net").expect("static URL is valid")
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    pub store: StoreConfig,
    /// Upstream image host for skins and capes without a record.
    #[serde(default = "default_legacy_host")]
    pub legacy_host: Url,
    /// Shared secret expected in the `X-Ely-key` header of writes.
    pub api_key: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(self.listener.addr()));
        }

        if self.api_key.is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }

        if let StoreConfig::Filesystem { collection, .. } = &self.store
            && collection.is_empty()
        {
            return Err(ValidationError::EmptyCollection);
        }

        let scheme_ok = matches!(self.legacy_host.scheme(), "http" | "https");
        if !scheme_ok || self.legacy_host.cannot_be_a_base() {
            return Err(ValidationError::InvalidLegacyHost(
                self.legacy_host.to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).expect("parse config")
    }

    #[test]
    fn test_defaults() {
        let config = parse(
            r#"
            store:
                type: memory
            api_key: secret
            "#,
        );

        assert_eq!(config.listener, Listener::default());
        assert_eq!(config.admin_listener.port, 3001);
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.legacy_host.as_str(), "http://skins.minecraft.net/");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_filesystem_store() {
        let config = parse(
            r#"
            listener:
                host: 0.0.0.0
                port: 80
            store:
                type: filesystem
                base_dir: /var/lib/skinsystem
            legacy_host: https://legacy.example.com/textures/
            api_key: secret
            "#,
        );

        assert_eq!(
            config.store,
            StoreConfig::Filesystem {
                base_dir: "/var/lib/skinsystem".into(),
                collection: "skins".into(),
            }
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        let mut config = parse(
            r#"
            store:
                type: filesystem
                base_dir: /tmp
                collection: ""
            api_key: ""
            "#,
        );
        assert_eq!(config.validate(), Err(ValidationError::EmptyApiKey));

        config.api_key = "secret".into();
        assert_eq!(config.validate(), Err(ValidationError::EmptyCollection));

        config.store = StoreConfig::Memory;
        config.legacy_host = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLegacyHost(_))
        ));

        config.legacy_host = default_legacy_host();
        config.admin_listener = config.listener.clone();
        assert_eq!(
            config.validate(),
            Err(ValidationError::ListenerConflict("127.0.0.1:3000".into()))
        );

        config.admin_listener.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }
}
