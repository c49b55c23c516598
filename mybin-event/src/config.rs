use crate::error::Result;
use serde_derive::{Deserialize, Serialize};

/// options of event parser
///
/// can be loaded from a toml table like:
///
/// ```toml
/// checksum = true
/// validate_checksum = true
/// server_version = "8.0.23-log"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// whether events carry a 4-byte crc32 footer
    pub checksum: bool,
    /// verify the footer if present
    pub validate_checksum: bool,
    /// negotiated server version, e.g. "5.7.30-log"
    pub server_version: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            checksum: false,
            validate_checksum: true,
            server_version: None,
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config = toml::from_str(s)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_full() {
        let toml_str = r#"
        checksum = true
        validate_checksum = false
        server_version = "8.0.23-log"
        "#;
        let config = ParserConfig::from_toml_str(toml_str).unwrap();
        dbg!(&config);
        assert!(config.checksum);
        assert!(!config.validate_checksum);
        assert_eq!(Some("8.0.23-log"), config.server_version.as_deref());
    }

    #[test]
    fn test_config_defaults() {
        let config = ParserConfig::from_toml_str("checksum = true").unwrap();
        assert!(config.checksum);
        assert!(config.validate_checksum);
        assert!(config.server_version.is_none());
        assert_eq!(ParserConfig::default(), ParserConfig::from_toml_str("").unwrap());
    }

    #[test]
    fn test_config_invalid() {
        let err = ParserConfig::from_toml_str("checksum = \"yes\"").unwrap_err();
        println!("{}", err);
        assert!(matches!(err, crate::error::Error::ConfigError(_)));
    }
}
