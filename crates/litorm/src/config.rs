use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use std::collections::HashMap;

/// Configuration consumed by [`crate::Orm`] and every builder it hands out.
///
/// By default the primary key is `id`, the quote character is detected from the
/// client's dialect, and both query logging and result caching are disabled.
///
/// The struct deserializes with every field optional, so it can be embedded in an
/// application's own configuration file:
///
/// ```toml
/// id_column = "ID"
/// identifier_quote_character = "`"
/// logging = true
///
/// [id_column_overrides]
/// people = "person_id"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrmConfig {
    /// Default primary-key column name.
    pub id_column: String,
    /// Per-table primary-key column names.
    pub id_column_overrides: HashMap<String, String>,
    /// Identifier quote character. `None` means autodetect from the client.
    pub identifier_quote_character: Option<char>,
    /// Whether executed statements are appended to the query log.
    pub logging: bool,
    /// Whether SELECT results are cached by compiled SQL and values.
    pub caching: bool,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            id_column_overrides: HashMap::new(),
            identifier_quote_character: None,
            logging: false,
            caching: false,
        }
    }
}

impl OrmConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let config: OrmConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the default primary-key column.
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Override the primary-key column for one table.
    pub fn id_column_override(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.id_column_overrides.insert(table.into(), column.into());
        self
    }

    /// Force a quote character instead of detecting it.
    pub fn identifier_quote_character(mut self, quote: char) -> Self {
        self.identifier_quote_character = Some(quote);
        self
    }

    /// Enable or disable the query log.
    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Enable or disable the result cache.
    pub fn caching(mut self, enabled: bool) -> Self {
        self.caching = enabled;
        self
    }

    /// Resolve the primary-key column for `table` (override first, then default).
    pub fn id_column_for(&self, table: &str) -> &str {
        self.id_column_overrides
            .get(table)
            .map(String::as_str)
            .unwrap_or(&self.id_column)
    }

    fn validate(&self) -> OrmResult<()> {
        if self.id_column.is_empty() {
            return Err(OrmError::Config("id_column cannot be empty".to_string()));
        }
        if let Some((table, _)) = self.id_column_overrides.iter().find(|(_, c)| c.is_empty()) {
            return Err(OrmError::Config(format!(
                "id_column_overrides.{table} cannot be empty"
            )));
        }
        Ok(())
    }
}
