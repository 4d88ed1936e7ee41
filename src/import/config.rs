//! Importer configuration.

use serde::{Deserialize, Serialize};

/// Upstream endpoint serving both invoices and credit notes.
pub const DEFAULT_API_URL: &str = "https://adraklive.com/api/l/app.aspx/sales_invoices";
/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable overriding [`ImportConfig::invoices_url`].
pub const INVOICES_URL_ENV_VAR: &str = "INVOICE_BRIDGE_INVOICES_URL";
/// Environment variable overriding [`ImportConfig::credit_notes_url`].
pub const CREDIT_NOTES_URL_ENV_VAR: &str = "INVOICE_BRIDGE_CREDIT_NOTES_URL";
/// Environment variable carrying the API key.
pub const API_KEY_ENV_VAR: &str = "INVOICE_BRIDGE_API_KEY";
/// Environment variable for the request timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "INVOICE_BRIDGE_TIMEOUT_SECS";
/// Environment variable overriding [`ImportConfig::default_currency`].
pub const CURRENCY_ENV_VAR: &str = "INVOICE_BRIDGE_DEFAULT_CURRENCY";

/// Configuration for the import pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Endpoint returning sales invoices.
    pub invoices_url: String,
    /// Endpoint returning credit notes.
    pub credit_notes_url: String,
    /// Static API key sent in the `x-api-key` header.
    pub api_key: Option<String>,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Currency used when the company has none configured.
    pub default_currency: String,
    /// UOM used when a line carries none.
    pub default_uom: String,
    /// Item group for items created on the fly.
    pub item_group: String,
    /// Country for created addresses.
    pub country: String,
    /// City for credit-note addresses that are not parsed.
    pub fallback_city: String,
    /// Run the address parser for credit notes too, when a display string
    /// is present. Off by default: credit-note addresses use the title as
    /// line 1 and [`fallback_city`](Self::fallback_city).
    pub parse_credit_note_addresses: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            invoices_url: DEFAULT_API_URL.into(),
            credit_notes_url: DEFAULT_API_URL.into(),
            api_key: None,
            timeout_secs: None,
            default_currency: "SAR".into(),
            default_uom: "Nos".into(),
            item_group: "Services".into(),
            country: "Saudi Arabia".into(),
            fallback_city: "Riyadh".into(),
            parse_credit_note_addresses: false,
        }
    }
}

impl ImportConfig {
    /// Defaults overlaid with `INVOICE_BRIDGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(INVOICES_URL_ENV_VAR) {
            self.invoices_url = url;
        }
        if let Some(url) = lookup(CREDIT_NOTES_URL_ENV_VAR) {
            self.credit_notes_url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV_VAR).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV_VAR).and_then(|s| s.parse().ok()) {
            self.timeout_secs = Some(secs);
        }
        if let Some(currency) = lookup(CURRENCY_ENV_VAR) {
            self.default_currency = currency;
        }
        self
    }
}

/// Builder for [`ImportConfig`].
///
/// ```
/// use invoice_bridge::import::ImportConfigBuilder;
///
/// let config = ImportConfigBuilder::new()
///     .api_key("secret")
///     .timeout_secs(30)
///     .build();
/// assert_eq!(config.default_currency, "SAR");
/// ```
#[derive(Debug, Default)]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point both invoice and credit-note fetches at `url`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.invoices_url = url.clone();
        self.config.credit_notes_url = url;
        self
    }

    pub fn invoices_url(mut self, url: impl Into<String>) -> Self {
        self.config.invoices_url = url.into();
        self
    }

    pub fn credit_notes_url(mut self, url: impl Into<String>) -> Self {
        self.config.credit_notes_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn default_currency(mut self, code: impl Into<String>) -> Self {
        self.config.default_currency = code.into();
        self
    }

    pub fn default_uom(mut self, uom: impl Into<String>) -> Self {
        self.config.default_uom = uom.into();
        self
    }

    pub fn item_group(mut self, group: impl Into<String>) -> Self {
        self.config.item_group = group.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.config.country = country.into();
        self
    }

    pub fn fallback_city(mut self, city: impl Into<String>) -> Self {
        self.config.fallback_city = city.into();
        self
    }

    pub fn parse_credit_note_addresses(mut self, parse: bool) -> Self {
        self.config.parse_credit_note_addresses = parse;
        self
    }

    pub fn build(self) -> ImportConfig {
        self.config
    }
}
