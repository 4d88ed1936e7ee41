//! Upstream record sources.

use std::future::Future;

use serde_json::Value;

use super::pipeline::DocumentKind;
use super::record::parse_envelope;
use crate::core::ImportError;

/// Something that yields raw upstream payloads for a document kind.
pub trait InvoiceSource {
    /// Fetch all payloads of `kind`.
    ///
    /// # Errors
    ///
    /// Only batch-fatal errors ([`ImportError::Upstream`],
    /// [`ImportError::Envelope`]) are expected here.
    fn fetch(&self, kind: DocumentKind)
    -> impl Future<Output = Result<Vec<Value>, ImportError>> + Send;
}

/// A source backed by an envelope body already in memory, e.g. a saved
/// API response.
#[derive(Debug, Clone)]
pub struct JsonSource {
    body: String,
}

impl JsonSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl InvoiceSource for JsonSource {
    async fn fetch(&self, _kind: DocumentKind) -> Result<Vec<Value>, ImportError> {
        parse_envelope(&self.body)
    }
}

#[cfg(feature = "http")]
pub use http::HttpSource;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use serde_json::Value;
    use tracing::debug;

    use super::InvoiceSource;
    use crate::core::ImportError;
    use crate::import::config::{API_KEY_HEADER, ImportConfig};
    use crate::import::pipeline::DocumentKind;
    use crate::import::record::parse_envelope;

    /// Fetches envelopes from the upstream REST API with a static API key.
    ///
    /// A single GET per fetch; no retries.
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        client: reqwest::Client,
        invoices_url: String,
        credit_notes_url: String,
        api_key: Option<String>,
    }

    impl HttpSource {
        /// # Errors
        ///
        /// Returns [`ImportError::Upstream`] if the HTTP client cannot be built.
        pub fn new(config: &ImportConfig) -> Result<Self, ImportError> {
            let mut builder = reqwest::Client::builder();
            if let Some(secs) = config.timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            let client = builder
                .build()
                .map_err(|e| ImportError::Upstream(e.to_string()))?;
            Ok(Self {
                client,
                invoices_url: config.invoices_url.clone(),
                credit_notes_url: config.credit_notes_url.clone(),
                api_key: config.api_key.clone(),
            })
        }

        fn url(&self, kind: DocumentKind) -> &str {
            match kind {
                DocumentKind::SalesInvoice => &self.invoices_url,
                DocumentKind::CreditNote => &self.credit_notes_url,
            }
        }
    }

    impl InvoiceSource for HttpSource {
        async fn fetch(&self, kind: DocumentKind) -> Result<Vec<Value>, ImportError> {
            let url = self.url(kind);
            let mut request = self.client.get(url);
            if let Some(key) = &self.api_key {
                request = request.header(API_KEY_HEADER, key);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| ImportError::Upstream(format!("{url}: {e}")))?;

            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| ImportError::Upstream(e.to_string()))?;

            if !status.is_success() {
                return Err(ImportError::Upstream(format!("HTTP {status}: {body}")));
            }

            let payloads = parse_envelope(&body)?;
            debug!(%url, count = payloads.len(), "fetched payloads");
            Ok(payloads)
        }
    }

}
