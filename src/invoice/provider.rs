use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, ProviderEntry};
use crate::errors::{BillDroidError, BillDroidResult};
use crate::invoice::types::Invoice;

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Run browser-backed providers without a visible window.
    pub headless: bool,
}

/// Source of invoice data for one billing company.
/// New providers only need to implement this trait and register in the registry.
#[async_trait]
pub trait InvoiceProvider: Send + Sync {
    /// Returns the provider's identifier (matches its config key).
    fn name(&self) -> &str;

    async fn fetch(&self, opts: &FetchOptions) -> BillDroidResult<Invoice>;
}

/// Serves the invoice recorded under the provider's config entry.
pub struct ConfiguredInvoiceProvider {
    id: String,
    entry: ProviderEntry,
}

impl ConfiguredInvoiceProvider {
    pub fn new(id: String, entry: ProviderEntry) -> Self {
        Self { id, entry }
    }
}

#[async_trait]
impl InvoiceProvider for ConfiguredInvoiceProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, opts: &FetchOptions) -> BillDroidResult<Invoice> {
        tracing::debug!(provider = %self.id, headless = opts.headless, "fetching invoice");
        let mut invoice = self.entry.invoice.clone().ok_or_else(|| {
            BillDroidError::Provider(format!("{}: no invoice available", self.id))
        })?;
        if invoice.provider.is_empty() {
            invoice.provider = self.id.clone();
        }
        Ok(invoice)
    }
}

/// Outcome of asking every provider for its invoice.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub invoices: Vec<Invoice>,
    pub failures: Vec<(String, BillDroidError)>,
}

/// Registry of all invoice providers, keyed by their config identifier.
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn InvoiceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn InvoiceProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn list_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        for (id, entry) in &config.providers {
            registry.register(Arc::new(ConfiguredInvoiceProvider::new(
                id.clone(),
                entry.clone(),
            )));
        }
        registry
    }

    /// Fetches from every provider in turn. A provider failure, or an invoice
    /// that fails validation, is recorded and does not stop the others.
    pub async fn fetch_all(&self, opts: &FetchOptions) -> FetchReport {
        let mut report = FetchReport::default();
        for (id, provider) in &self.providers {
            match provider.fetch(opts).await.and_then(|inv| inv.validate().map(|_| inv)) {
                Ok(invoice) => {
                    tracing::info!(
                        provider = %id,
                        due = %invoice.due_date,
                        value = %invoice.value,
                        "invoice fetched"
                    );
                    report.invoices.push(invoice);
                }
                Err(e) => {
                    tracing::warn!(provider = %id, error = %e, "invoice fetch failed");
                    report.failures.push((id.clone(), e));
                }
            }
        }
        report
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
