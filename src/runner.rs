use std::sync::Arc;

use crate::config::AppConfig;
use crate::device::bridge::{select_device, DeviceBridge};
use crate::device::session::{DeviceSession, SleepUnit};
use crate::errors::{BillDroidError, BillDroidResult};
use crate::flow::date::{Clock, SystemClock};
use crate::flow::{FlowReport, NavigationFlow};
use crate::invoice::provider::{FetchOptions, ProviderRegistry};
use crate::notify::WebhookNotifier;
use crate::perception::patterns::PatternRegistry;

/// One complete run: fetch invoices, pick a device, pay each invoice in turn.
pub struct Runner {
    config: AppConfig,
    patterns: Arc<PatternRegistry>,
    providers: ProviderRegistry,
    notifier: Option<WebhookNotifier>,
    fetch: FetchOptions,
    sleep: SleepUnit,
    clock: Arc<dyn Clock>,
}

impl Runner {
    /// Validates the pattern registry up front so a bad pattern stops the
    /// run before any provider or device work.
    pub fn new(config: AppConfig, fetch: FetchOptions, sleep: SleepUnit) -> BillDroidResult<Self> {
        let patterns = Arc::new(PatternRegistry::builtin()?);
        let providers = ProviderRegistry::from_config(&config);
        let notifier = WebhookNotifier::new(&config.hook_url);
        if notifier.is_none() {
            tracing::info!("no hook URL configured, notifications disabled");
        }
        Ok(Self {
            config,
            patterns,
            providers,
            notifier,
            fetch,
            sleep,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn notify(&self, text: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.send_best_effort(text).await;
        }
    }

    /// `lister` enumerates devices; `connect` returns a bridge bound to the
    /// chosen serial. Stops at the first failed payment.
    pub async fn run<F>(&self, lister: &dyn DeviceBridge, connect: F) -> BillDroidResult<Vec<FlowReport>>
    where
        F: FnOnce(&str) -> Arc<dyn DeviceBridge>,
    {
        tracing::info!(providers = ?self.providers.list_names(), "fetching invoices");
        let fetched = self.providers.fetch_all(&self.fetch).await;
        for (provider, err) in &fetched.failures {
            self.notify(&format!("{provider} invoice unavailable: {err}")).await;
        }
        if fetched.invoices.is_empty() {
            return Err(BillDroidError::Provider("no invoices found".into()));
        }

        let devices = lister.list_devices().await?;
        let device = select_device(&devices, self.config.device.serial.as_deref())
            .ok_or_else(|| BillDroidError::DeviceUnreachable("no usable device found".into()))?;
        if devices.len() > 1 {
            tracing::info!(serial = %device.serial, available = devices.len(), "multiple devices, picked one");
        }

        let bridge = connect(&device.serial);
        let session = DeviceSession::open(bridge.as_ref(), device.serial.clone(), self.sleep).await?;
        let flow = NavigationFlow::new(
            bridge,
            self.patterns.clone(),
            session,
            self.config.app.clone(),
            self.config.waits,
            self.clock.clone(),
        );

        let mut reports = Vec::with_capacity(fetched.invoices.len());
        for invoice in &fetched.invoices {
            match flow.pay(invoice).await {
                Ok(report) => {
                    self.notify(&invoice.to_text()).await;
                    reports.push(report);
                }
                Err(e) => {
                    tracing::error!(provider = %invoice.provider, error = %e, "payment flow aborted");
                    self.notify(&format!("{} payment flow failed: {e}", invoice.provider))
                        .await;
                    return Err(e);
                }
            }
        }
        Ok(reports)
    }
}
