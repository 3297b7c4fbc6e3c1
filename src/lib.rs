pub mod cli;
pub mod config;
pub mod device;
pub mod errors;
pub mod executor;
pub mod flow;
pub mod invoice;
pub mod notify;
pub mod perception;
pub mod runner;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::Instrument;

use crate::cli::Cli;
use crate::device::adb::AdbBridge;
use crate::device::session::SleepUnit;
use crate::device::DeviceBridge;
use crate::errors::BillDroidResult;
use crate::flow::FlowReport;
use crate::invoice::provider::FetchOptions;
use crate::runner::Runner;

/// Loads the config named on the command line and runs every configured
/// invoice through the banking app on the selected adb device.
pub async fn run(cli: &Cli) -> BillDroidResult<Vec<FlowReport>> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", id = %run_id);

    async move {
        let config = config::load_config(&cli.config)?;
        let adb_path = config.device.adb_path.clone();
        let runner = Runner::new(
            config,
            FetchOptions {
                headless: cli.headless,
            },
            SleepUnit::from_millis(cli.default_sleep),
        )?;

        let lister = AdbBridge::new(&adb_path);
        let reports = runner
            .run(&lister, |serial| {
                Arc::new(AdbBridge::new(&adb_path).with_serial(serial)) as Arc<dyn DeviceBridge>
            })
            .await?;

        tracing::info!(paid = reports.len(), "all invoices ready for confirmation");
        Ok(reports)
    }
    .instrument(span)
    .await
}
