use std::sync::Arc;

use tokio::sync::Mutex;

use crate::device::bridge::DeviceBridge;
use crate::errors::{BillDroidError, BillDroidResult};
use crate::perception::types::{Coordinate, ScreenDump};

#[derive(Default)]
struct CaptureState {
    generation: u64,
    cached: Option<ScreenDump>,
}

/// Screen capture with a one-step cache.
///
/// `capture(false)` may hand back the dump taken earlier in the same poll
/// step; every input action calls [`ScreenCapture::invalidate`], so the cache
/// never outlives a UI transition. On a cache miss the flag is passed on to
/// the bridge, which keeps its own input-aware copy.
pub struct ScreenCapture {
    bridge: Arc<dyn DeviceBridge>,
    state: Mutex<CaptureState>,
}

impl ScreenCapture {
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self {
            bridge,
            state: Mutex::new(CaptureState::default()),
        }
    }

    pub async fn capture(&self, force_refresh: bool) -> BillDroidResult<ScreenDump> {
        let mut state = self.state.lock().await;
        if !force_refresh {
            if let Some(dump) = &state.cached {
                return Ok(dump.clone());
            }
        }

        let xml = self
            .bridge
            .dump_ui_tree(force_refresh)
            .await
            .map_err(|e| match e {
                BillDroidError::DeviceUnreachable(_) => e,
                other => BillDroidError::DeviceUnreachable(other.to_string()),
            })?;

        state.generation += 1;
        let dump = ScreenDump::new(state.generation, xml);
        tracing::trace!(generation = dump.generation(), bytes = dump.xml().len(), "screen captured");
        state.cached = Some(dump.clone());
        Ok(dump)
    }

    /// Forget the cached dump. Called after anything that may change the UI.
    pub async fn invalidate(&self) {
        self.state.lock().await.cached = None;
    }

    /// Fails unless `coord` was derived from the dump currently on record.
    pub async fn ensure_current(&self, coord: &Coordinate) -> BillDroidResult<()> {
        let state = self.state.lock().await;
        match &state.cached {
            Some(dump) if dump.generation() == coord.generation => Ok(()),
            _ => Err(BillDroidError::StaleCoordinate {
                generation: coord.generation,
            }),
        }
    }
}
