use std::sync::Arc;

use crate::device::bridge::DeviceBridge;
use crate::device::session::SleepUnit;
use crate::errors::{BillDroidError, BillDroidResult};
use crate::executor::input::InputActuator;
use crate::flow::retry::{with_retry, Attempt, RetryOutcome};
use crate::perception::capture::ScreenCapture;
use crate::perception::coords;
use crate::perception::matcher;
use crate::perception::normalize::contains_folded;
use crate::perception::patterns::PatternRegistry;
use crate::perception::types::Coordinate;

/// Sleep units between two polls of the screen.
pub const POLL_UNITS: u32 = 10;
/// Sleep units after a tap before anything looks at the screen again.
pub const TAP_SETTLE_UNITS: u32 = 10;

/// Wait/poll controller: everything that looks at the screen and then acts
/// on what it saw goes through here.
pub struct ScreenDriver {
    capture: Arc<ScreenCapture>,
    input: InputActuator,
    patterns: Arc<PatternRegistry>,
    sleep: SleepUnit,
}

impl ScreenDriver {
    pub fn new(bridge: Arc<dyn DeviceBridge>, patterns: Arc<PatternRegistry>, sleep: SleepUnit) -> Self {
        let capture = Arc::new(ScreenCapture::new(bridge.clone()));
        let input = InputActuator::new(bridge, capture.clone(), sleep);
        Self {
            capture,
            input,
            patterns,
            sleep,
        }
    }

    pub fn input(&self) -> &InputActuator {
        &self.input
    }

    /// Case- and diacritic-insensitive search of the current dump.
    pub async fn has_in_screen(&self, want: &str, force_refresh: bool) -> BillDroidResult<bool> {
        let dump = self.capture.capture(force_refresh).await?;
        Ok(contains_folded(dump.xml(), want))
    }

    /// Polls fresh dumps until `want` shows up: one initial look plus up to
    /// `max_retries` more, `POLL_UNITS` apart. Returns the attempt that saw it.
    pub async fn wait_in_screen(&self, want: &str, max_retries: u32) -> BillDroidResult<u32> {
        let outcome = with_retry(
            max_retries.saturating_add(1),
            |_| self.sleep.times(POLL_UNITS),
            move |attempt| async move {
                if self.has_in_screen(want, true).await? {
                    Ok::<_, BillDroidError>(Attempt::Ready(()))
                } else {
                    tracing::debug!(want = %want, attempt, "waiting for screen");
                    Ok(Attempt::Pending)
                }
            },
        )
        .await?;

        match outcome {
            RetryOutcome::Success { attempts, .. } => {
                tracing::debug!(want = %want, attempts, "found on screen");
                Ok(attempts)
            }
            RetryOutcome::Timeout { .. } => Err(BillDroidError::Timeout {
                expected: want.to_string(),
                retries: max_retries,
            }),
        }
    }

    /// Like [`ScreenDriver::wait_in_screen`] but a timeout is just `false`.
    pub async fn appears_within(&self, want: &str, max_retries: u32) -> BillDroidResult<bool> {
        match self.wait_in_screen(want, max_retries).await {
            Ok(_) => Ok(true),
            Err(BillDroidError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Captures, matches `name` and resolves the hit to a tap point.
    pub async fn locate(
        &self,
        name: &str,
        args: &[&str],
        force_refresh: bool,
    ) -> BillDroidResult<Coordinate> {
        let dump = self.capture.capture(force_refresh).await?;
        let token = matcher::match_pattern(&self.patterns, name, args, &dump)?.ok_or_else(|| {
            BillDroidError::NotFound {
                pattern: name.to_string(),
            }
        })?;
        coords::resolve(&token)
    }

    /// Match on a forced capture, resolve, tap. No retries: if the element is
    /// not on screen the error comes back untouched and nothing is tapped.
    pub async fn exp2_tap(&self, name: &str) -> BillDroidResult<Coordinate> {
        self.exp2_tap_with(name, &[]).await
    }

    pub async fn exp2_tap_with(&self, name: &str, args: &[&str]) -> BillDroidResult<Coordinate> {
        let coord = self.locate(name, args, true).await?;
        self.capture.ensure_current(&coord).await?;
        tracing::info!(pattern = %name, x = coord.x, y = coord.y, "tapping element");
        self.input.tap(coord.x, coord.y, TAP_SETTLE_UNITS).await?;
        Ok(coord)
    }
}
