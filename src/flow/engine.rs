use std::sync::Arc;

use serde::Serialize;

use crate::config::{AppIdentity, WaitBudgets};
use crate::device::bridge::DeviceBridge;
use crate::device::session::DeviceSession;
use crate::errors::{BillDroidError, BillDroidResult};
use crate::flow::date::{self, Clock, DatePlan};
use crate::flow::retry::{with_retry, Attempt, RetryOutcome};
use crate::flow::state::Checkpoint;
use crate::flow::wait::{ScreenDriver, POLL_UNITS, TAP_SETTLE_UNITS};
use crate::invoice::Invoice;
use crate::perception::patterns::{
    PatternRegistry, CONTINUE, DATE_BUTTON, DATE_CONTINUE, DAY, DAY_IN_MONTH, INSERT_CODE,
    PAY_INVOICE, PAY_SHORTCUT, SHORTCUT_ROW,
};

const TOOLTIP_TEXT: &str = "Este é o próximo";
const DATE_PICKER_TEXT: &str = "Para qual dia útil você quer agendar";
/// Sleep units for the barcode field to take focus after "insert code".
const CODE_FIELD_UNITS: u32 = 30;
/// Screen-off timeout held while a payment is being driven: 10 minutes.
pub const FLOW_SCREEN_TIMEOUT_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub provider: String,
    pub visited: Vec<Checkpoint>,
}

/// Drives the banking app from a cold start to a filled-in bill payment.
///
/// Runs one invoice at a time against one device. Any unmatched element,
/// malformed coordinate or exhausted wait aborts the whole payment with that
/// error; there is no resume.
pub struct NavigationFlow {
    bridge: Arc<dyn DeviceBridge>,
    driver: ScreenDriver,
    session: DeviceSession,
    app: AppIdentity,
    waits: WaitBudgets,
    clock: Arc<dyn Clock>,
}

impl NavigationFlow {
    pub fn new(
        bridge: Arc<dyn DeviceBridge>,
        patterns: Arc<PatternRegistry>,
        session: DeviceSession,
        app: AppIdentity,
        waits: WaitBudgets,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let driver = ScreenDriver::new(bridge.clone(), patterns, session.sleep);
        Self {
            bridge,
            driver,
            session,
            app,
            waits,
            clock,
        }
    }

    pub async fn pay(&self, invoice: &Invoice) -> BillDroidResult<FlowReport> {
        // Everything that can be decided from the invoice alone is decided
        // before the device is touched.
        invoice.validate()?;
        let plan = date::plan(invoice.due()?, self.clock.today())?;
        tracing::info!(
            provider = %invoice.provider,
            due = %invoice.due_date,
            value = %invoice.value,
            ?plan,
            "starting payment flow"
        );

        self.wait_device_ready().await?;
        let previous_timeout = self.extend_screen_timeout().await?;
        let result = self.drive(invoice, &plan).await;
        self.restore_screen_timeout(previous_timeout).await;
        result
    }

    async fn drive(&self, invoice: &Invoice, plan: &DatePlan) -> BillDroidResult<FlowReport> {
        self.wake().await?;
        self.relaunch().await?;

        let mut state = Checkpoint::AppLaunched;
        let mut visited = Vec::new();
        loop {
            if let Some(text) = state.entry_text(invoice) {
                self.driver.wait_in_screen(text, self.budget(state)).await?;
            }
            tracing::info!(checkpoint = ?state, "checkpoint reached");
            visited.push(state);

            if state.is_terminal() {
                break;
            }
            state = self.advance(state, invoice, plan).await?;
        }

        tracing::info!(provider = %invoice.provider, "payment ready for confirmation");
        Ok(FlowReport {
            provider: invoice.provider.clone(),
            visited,
        })
    }

    fn budget(&self, state: Checkpoint) -> u32 {
        match state {
            Checkpoint::AppLaunched => self.waits.launch,
            _ => self.waits.step,
        }
    }

    /// Performs the action that should lead from `from` to the returned checkpoint.
    async fn advance(
        &self,
        from: Checkpoint,
        invoice: &Invoice,
        plan: &DatePlan,
    ) -> BillDroidResult<Checkpoint> {
        match from {
            Checkpoint::AppLaunched => {
                self.reveal_pay_shortcut().await?;
                Ok(Checkpoint::HomeMenuVisible)
            }
            Checkpoint::HomeMenuVisible => {
                self.driver.exp2_tap(PAY_SHORTCUT).await?;
                Ok(Checkpoint::BillPayMenuVisible)
            }
            Checkpoint::BillPayMenuVisible => {
                self.driver.exp2_tap(PAY_INVOICE).await?;
                Ok(Checkpoint::BarcodeEntryVisible)
            }
            Checkpoint::BarcodeEntryVisible => {
                self.enter_barcode(invoice).await?;
                Ok(Checkpoint::AmountConfirmed)
            }
            Checkpoint::AmountConfirmed => match plan {
                DatePlan::Skip => {
                    tracing::info!("invoice due today, keeping the preselected date");
                    Ok(Checkpoint::Done)
                }
                DatePlan::Adjust {
                    day,
                    month,
                    months_ahead,
                } => {
                    self.adjust_date(day, month, *months_ahead).await?;
                    Ok(Checkpoint::DateAdjusted)
                }
            },
            Checkpoint::DateAdjusted | Checkpoint::Done => Ok(Checkpoint::Done),
        }
    }

    /// Polls until the device reports a completed boot. Transport errors
    /// count as "not yet": adb answers with errors while a device reconnects.
    async fn wait_device_ready(&self) -> BillDroidResult<()> {
        let retries = self.waits.device_ready;
        let outcome = with_retry(
            retries.saturating_add(1),
            |_| self.session.sleep.times(POLL_UNITS),
            |attempt| async move {
                match self.bridge.is_boot_completed().await {
                    Ok(true) => Ok::<_, BillDroidError>(Attempt::Ready(())),
                    Ok(false) => Ok(Attempt::Pending),
                    Err(e) => {
                        tracing::debug!(attempt, error = %e, "device not answering yet");
                        Ok(Attempt::Pending)
                    }
                }
            },
        )
        .await?;
        match outcome {
            RetryOutcome::Success { .. } => Ok(()),
            RetryOutcome::Timeout { .. } => Err(BillDroidError::DeviceUnreachable(format!(
                "{} not ready after {retries} retries",
                self.session.serial
            ))),
        }
    }

    /// Raises the screen-off timeout for the length of the flow and returns
    /// the value to put back.
    async fn extend_screen_timeout(&self) -> BillDroidResult<u64> {
        let previous = self.bridge.screen_off_timeout().await?;
        if previous < FLOW_SCREEN_TIMEOUT_MS {
            self.bridge
                .set_screen_off_timeout(FLOW_SCREEN_TIMEOUT_MS)
                .await?;
        }
        tracing::debug!(previous, held = FLOW_SCREEN_TIMEOUT_MS, "screen timeout extended");
        Ok(previous)
    }

    async fn restore_screen_timeout(&self, previous: u64) {
        if previous >= FLOW_SCREEN_TIMEOUT_MS {
            return;
        }
        if let Err(e) = self.bridge.set_screen_off_timeout(previous).await {
            tracing::warn!(error = %e, previous, "could not restore screen timeout");
        }
    }

    async fn wake(&self) -> BillDroidResult<()> {
        if self.bridge.is_screen_on().await? {
            return Ok(());
        }
        tracing::info!(serial = %self.session.serial, "screen off, waking device");
        self.bridge.wake_up().await?;
        let (w, h) = (self.session.screen.width, self.session.screen.height);
        self.driver.input().swipe(w / 2, h - 100, w / 2, 100).await
    }

    /// Close then start, so the flow always begins from the app's launch
    /// screen, and wait for the app to hold the foreground.
    async fn relaunch(&self) -> BillDroidResult<()> {
        let package = self.app.package.as_str();
        tracing::info!(package = %package, "relaunching app");
        self.bridge.close_app(package).await?;
        self.bridge.start_app(package, &self.app.activity).await?;

        let retries = self.waits.app_start;
        let outcome = with_retry(
            retries.saturating_add(1),
            |_| self.session.sleep.times(POLL_UNITS),
            |attempt| async move {
                let focused = self.bridge.foreground_package().await?;
                if focused.as_deref() == Some(package) {
                    Ok::<_, BillDroidError>(Attempt::Ready(()))
                } else {
                    tracing::debug!(attempt, focused = ?focused, "waiting for app foreground");
                    Ok(Attempt::Pending)
                }
            },
        )
        .await?;
        match outcome {
            RetryOutcome::Success { .. } => Ok(()),
            RetryOutcome::Timeout { .. } => Err(BillDroidError::AppNotStarted {
                package: package.to_string(),
                retries,
            }),
        }
    }

    /// The pay shortcut sits in a horizontally scrolling row; drag the row
    /// left once if the shortcut is not in the dump just taken.
    async fn reveal_pay_shortcut(&self) -> BillDroidResult<()> {
        if self.driver.has_in_screen("Pagar", false).await? {
            return Ok(());
        }
        match self.driver.locate(SHORTCUT_ROW, &[], false).await {
            Ok(coord) => {
                tracing::debug!(x = coord.x, y = coord.y, "scrolling shortcut row");
                self.driver.input().swipe(coord.x, coord.y, 100, coord.y).await
            }
            Err(BillDroidError::NotFound { .. }) => {
                tracing::warn!("shortcut row not on screen, waiting for the pay shortcut anyway");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn enter_barcode(&self, invoice: &Invoice) -> BillDroidResult<()> {
        self.driver.exp2_tap(INSERT_CODE).await?;
        self.session.sleep.sleep(CODE_FIELD_UNITS).await;
        self.driver.input().input_text(&invoice.barcode, true).await?;
        self.driver.exp2_tap(CONTINUE).await?;

        if self.driver.appears_within(TOOLTIP_TEXT, self.waits.tooltip).await? {
            tracing::debug!("dismissing onboarding tooltip");
            self.session.sleep.sleep(TAP_SETTLE_UNITS).await;
            let (x, y) = self.session.center();
            self.driver.input().tap(x, y, TAP_SETTLE_UNITS / 2).await?;
        }
        Ok(())
    }

    async fn adjust_date(&self, day: &str, month: &str, months_ahead: u32) -> BillDroidResult<()> {
        tracing::info!(day = %day, month = %month, months_ahead, "adjusting scheduled date");
        self.driver.exp2_tap(DATE_BUTTON).await?;
        self.driver
            .wait_in_screen(DATE_PICKER_TEXT, self.waits.date_picker)
            .await?;

        for step in 1..=months_ahead {
            let anchor = self.driver.locate(DATE_CONTINUE, &[], true).await?;
            let (x1, y1, x2, y2) = date::month_swipe(self.session.screen, anchor.bounds.top());
            tracing::debug!(step, "swiping to next month");
            self.session.sleep.sleep(TAP_SETTLE_UNITS).await;
            self.driver.input().swipe(x1, y1, x2, y2).await?;
        }

        // Once swiped, the previous month's last week may still be on screen.
        if months_ahead == 0 {
            self.driver.exp2_tap_with(DAY, &[day]).await?;
        } else {
            self.driver.exp2_tap_with(DAY_IN_MONTH, &[month, day]).await?;
        }
        self.driver.exp2_tap(CONTINUE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::session::SleepUnit;
    use crate::flow::date::FixedClock;
    use crate::invoice::types::DUE_DATE_FORMAT;
    use crate::testing::{BridgeCall, FakeBridge, FakeScreen, SCREEN};
    use chrono::NaiveDate;

    const BARCODE: &str = "84660000000-1 23456000000-0 00000000000-0 00000000000-0";

    fn invoice(due: &str) -> Invoice {
        Invoice {
            provider: "enel".into(),
            due_date: due.into(),
            value: "R$ 87,10".into(),
            barcode: BARCODE.into(),
            status: "open".into(),
        }
    }

    fn flow(fake: &Arc<FakeBridge>, today: &str) -> NavigationFlow {
        let session = DeviceSession {
            serial: "FAKE0001".into(),
            screen: SCREEN,
            sleep: SleepUnit::from_millis(0),
        };
        NavigationFlow::new(
            fake.clone(),
            Arc::new(PatternRegistry::builtin().unwrap()),
            session,
            AppIdentity::default(),
            WaitBudgets::default(),
            Arc::new(FixedClock(
                NaiveDate::parse_from_str(today, DUE_DATE_FORMAT).unwrap(),
            )),
        )
    }

    /// Home → pay menu → barcode entry → code field → typed → review.
    fn app_until_review(review_xml: &str) -> Vec<FakeScreen> {
        vec![
            FakeScreen::new(
                r#"<hierarchy><node text="Olá, Maria" bounds="[0,100][1080,300]" /><node text="Pix" bounds="[40,1800][240,1900]" /><node text="Pagar" bounds="[260,1800][460,1900]" /></hierarchy>"#,
            )
            .on_tap("[260,1800][460,1900]", 1),
            FakeScreen::new(
                r#"<hierarchy><node text="Pagar um boleto" bounds="[0,200][1080,300]" /><node text="Contas de luz, água e gás" bounds="[0,400][1080,560]" /></hierarchy>"#,
            )
            .on_tap("[0,400][1080,560]", 2),
            FakeScreen::new(
                r#"<hierarchy><node text="Use a câmera para ler o código" bounds="[0,200][1080,300]" /><node text="INSERIR CÓDIGO" bounds="[100,2000][980,2150]" /></hierarchy>"#,
            )
            .on_tap("[100,2000][980,2150]", 3),
            FakeScreen::new(
                r#"<hierarchy><node text="Digite o código do boleto" class="android.widget.EditText" bounds="[40,600][1040,700]" /></hierarchy>"#,
            )
            .on_text(4),
            FakeScreen::new(
                r#"<hierarchy><node text="84660000000-1 23456000000-0 00000000000-0 00000000000-0" bounds="[40,600][1040,700]" /><node text="CONTINUAR" bounds="[40,2200][1040,2320]" /></hierarchy>"#,
            )
            .on_tap("[40,2200][1040,2320]", 5),
            FakeScreen::new(review_xml),
        ]
    }

    #[tokio::test]
    async fn invoice_due_today_runs_straight_to_done() {
        let screens = app_until_review(
            r#"<hierarchy><node text="Valor" /><node text="R$ 87,10" /><node text="15/06/2024" bounds="[40,900][1040,1000]" /></hierarchy>"#,
        );
        let fake = Arc::new(FakeBridge::machine(screens));
        fake.set_screen_on(false);

        let report = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap();

        assert_eq!(
            report.visited,
            vec![
                Checkpoint::AppLaunched,
                Checkpoint::HomeMenuVisible,
                Checkpoint::BillPayMenuVisible,
                Checkpoint::BarcodeEntryVisible,
                Checkpoint::AmountConfirmed,
                Checkpoint::Done,
            ]
        );
        let calls = fake.calls();
        let typed: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, BridgeCall::TypeText(_)))
            .collect();
        assert_eq!(typed, vec![&BridgeCall::TypeText(BARCODE.into())]);

        // Ready check, screen timeout held, unlock swipe, clean relaunch,
        // all before any dump.
        assert_eq!(
            calls[..9].to_vec(),
            vec![
                BridgeCall::IsBootCompleted,
                BridgeCall::GetScreenTimeout,
                BridgeCall::SetScreenTimeout(FLOW_SCREEN_TIMEOUT_MS),
                BridgeCall::IsScreenOn,
                BridgeCall::WakeUp,
                BridgeCall::Swipe(540, 2300, 540, 100),
                BridgeCall::CloseApp("com.nu.production".into()),
                BridgeCall::StartApp(
                    "com.nu.production".into(),
                    "br.com.nubank.shell.screens.splash.SplashActivity".into()
                ),
                BridgeCall::ForegroundPackage,
            ]
        );
        assert_eq!(calls.last(), Some(&BridgeCall::SetScreenTimeout(30_000)));
        assert_eq!(fake.screen_timeout(), 30_000);
        // No date picker interaction.
        assert!(!calls.contains(&BridgeCall::Tap(540, 950)));
        assert_eq!(fake.current_screen(), Some(5));
    }

    /// Review screen → picker for `today`'s month → one swipe → picker whose
    /// dump still shows the old month's `day` above the target month's →
    /// day picked → review with `due`.
    fn app_through_picker(day: &str, old_month: &str, new_month: &str, due: &str) -> Vec<FakeScreen> {
        let mut screens = app_until_review("<hierarchy />");
        screens[5] = FakeScreen::new(
            r#"<hierarchy><node text="R$ 87,10" /><node text="15/06/2024" bounds="[40,900][1040,1000]" /></hierarchy>"#,
        )
        .on_tap("[40,900][1040,1000]", 6);
        screens.push(
            FakeScreen::new(format!(
                r#"<hierarchy><node text="Para qual dia útil você quer agendar?" /><node text="{old_month}" /><node text="{day}" bounds="[500,500][600,600]" /><node text="CONTINUAR" bounds="[40,2200][1040,2320]" /></hierarchy>"#
            ))
            .on_swipe(7),
        );
        screens.push(
            FakeScreen::new(format!(
                r#"<hierarchy><node text="Para qual dia útil você quer agendar?" /><node text="{old_month}" /><node text="{day}" bounds="[500,300][600,400]" /><node text="{new_month}" /><node text="{day}" bounds="[500,1200][600,1300]" /><node text="CONTINUAR" bounds="[40,2200][1040,2320]" /></hierarchy>"#
            ))
            .on_tap("[500,1200][600,1300]", 8),
        );
        screens.push(
            FakeScreen::new(format!(
                r#"<hierarchy><node text="Para qual dia útil você quer agendar?" /><node text="{day}" selected="true" bounds="[500,1200][600,1300]" /><node text="CONTINUAR" bounds="[40,2200][1040,2320]" /></hierarchy>"#
            ))
            .on_tap("[40,2200][1040,2320]", 9),
        );
        screens.push(FakeScreen::new(format!(
            r#"<hierarchy><node text="R$ 87,10" /><node text="{due}" bounds="[40,900][1040,1000]" /></hierarchy>"#
        )));
        screens
    }

    #[tokio::test]
    async fn later_month_swipes_once_before_picking_the_day() {
        let screens = app_through_picker("20", "Junho 2024", "Julho 2024", "20/07/2024");
        let fake = Arc::new(FakeBridge::machine(screens));

        let report = flow(&fake, "15/06/2024").pay(&invoice("20/07/2024")).await.unwrap();

        assert_eq!(
            &report.visited[4..],
            &[
                Checkpoint::AmountConfirmed,
                Checkpoint::DateAdjusted,
                Checkpoint::Done
            ]
        );
        let calls = fake.calls();
        let swipes: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, BridgeCall::Swipe(..)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(swipes.len(), 1);
        assert_eq!(calls[swipes[0]], BridgeCall::Swipe(540, 2008, 540, 1312));
        let day_tap = calls
            .iter()
            .position(|c| *c == BridgeCall::Tap(550, 1250))
            .expect("July 20 tapped");
        assert!(swipes[0] < day_tap);
        // Neither June 20 before the swipe nor June 20 still visible after it.
        assert!(!calls.contains(&BridgeCall::Tap(550, 550)));
        assert!(!calls.contains(&BridgeCall::Tap(550, 350)));
        assert_eq!(fake.current_screen(), Some(9));
    }

    #[tokio::test]
    async fn same_day_in_a_later_month_is_not_treated_as_today() {
        let screens = app_through_picker("15", "junho", "julho", "15/07/2024");
        let fake = Arc::new(FakeBridge::machine(screens));

        let report = flow(&fake, "15/06/2024").pay(&invoice("15/07/2024")).await.unwrap();

        assert_eq!(
            &report.visited[4..],
            &[
                Checkpoint::AmountConfirmed,
                Checkpoint::DateAdjusted,
                Checkpoint::Done
            ]
        );
        assert!(fake.calls().contains(&BridgeCall::Tap(540, 950)));
        assert!(fake.calls().contains(&BridgeCall::Tap(550, 1250)));
        assert_eq!(fake.current_screen(), Some(9));
    }

    #[tokio::test]
    async fn waits_for_the_device_to_finish_booting() {
        let fake = Arc::new(FakeBridge::machine(app_until_review(
            r#"<hierarchy><node text="R$ 87,10" /></hierarchy>"#,
        )));
        fake.set_boot_pending(2);

        flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap();

        assert_eq!(fake.count(|c| *c == BridgeCall::IsBootCompleted), 3);
    }

    #[tokio::test]
    async fn device_that_never_boots_is_unreachable() {
        let fake = Arc::new(FakeBridge::machine(app_until_review("<hierarchy />")));
        fake.set_boot_pending(u32::MAX);

        let err = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap_err();

        assert!(matches!(err, BillDroidError::DeviceUnreachable(_)));
        // Default budget of 5 retries: six checks, and nothing else touched.
        assert_eq!(fake.count(|c| *c == BridgeCall::IsBootCompleted), 6);
        assert_eq!(fake.calls().len(), 6);
    }

    #[tokio::test]
    async fn app_that_never_takes_the_foreground_aborts_before_any_dump() {
        let fake = Arc::new(FakeBridge::machine(app_until_review("<hierarchy />")));
        fake.set_app_starts(false);

        let err = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap_err();

        assert!(matches!(
            err,
            BillDroidError::AppNotStarted { ref package, retries: 10 } if package == "com.nu.production"
        ));
        assert_eq!(fake.count(|c| *c == BridgeCall::ForegroundPackage), 11);
        assert_eq!(fake.count(|c| matches!(c, BridgeCall::Dump(_))), 0);
        // The screen timeout is put back even though the flow failed.
        assert_eq!(fake.calls().last(), Some(&BridgeCall::SetScreenTimeout(30_000)));
    }

    #[tokio::test]
    async fn hidden_shortcut_is_scrolled_into_view() {
        let mut screens = app_until_review(
            r#"<hierarchy><node text="R$ 87,10" /></hierarchy>"#,
        );
        let home = std::mem::replace(
            &mut screens[0],
            FakeScreen::new(
                r#"<hierarchy><node text="Olá, Maria" /><node text="Pix" bounds="[740,1800][940,1900]" /></hierarchy>"#,
            )
            .on_swipe(6),
        );
        screens.push(home);
        // The revealed home screen taps through to the pay menu as before.
        let fake = Arc::new(FakeBridge::machine(screens));

        let report = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap();

        assert_eq!(report.visited.last(), Some(&Checkpoint::Done));
        assert!(fake.calls().contains(&BridgeCall::Swipe(840, 1850, 100, 1850)));
    }

    #[tokio::test]
    async fn missing_element_aborts_without_further_input() {
        let mut screens = app_until_review("<hierarchy />");
        screens[1] = FakeScreen::new(
            r#"<hierarchy><node text="Pagar um boleto" bounds="[0,200][1080,300]" /><node text="Pix Copia e Cola" bounds="[0,400][1080,560]" /></hierarchy>"#,
        );
        let fake = Arc::new(FakeBridge::machine(screens));

        let err = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap_err();

        assert!(matches!(err, BillDroidError::NotFound { ref pattern } if pattern == PAY_INVOICE));
        assert_eq!(fake.count(|c| matches!(c, BridgeCall::Tap(..))), 1);
        assert_eq!(fake.count(|c| matches!(c, BridgeCall::TypeText(_))), 0);
        assert_eq!(fake.screen_timeout(), 30_000);
    }

    #[tokio::test]
    async fn wrong_amount_times_out_at_the_review_screen() {
        let screens = app_until_review(
            r#"<hierarchy><node text="R$ 99,99" /><node text="15/06/2024" /></hierarchy>"#,
        );
        let fake = Arc::new(FakeBridge::machine(screens));

        let err = flow(&fake, "15/06/2024").pay(&invoice("15/06/2024")).await.unwrap_err();

        assert!(matches!(
            err,
            BillDroidError::Timeout { ref expected, retries: 5 } if expected == "R$ 87,10"
        ));
    }

    #[tokio::test]
    async fn overdue_invoice_never_touches_the_device() {
        let fake = Arc::new(FakeBridge::machine(app_until_review("<hierarchy />")));

        let err = flow(&fake, "15/06/2024").pay(&invoice("20/05/2024")).await.unwrap_err();

        assert!(matches!(err, BillDroidError::InvoiceOverdue { .. }));
        assert!(fake.calls().is_empty());
    }
}
