use chrono::{Datelike, Local, NaiveDate};

use crate::device::bridge::ScreenSize;
use crate::errors::{BillDroidError, BillDroidResult};
use crate::invoice::types::DUE_DATE_FORMAT;

/// Source of "today", injectable so date decisions are testable.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// What the scheduling date needs before the payment can be confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePlan {
    /// The app pre-selects today and the invoice is due today.
    Skip,
    Adjust {
        /// Day label to tap in the picker, e.g. `"20"`.
        day: String,
        /// Picker heading of the due month, e.g. `"julho"`.
        month: &'static str,
        /// Forward month swipes before the day is visible.
        months_ahead: u32,
    },
}

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

/// Month name as the picker heads each month.
pub fn month_label(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Decides the date sub-flow. The picker only scrolls forward, so an invoice
/// due before today is refused instead of guessed at.
pub fn plan(due: NaiveDate, today: NaiveDate) -> BillDroidResult<DatePlan> {
    if due == today {
        return Ok(DatePlan::Skip);
    }
    if due < today {
        return Err(BillDroidError::InvoiceOverdue {
            due: due.format(DUE_DATE_FORMAT).to_string(),
            today: today.format(DUE_DATE_FORMAT).to_string(),
        });
    }
    let months = |d: NaiveDate| d.year() * 12 + d.month0() as i32;
    Ok(DatePlan::Adjust {
        day: due.day().to_string(),
        month: month_label(due),
        months_ahead: (months(due) - months(today)) as u32,
    })
}

/// Vertical drag that scrolls the picker one month forward, measured from
/// the top edge of its continue button: from 8% to 37% of the screen height
/// above it.
pub fn month_swipe(screen: ScreenSize, continue_top: i32) -> (i32, i32, i32, i32) {
    let x = screen.width / 2;
    let h = screen.height as f64;
    (
        x,
        continue_top - (h * 0.08) as i32,
        x,
        continue_top - (h * 0.37) as i32,
    )
}
