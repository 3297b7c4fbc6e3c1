use serde::{Deserialize, Serialize};

use crate::invoice::Invoice;

/// Named checkpoints of the bill-payment path through the banking app.
///
/// The engine keeps no record of "where" the app is; each checkpoint is
/// confirmed by finding its entry text in a fresh dump before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Home screen greeting after a cold start.
    AppLaunched,
    /// The "Pagar" shortcut is reachable.
    HomeMenuVisible,
    /// Payment menu listing "Pagar um boleto".
    BillPayMenuVisible,
    /// Barcode entry screen.
    BarcodeEntryVisible,
    /// Review screen showing the invoice amount.
    AmountConfirmed,
    /// Review screen showing the due date picked in the calendar.
    DateAdjusted,
    /// Payment input complete; confirmation is left to a human.
    Done,
}

impl Checkpoint {
    /// Text that must be on screen before the checkpoint counts as reached.
    pub fn entry_text<'a>(&self, invoice: &'a Invoice) -> Option<&'a str> {
        match self {
            Checkpoint::AppLaunched => Some("Olá"),
            Checkpoint::HomeMenuVisible => Some("Pagar"),
            Checkpoint::BillPayMenuVisible => Some("Pagar um boleto"),
            Checkpoint::BarcodeEntryVisible => Some("Inserir código"),
            Checkpoint::AmountConfirmed => Some(invoice.value.as_str()),
            Checkpoint::DateAdjusted => Some(invoice.due_date.as_str()),
            Checkpoint::Done => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Checkpoint::Done)
    }
}
