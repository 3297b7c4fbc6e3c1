use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{BillDroidError, BillDroidResult};

/// Due dates travel as `DD/MM/YYYY`, the way billing providers print them.
pub const DUE_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub provider: String,
    pub due_date: String,
    /// Amount as rendered by the provider, e.g. `R$ 87,10`.
    pub value: String,
    pub barcode: String,
    #[serde(default)]
    pub status: String,
}

impl Invoice {
    pub fn due(&self) -> BillDroidResult<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), DUE_DATE_FORMAT).map_err(|e| {
            BillDroidError::InvalidInvoice(format!(
                "{}: due date '{}' is not DD/MM/YYYY ({e})",
                self.provider, self.due_date
            ))
        })
    }

    /// Rejects invoices the navigation flow could not possibly enter.
    pub fn validate(&self) -> BillDroidResult<()> {
        self.due()?;
        if self.barcode.trim().is_empty() {
            return Err(BillDroidError::InvalidInvoice(format!(
                "{}: empty barcode",
                self.provider
            )));
        }
        if self.value.trim().is_empty() {
            return Err(BillDroidError::InvalidInvoice(format!(
                "{}: empty value",
                self.provider
            )));
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        format!(
            "{} successfully captured:\nDueDate: {}\nValue: {}\nStatus: {}",
            self.provider, self.due_date, self.value, self.status
        )
    }
}
