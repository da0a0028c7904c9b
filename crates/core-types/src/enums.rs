use serde::{Deserialize, Serialize};

/// Selects which per-date value of a series is used when several series are
/// aligned into one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Close,
    DailyReturn,
}

impl PriceField {
    /// Returns the column label used by chart collaborators.
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Close => "Close",
            PriceField::DailyReturn => "Daily_Ret",
        }
    }
}
