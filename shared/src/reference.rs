use serde::{Deserialize, Serialize};

/// Credit card (ISO/IEC 7810 ID-1), width x height in cm.
pub const CREDIT_CARD_CM: (f64, f64) = (8.56, 5.398);
pub const A4_PAPER_CM: (f64, f64) = (21.0, 29.7);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceType {
    #[serde(rename = "credit-card")]
    CreditCard,
    #[serde(rename = "a4-paper")]
    A4Paper,
    #[serde(rename = "custom")]
    Custom,
}

impl ReferenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceType::CreditCard => "credit-card",
            ReferenceType::A4Paper => "a4-paper",
            ReferenceType::Custom => "custom",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "credit-card" => Some(ReferenceType::CreditCard),
            "a4-paper" => Some(ReferenceType::A4Paper),
            "custom" => Some(ReferenceType::Custom),
            _ => None,
        }
    }

    /// Physical size of a preset; `None` for `Custom`.
    pub fn preset_size(self) -> Option<(f64, f64)> {
        match self {
            ReferenceType::CreditCard => Some(CREDIT_CARD_CM),
            ReferenceType::A4Paper => Some(A4_PAPER_CM),
            ReferenceType::Custom => None,
        }
    }
}
