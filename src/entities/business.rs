// Business entity - one row of the statistics committee export

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered business, keyed by BIN.
///
/// `additional_oked` is normalized to the empty string when the source cell
/// is absent; every other field is required by the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub bin: String,
    pub full_name: String,
    pub registration_date: NaiveDate,
    /// Primary activity code
    pub oked: String,
    /// Secondary activity code, "" when absent
    pub additional_oked: String,
    /// Enterprise size class
    pub krp: String,
    /// Region code
    pub kato: String,
}

impl Business {
    pub const TABLE: &'static str = "business";
}
