// Registry record types
//
// One flat record per registry list, keyed by BIN. Records are append-only
// batch imports: created at load time, never updated, never deleted.
//
// Each entity declares its relational table name (the document collections
// reuse the same names) and builds its document-store map from an explicit
// field list.

pub mod bankrupt;
pub mod business;
pub mod invalid_registration;
pub mod wrong_address;

pub use bankrupt::BusinessBankrupt;
pub use business::Business;
pub use invalid_registration::BusinessInvalidRegistration;
pub use wrong_address::BusinessWrongAddress;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mongodb::bson::Bson;

/// Document-store representation of an optional calendar date.
/// Absent dates map to null; present dates widen to a timestamp at midnight.
pub(crate) fn date_field(date: Option<NaiveDate>) -> Bson {
    match date {
        Some(d) => {
            let midnight = NaiveDateTime::new(d, NaiveTime::MIN);
            Bson::DateTime(mongodb::bson::DateTime::from_millis(
                midnight.and_utc().timestamp_millis(),
            ))
        }
        None => Bson::Null,
    }
}
