// Bankrupt list entity
// The list of taxpayers declared bankrupt by court decision

use chrono::NaiveDate;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::date_field;

/// A taxpayer declared bankrupt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessBankrupt {
    pub bin: String,
    pub rnn: String,
    pub full_name: String,
    pub taxpayer_name: String,
    pub director_name: String,
    pub director_iin: String,
    pub director_rnn: String,
    pub court_decision_number: String,
    pub court_decision_date: Option<NaiveDate>,
}

impl BusinessBankrupt {
    pub const TABLE: &'static str = "business_bankrupt";

    /// Document-store shape: the declared fields and nothing else.
    pub fn to_document(&self) -> Document {
        doc! {
            "bin": &self.bin,
            "rnn": &self.rnn,
            "full_name": &self.full_name,
            "taxpayer_name": &self.taxpayer_name,
            "director_name": &self.director_name,
            "director_iin": &self.director_iin,
            "director_rnn": &self.director_rnn,
            "court_decision_number": &self.court_decision_number,
            "court_decision_date": date_field(self.court_decision_date),
        }
    }
}
