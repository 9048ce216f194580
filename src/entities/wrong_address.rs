// Wrong-address list entity
// The list of taxpayers absent from their registered legal address

use chrono::NaiveDate;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::date_field;

/// A taxpayer flagged by an address inspection act.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessWrongAddress {
    pub bin: String,
    pub rnn: String,
    pub full_name: String,
    pub taxpayer_name: String,
    pub director_name: String,
    pub director_iin: String,
    pub director_rnn: String,
    pub inspection_act_number: String,
    pub inspection_act_date: Option<NaiveDate>,
}

impl BusinessWrongAddress {
    pub const TABLE: &'static str = "business_wrong_address";

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
            "inspection_act_number": &self.inspection_act_number,
            "inspection_act_date": date_field(self.inspection_act_date),
        }
    }
}
