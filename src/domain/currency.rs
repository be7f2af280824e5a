use serde::{Deserialize, Serialize};

use super::corps::CorpsClass;

/// One line of a participant's daily coin history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyEntry {
    pub event_name: String,
    pub corps_class: CorpsClass,
    pub amount: i64,
}
