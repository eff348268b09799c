use serde::{Deserialize, Serialize};

use crate::domain::types::LocationId;

/// Physical place offered in the location filter and meeting form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}
