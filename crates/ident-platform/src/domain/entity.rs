//! Domain Entity
//!
//! Tenant boundary. Only the name is used here, to build console URLs.

use serde::{Deserialize, Serialize};

use crate::usecase::HasId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(rename = "_id")]
    pub domain_id: String,
    pub name: String,
}

impl Domain {
    pub fn new(domain_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            name: name.into(),
        }
    }
}

impl HasId for Domain {
    fn id(&self) -> &str {
        &self.domain_id
    }

    fn collection_name() -> &'static str {
        "domains"
    }
}
