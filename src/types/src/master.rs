use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Id, Named, Record};

/// Row of a lookup table (breed types, food types, medications, ...).
/// Fields other than `name` and `description` are kept as they came.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MasterRecord {
    pub id: Id,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for MasterRecord {
    fn id(&self) -> Id {
        self.id
    }
}

impl Named for MasterRecord {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
