use serde::{Deserialize, Serialize};

use crate::{Id, NamedRef, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: Id,
    pub farm: Ref<NamedRef>,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub size: i64,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub status: String,
}

impl Record for Batch {
    fn id(&self) -> Id {
        self.id
    }
}
