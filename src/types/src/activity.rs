use serde::{Deserialize, Serialize};

use crate::{Id, NamedRef, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: Id,
    pub batch: Ref<NamedRef>,
    pub activity_type: Ref<NamedRef>,
    pub date: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub notes: String,
}

impl Record for Activity {
    fn id(&self) -> Id {
        self.id
    }
}
