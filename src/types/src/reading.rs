use serde::{Deserialize, Serialize};

use crate::{Id, Named, NamedRef, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SensorTypeRef {
    pub id: Id,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub unit: String,
}

impl Named for SensorTypeRef {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.unit)
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Reading {
    pub id: Id,
    pub device: Ref<NamedRef>,
    pub sensor_type: Ref<SensorTypeRef>,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub value: f64,
    pub timestamp: String,
}

impl Record for Reading {
    fn id(&self) -> Id {
        self.id
    }
}
