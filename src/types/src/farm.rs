use serde::{Deserialize, Serialize};

use crate::{user::PersonName, Id, Named, Record, Ref};

/// Farmer as nested inside farms and subscriptions.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FarmerSummary {
    pub id: Id,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: PersonName,
}

impl Named for FarmerSummary {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.user.full_name()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Farm {
    pub id: Id,
    pub farmer: Ref<FarmerSummary>,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "crate::de::opt_number")]
    pub size: Option<f64>,
}

impl Record for Farm {
    fn id(&self) -> Id {
        self.id
    }
}

impl Named for Farm {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
