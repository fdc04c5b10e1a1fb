use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Id, Named, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Farmer,
}

impl UserRole {
    /// Landing route of the role.
    pub fn home(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin",
            UserRole::Farmer => "/farmer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Farmer => write!(f, "farmer"),
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(UserRole::Admin),
            "farmer" => Ok(UserRole::Farmer),
            _ => Err(format!("unknown role: {}", value)),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub last_name: String,
    pub role: UserRole,
    #[serde(default = "default_active", deserialize_with = "active_or_default")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn active_or_default<'de, D: serde::Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or_else(default_active))
}

impl User {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl Record for User {
    fn id(&self) -> Id {
        self.id
    }
}

impl Named for User {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }
}

/// Name fields as nested inside farmer summaries.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct PersonName {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub email: String,
}

impl PersonName {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

pub(crate) fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_owned()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Farmer {
    pub id: Id,
    pub user: Ref<User>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub address: String,
}

impl Record for Farmer {
    fn id(&self) -> Id {
        self.id
    }
}

impl Named for Farmer {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.user.label()
    }
}

#[derive(Serialize, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

#[derive(Deserialize, Debug)]
pub struct AuthInfo {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn role_round_trips_lowercase() {
        let role: UserRole = serde_json::from_value(json!("farmer")).unwrap();
        assert_eq!(role, UserRole::Farmer);
        assert_eq!(role.home(), "/farmer");
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), json!("admin"));
        assert!(UserRole::try_from("root").is_err());
    }

    #[test]
    fn farmer_label_follows_user() {
        let farmer: Farmer = serde_json::from_value(json!({
            "id": 3,
            "user": {"id": 9, "username": "wanjiku", "first_name": "Grace", "last_name": "Wanjiku", "role": "farmer"}
        }))
        .unwrap();
        assert_eq!(farmer.label(), "Grace Wanjiku");
        assert_eq!(farmer.user.id(), 9);

        let bare: Farmer = serde_json::from_value(json!({"id": 4, "user": 10})).unwrap();
        assert_eq!(bare.label(), "10");
    }
}
