use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{user::PersonName, Id, Named, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
    Error,
    // Anything else the backend invents is kept verbatim.
    Other(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Inactive => "INACTIVE",
            DeviceStatus::Maintenance => "MAINTENANCE",
            DeviceStatus::Error => "ERROR",
            DeviceStatus::Other(s) => s,
        }
    }

    /// Status a toggle switches to.
    pub fn toggled(&self) -> DeviceStatus {
        match self {
            DeviceStatus::Active => DeviceStatus::Inactive,
            _ => DeviceStatus::Active,
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => DeviceStatus::Active,
            "INACTIVE" => DeviceStatus::Inactive,
            "MAINTENANCE" => DeviceStatus::Maintenance,
            "ERROR" => DeviceStatus::Error,
            _ => DeviceStatus::Other(value),
        }
    }
}

impl From<DeviceStatus> for String {
    fn from(value: DeviceStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FarmOwner {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: PersonName,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DeviceFarm {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub farmer: Option<FarmOwner>,
}

impl Named for DeviceFarm {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DeviceType {
    pub id: Id,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub parameters: Vec<String>,
}

impl Named for DeviceType {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LastReading {
    #[serde(default, deserialize_with = "crate::de::number")]
    pub temperature: f64,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub humidity: f64,
    pub timestamp: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_min: 15.0,
            temperature_max: 35.0,
            humidity_min: 40.0,
            humidity_max: 80.0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DeviceConfiguration {
    // seconds
    pub sampling_interval: u64,
    pub data_transmission_interval: u64,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub alert_thresholds: AlertThresholds,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            sampling_interval: 300,
            data_transmission_interval: 3600,
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Device {
    pub id: Id,
    pub farm: Ref<DeviceFarm>,
    pub device_type: Ref<DeviceType>,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub mac_address: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub ip_address: String,
    pub status: DeviceStatus,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_online: bool,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default, deserialize_with = "crate::de::opt_number")]
    pub battery_level: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::opt_number")]
    pub signal_strength: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub firmware_version: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub total_readings: u64,
    #[serde(default)]
    pub last_reading: Option<LastReading>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub configuration: DeviceConfiguration,
}

impl Record for Device {
    fn id(&self) -> Id {
        self.id
    }
}
