//! IoT devices: search, status/online filters, fleet statistics and the
//! active/inactive toggle.

use std::sync::Arc;

use api::Backend;
use chrono::{DateTime, Utc};
use common::error::{ConsoleError, ConsoleResult};
use managers::{
    form::to_number, Column, Field, FormValues, Lookup, ResourceManager, ResourceSpec, Table,
};
use serde_json::{Map, Value};
use types::{
    device::{Device, DeviceConfiguration, DeviceStatus, DeviceType},
    resource::ResourceKind,
    Id, NamedRef,
};

pub const DEVICE_TYPES_ENDPOINT: &str = "device-types/";

const CONFIG_KEYS: [&str; 2] = ["sampling_interval", "data_transmission_interval"];
const THRESHOLD_KEYS: [&str; 4] = [
    "temperature_min",
    "temperature_max",
    "humidity_min",
    "humidity_max",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Is(DeviceStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnlineFilter {
    #[default]
    All,
    Online,
    Offline,
}

impl TryFrom<&str> for OnlineFilter {
    type Error = ConsoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "ALL" => Ok(OnlineFilter::All),
            "ONLINE" => Ok(OnlineFilter::Online),
            "OFFLINE" => Ok(OnlineFilter::Offline),
            _ => Err(ConsoleError::Common(format!("unknown online filter: {}", value))),
        }
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            StatusFilter::All
        } else {
            StatusFilter::Is(DeviceStatus::from(value.to_uppercase()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceFilter {
    pub status: StatusFilter,
    pub online: OnlineFilter,
}

impl DeviceFilter {
    pub fn keep(&self, device: &Device) -> bool {
        let status = match &self.status {
            StatusFilter::All => true,
            StatusFilter::Is(status) => &device.status == status,
        };
        let online = match self.online {
            OnlineFilter::All => true,
            OnlineFilter::Online => device.is_online,
            OnlineFilter::Offline => !device.is_online,
        };
        status && online
    }
}

/// Search over name, serial, MAC, IP, farm and device type.
pub fn search_matches(device: &Device, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [
        device.name.clone(),
        device.serial_number.clone(),
        device.mac_address.clone(),
        device.ip_address.clone(),
        device.farm.label(),
        device.device_type.label(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceStats {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub active: usize,
    pub total_readings: u64,
    /// Missing levels count as zero, as on the fleet overview.
    pub average_battery: f64,
    pub average_signal: f64,
}

impl DeviceStats {
    pub fn of(devices: &[Device]) -> Self {
        let total = devices.len();
        let online = devices.iter().filter(|d| d.is_online).count();
        let average = |f: fn(&Device) -> Option<f64>| {
            if total == 0 {
                0.0
            } else {
                devices.iter().filter_map(f).sum::<f64>() / total as f64
            }
        };
        Self {
            total,
            online,
            offline: total - online,
            active: devices
                .iter()
                .filter(|d| d.status == DeviceStatus::Active)
                .count(),
            total_readings: devices.iter().map(|d| d.total_readings).sum(),
            average_battery: average(|d| d.battery_level),
            average_signal: average(|d| d.signal_strength),
        }
    }
}

/// "3d ago", "5h ago", "12m ago", "Just now" or "Never".
pub fn last_seen(last_seen: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(seen) = last_seen.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) else {
        return "Never".to_owned();
    };
    let minutes = (now - seen.with_timezone(&Utc)).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_owned()
    }
}

/// Folds the flat interval/threshold inputs into `configuration`, falling
/// back to the device defaults for blanks.
fn normalize_device(mut values: FormValues) -> ConsoleResult<FormValues> {
    for key in ["farm", "device_type"]
        .iter()
        .chain(CONFIG_KEYS.iter())
        .chain(THRESHOLD_KEYS.iter())
    {
        to_number(&mut values, key)?;
    }

    let defaults = serde_json::to_value(DeviceConfiguration::default())?;
    let mut configuration = Map::new();
    for key in CONFIG_KEYS {
        let value = match values.remove(key) {
            Some(Value::Null) | None => defaults[key].clone(),
            Some(v) => v,
        };
        configuration.insert(key.to_owned(), value);
    }
    let mut thresholds = Map::new();
    for key in THRESHOLD_KEYS {
        let value = match values.remove(key) {
            Some(Value::Null) | None => defaults["alert_thresholds"][key].clone(),
            Some(v) => v,
        };
        thresholds.insert(key.to_owned(), value);
    }
    configuration.insert("alert_thresholds".to_owned(), Value::Object(thresholds));
    values.insert("configuration".to_owned(), Value::Object(configuration));
    Ok(values)
}

/// Lifts `configuration` back into the flat inputs of the edit form.
fn flatten_configuration(mut row: Value) -> Value {
    let configuration = row.get("configuration").cloned().unwrap_or(Value::Null);
    if let Some(fields) = row.as_object_mut() {
        for key in CONFIG_KEYS {
            fields.insert(key.to_owned(), configuration[key].clone());
        }
        for key in THRESHOLD_KEYS {
            fields.insert(key.to_owned(), configuration["alert_thresholds"][key].clone());
        }
    }
    row
}

pub fn spec() -> ResourceSpec<Device> {
    let kind = ResourceKind::Devices;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("name", "Name"),
            Column::new("serial_number", "Serial"),
            Column::new("farm", "Farm").render(|d: &Device| d.farm.label()),
            Column::new("device_type", "Type").render(|d: &Device| d.device_type.label()),
            Column::new("status", "Status"),
            Column::new("is_online", "Online").render(|d: &Device| {
                String::from(if d.is_online { "Online" } else { "Offline" })
            }),
            Column::new("last_seen", "Last Seen")
                .render(|d: &Device| last_seen(d.last_seen.as_deref(), Utc::now())),
            Column::new("battery_level", "Battery").render(|d: &Device| {
                d.battery_level
                    .map(|b| format!("{}%", b.round()))
                    .unwrap_or_default()
            }),
        ])
        .fields(vec![
            Field::text("farm", "Farm").required().placeholder("Select farm"),
            Field::text("device_type", "Device Type")
                .required()
                .placeholder("Select device type"),
            Field::text("name", "Device Name").required(),
            Field::text("serial_number", "Serial Number").required(),
            Field::text("firmware_version", "Firmware Version"),
            Field::select(
                "status",
                "Status",
                &[
                    ("ACTIVE", "Active"),
                    ("INACTIVE", "Inactive"),
                    ("MAINTENANCE", "Maintenance"),
                    ("ERROR", "Error"),
                ],
            ),
            Field::text("ip_address", "IP Address"),
            Field::text("mac_address", "MAC Address"),
            Field::number("sampling_interval", "Sampling Interval (seconds)"),
            Field::number(
                "data_transmission_interval",
                "Data Transmission Interval (seconds)",
            ),
            Field::number("temperature_min", "Min Temperature (°C)"),
            Field::number("temperature_max", "Max Temperature (°C)"),
            Field::number("humidity_min", "Min Humidity (%)"),
            Field::number("humidity_max", "Max Humidity (%)"),
        ])
        .normalize_in(Arc::new(normalize_device))
        .prefill(flatten_configuration)
        .lookups(vec![
            Lookup::of::<NamedRef>("farm", ResourceKind::Farms.endpoint()),
            Lookup::of::<DeviceType>("device_type", DEVICE_TYPES_ENDPOINT),
        ])
}

pub struct DevicesPage {
    manager: ResourceManager<Device>,
}

impl DevicesPage {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            manager: ResourceManager::new(spec(), backend),
        }
    }

    pub fn manager(&self) -> &ResourceManager<Device> {
        &self.manager
    }

    pub async fn visible(&self, query: &str, filter: &DeviceFilter) -> Vec<Device> {
        self.manager
            .filtered("", |d| filter.keep(d) && search_matches(d, query))
            .await
    }

    pub async fn table(&self, query: &str, filter: &DeviceFilter) -> Table {
        let rows = self.visible(query, filter).await;
        self.manager.table_of(&rows)
    }

    /// Statistics over every loaded device, ignoring search and filters.
    pub async fn stats(&self) -> DeviceStats {
        DeviceStats::of(&self.manager.rows().await)
    }

    /// `ACTIVE` becomes `INACTIVE`, anything else becomes `ACTIVE`.
    pub async fn toggle_status(&self, id: Id) -> ConsoleResult<DeviceStatus> {
        let device = self
            .manager
            .row(id)
            .await
            .ok_or_else(|| ConsoleError::NotFound(ResourceKind::Devices.item().to_owned(), id))?;
        let next = device.status.toggled();
        self.manager
            .set_status(ResourceKind::Devices.endpoint(), id, next.as_str())
            .await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use api::memory::MemoryBackend;
    use chrono::Duration;
    use managers::FieldKind;
    use serde_json::json;

    use super::*;

    fn sample(id: Id, status: &str, online: bool) -> Value {
        json!({
            "id": id,
            "farm": {"id": 1, "name": "Hill farm"},
            "device_type": {"id": 2, "name": "THS-100"},
            "name": format!("Coop sensor {}", id),
            "serial_number": format!("SN-{:04}", id),
            "mac_address": format!("AA:BB:CC:00:00:{:02X}", id),
            "ip_address": format!("10.0.0.{}", id),
            "status": status,
            "is_online": online,
            "total_readings": 10 * id,
            "battery_level": 20.0 * id as f64,
        })
    }

    async fn page() -> (Arc<MemoryBackend>, DevicesPage) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("devices/", sample(1, "ACTIVE", true));
        backend.insert("devices/", sample(2, "ACTIVE", false));
        backend.insert("devices/", sample(3, "MAINTENANCE", true));
        let page = DevicesPage::new(backend.clone());
        page.manager().refresh().await.unwrap();
        (backend, page)
    }

    fn ids(devices: &[Device]) -> Vec<Id> {
        devices.iter().map(|d| d.id).collect()
    }

    #[test]
    fn status_flag_is_case_insensitive() {
        assert_eq!(StatusFilter::from("active"), StatusFilter::Is(DeviceStatus::Active));
        assert_eq!(StatusFilter::from("All"), StatusFilter::All);
        assert_eq!(
            StatusFilter::from("retired"),
            StatusFilter::Is(DeviceStatus::Other("RETIRED".to_owned()))
        );
    }

    #[tokio::test]
    async fn farms_and_types_become_selects() {
        let (backend, page) = page().await;
        backend.insert("farms/", json!({"id": 4, "name": "Valley farm"}));
        backend.insert(DEVICE_TYPES_ENDPOINT, json!({"id": 2, "name": "THS-100"}));
        page.manager().load_lookups().await;

        let fields = page.manager().fields().await;
        assert_eq!(
            fields[0].kind,
            FieldKind::Select(vec![("4".to_owned(), "Valley farm".to_owned())])
        );
        assert_eq!(
            fields[1].kind,
            FieldKind::Select(vec![("2".to_owned(), "THS-100".to_owned())])
        );

        page.manager().open_create().await;
        let form = page.manager().modal().await;
        assert_eq!(form.values().unwrap()["farm"], json!(""));

        for (name, value) in [
            ("farm", "4"),
            ("device_type", "2"),
            ("name", "Brooder sensor"),
            ("serial_number", "SN-0099"),
        ] {
            page.manager().set_field(name, value).await.unwrap();
        }
        page.manager().submit().await.unwrap();
        let created = backend
            .rows("devices/")
            .into_iter()
            .find(|d| d["serial_number"] == json!("SN-0099"))
            .unwrap();
        assert_eq!(created["farm"], json!(4));
        assert_eq!(created["device_type"], json!(2));
    }

    #[tokio::test]
    async fn failed_lookup_keeps_the_id_input() {
        let (backend, page) = page().await;
        backend.insert("farms/", json!({"id": 4, "name": "Valley farm"}));
        backend.fail_once("GET", DEVICE_TYPES_ENDPOINT, 500, None);
        page.manager().load_lookups().await;

        let fields = page.manager().fields().await;
        assert!(matches!(fields[0].kind, FieldKind::Select(_)));
        assert_eq!(fields[1].kind, FieldKind::Text);
        assert_eq!(page.manager().error().await, None);
    }

    #[tokio::test]
    async fn devices_with_null_columns_still_list() {
        let backend = Arc::new(MemoryBackend::new());
        let mut device = sample(1, "ACTIVE", true);
        device["ip_address"] = Value::Null;
        device["mac_address"] = Value::Null;
        device["battery_level"] = json!("87.50");
        device["signal_strength"] = Value::Null;
        backend.insert("devices/", device);

        let page = DevicesPage::new(backend);
        page.manager().refresh().await.unwrap();
        let rows = page.visible("", &DeviceFilter::default()).await;
        assert_eq!(ids(&rows), [1]);
        assert_eq!(rows[0].ip_address, "");
        assert_eq!(rows[0].battery_level, Some(87.5));
        assert_eq!(rows[0].signal_strength, None);
    }

    #[tokio::test]
    async fn status_and_online_filters_combine() {
        let (_, page) = page().await;
        let filter = DeviceFilter {
            status: StatusFilter::from("ACTIVE"),
            online: OnlineFilter::Online,
        };
        let rows = page.visible("", &filter).await;
        assert_eq!(ids(&rows), vec![1]);
        assert!(rows
            .iter()
            .all(|d| d.status == DeviceStatus::Active && d.is_online));

        let offline = DeviceFilter {
            online: OnlineFilter::try_from("offline").unwrap(),
            ..Default::default()
        };
        assert_eq!(ids(&page.visible("", &offline).await), vec![2]);
        assert_eq!(page.visible("", &DeviceFilter::default()).await.len(), 3);
    }

    #[tokio::test]
    async fn search_covers_network_identity() {
        let (_, page) = page().await;
        let all = DeviceFilter::default();
        assert_eq!(ids(&page.visible("aa:bb:cc:00:00:03", &all).await), vec![3]);
        assert_eq!(ids(&page.visible("10.0.0.2", &all).await), vec![2]);
        assert_eq!(page.visible("hill", &all).await.len(), 3);
        assert_eq!(page.visible("ths", &all).await.len(), 3);
        assert!(page.visible("maintenance", &all).await.is_empty());
        assert_eq!(page.table("sn-0001", &all).await.ids(), vec![1]);
    }

    #[tokio::test]
    async fn fleet_statistics() {
        let (_, page) = page().await;
        let stats = page.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.online, 2);
        assert_eq!(stats.offline, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.total_readings, 60);
        assert_eq!(stats.average_battery, 40.0);
        assert_eq!(stats.average_signal, 0.0);
        assert_eq!(DeviceStats::of(&[]), DeviceStats::default());
    }

    #[tokio::test]
    async fn toggle_flips_active_and_inactive() {
        let (backend, page) = page().await;
        assert_eq!(page.toggle_status(1).await.unwrap(), DeviceStatus::Inactive);
        assert_eq!(page.toggle_status(3).await.unwrap(), DeviceStatus::Active);
        assert!(backend.requests().await.contains(&"PATCH devices/1/".to_owned()));

        let rows = page.manager().rows().await;
        assert_eq!(rows[0].status, DeviceStatus::Inactive);
        assert_eq!(rows[2].status, DeviceStatus::Active);

        let toasts = page.manager().take_notifications().await;
        assert_eq!(toasts[0].description, "Device inactive successfully");

        assert!(matches!(
            page.toggle_status(42).await,
            Err(ConsoleError::NotFound(_, 42))
        ));
    }

    #[tokio::test]
    async fn configuration_round_trips_through_the_form() {
        let (backend, page) = page().await;
        let manager = page.manager();

        manager.open_create().await;
        for (name, value) in [
            ("farm", "1"),
            ("device_type", "2"),
            ("name", "Brooder thermometer"),
            ("serial_number", "SN-0099"),
            ("sampling_interval", "60"),
            ("temperature_max", "38.5"),
        ] {
            manager.set_field(name, value).await.unwrap();
        }
        manager.submit().await.unwrap();

        let created = backend
            .rows("devices/")
            .into_iter()
            .find(|d| d["name"] == json!("Brooder thermometer"))
            .unwrap();
        assert_eq!(created["status"], json!("ACTIVE"));
        assert_eq!(created["configuration"]["sampling_interval"], json!(60));
        assert_eq!(created["configuration"]["data_transmission_interval"], json!(3600));
        assert_eq!(created["configuration"]["alert_thresholds"]["temperature_max"], json!(38.5));
        assert_eq!(created["configuration"]["alert_thresholds"]["humidity_min"], json!(40.0));
        assert!(created.get("sampling_interval").is_none());

        let id = created["id"].as_i64().unwrap();
        manager.open_edit(id).await.unwrap();
        let modal = manager.modal().await;
        let values = modal.values().unwrap();
        assert_eq!(values["sampling_interval"], json!(60));
        assert_eq!(values["temperature_max"], json!(38.5));
        assert_eq!(values["farm"], json!(1));
    }

    #[test]
    fn last_seen_humanised() {
        let now = Utc::now();
        let ago = |d: Duration| Some((now - d).to_rfc3339());
        assert_eq!(last_seen(ago(Duration::days(3)).as_deref(), now), "3d ago");
        assert_eq!(last_seen(ago(Duration::hours(5)).as_deref(), now), "5h ago");
        assert_eq!(last_seen(ago(Duration::minutes(12)).as_deref(), now), "12m ago");
        assert_eq!(last_seen(ago(Duration::seconds(20)).as_deref(), now), "Just now");
        assert_eq!(last_seen(None, now), "Never");
        assert_eq!(last_seen(Some("yesterday"), now), "Never");
    }
}
