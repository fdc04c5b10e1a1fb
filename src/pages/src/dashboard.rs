//! Admin landing page counters.

use std::fmt;

use api::Backend;
use common::error::ConsoleResult;
use tracing::warn;
use types::{
    resource::ResourceKind,
    subscription::{Subscription, SubscriptionStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardSummary {
    pub users: usize,
    pub farmers: usize,
    pub farms: usize,
    pub devices: usize,
    pub active_subscriptions: usize,
}

fn or_zero(what: &str, result: ConsoleResult<usize>) -> usize {
    result.unwrap_or_else(|e| {
        warn!("counting {} failed: {}", what, e);
        0
    })
}

async fn active_subscriptions(backend: &dyn Backend) -> ConsoleResult<usize> {
    let rows: Vec<Subscription> =
        api::list(backend, ResourceKind::Subscriptions.endpoint()).await?;
    Ok(rows
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
        .count())
}

/// Fetches every counter at once. A failing counter shows as zero.
pub async fn load(backend: &dyn Backend) -> DashboardSummary {
    let (users, farmers, farms, devices, active) = futures::join!(
        api::count(backend, ResourceKind::Users.endpoint()),
        api::count(backend, ResourceKind::Farmers.endpoint()),
        api::count(backend, ResourceKind::Farms.endpoint()),
        api::count(backend, ResourceKind::Devices.endpoint()),
        active_subscriptions(backend),
    );
    DashboardSummary {
        users: or_zero("users", users),
        farmers: or_zero("farmers", farmers),
        farms: or_zero("farms", farms),
        devices: or_zero("devices", devices),
        active_subscriptions: or_zero("subscriptions", active),
    }
}

impl fmt::Display for DashboardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Users           {}", self.users)?;
        writeln!(f, "Farmers               {}", self.farmers)?;
        writeln!(f, "Farms                 {}", self.farms)?;
        writeln!(f, "Devices               {}", self.devices)?;
        write!(f, "Active Subscriptions  {}", self.active_subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use api::memory::MemoryBackend;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn counts_every_collection() {
        let backend = MemoryBackend::paged();
        for name in ["amina", "baraka", "chebet"] {
            backend.insert("users/", json!({"username": name, "role": "farmer"}));
        }
        backend.insert("farmers/", json!({"user": 1}));
        backend.insert("farms/", json!({"name": "Hill farm", "farmer": 1}));
        for status in ["ACTIVE", "EXPIRED", "ACTIVE"] {
            backend.insert(
                "farmer-subscriptions/",
                json!({"farmer": 1, "subscription_type": 1, "status": status,
                       "start_date": "2024-01-01", "end_date": "2024-12-31"}),
            );
        }

        let summary = load(&backend).await;
        assert_eq!(
            summary,
            DashboardSummary {
                users: 3,
                farmers: 1,
                farms: 1,
                devices: 0,
                active_subscriptions: 2,
            }
        );
        assert!(summary.to_string().contains("Active Subscriptions  2"));
    }

    #[tokio::test]
    async fn failures_count_as_zero() {
        let backend = MemoryBackend::new();
        backend.insert("farms/", json!({"name": "Hill farm", "farmer": 1}));
        backend.fail_once("GET", "users/", 500, None);
        backend.fail_once("GET", "farmer-subscriptions/", 403, Some("Forbidden"));

        let summary = load(&backend).await;
        assert_eq!(summary.users, 0);
        assert_eq!(summary.active_subscriptions, 0);
        assert_eq!(summary.farms, 1);
    }
}
