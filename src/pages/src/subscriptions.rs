//! Farmer subscriptions with billing statistics.

use std::sync::Arc;

use api::Backend;
use chrono::{DateTime, NaiveDate, Utc};
use common::error::{ConsoleError, ConsoleResult};
use managers::{form::numeric, Column, Field, Lookup, ResourceManager, ResourceSpec, Table};
use types::{
    resource::ResourceKind,
    subscription::{PaymentStatus, Subscription, SubscriptionStatus, SubscriptionType},
    user::Farmer,
    Id,
};

/// Status toggles go to `subscriptions/{id}/` although the list lives at
/// `farmer-subscriptions/`; kept as the backend currently serves it.
pub const STATUS_ENDPOINT: &str = "subscriptions/";

/// `$1,234.50`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Whole days until `end_date` (`YYYY-MM-DD`), rounded up; negative once it
/// has passed. `None` when the date does not parse.
pub fn days_remaining(end_date: &str, now: DateTime<Utc>) -> Option<i64> {
    let end = NaiveDate::parse_from_str(end_date.get(..10)?, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let seconds = (end - now).num_seconds();
    Some(seconds.div_euclid(86_400) + i64::from(seconds.rem_euclid(86_400) > 0))
}

fn farmer_email(s: &Subscription) -> String {
    s.farmer
        .expanded()
        .map(|f| f.user.email.clone())
        .unwrap_or_default()
}

/// Search over farmer name and email, plan name and status.
pub fn search_matches(s: &Subscription, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let (first, last) = s
        .farmer
        .expanded()
        .map(|f| (f.user.first_name.clone(), f.user.last_name.clone()))
        .unwrap_or_default();
    [
        first,
        last,
        farmer_email(s),
        s.subscription_type.label(),
        s.status.to_string(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub revenue: f64,
    pub pending_payments: usize,
    pub auto_renew: usize,
}

impl SubscriptionStats {
    pub fn of(subscriptions: &[Subscription]) -> Self {
        let count = |f: fn(&Subscription) -> bool| subscriptions.iter().filter(|s| f(s)).count();
        Self {
            total: subscriptions.len(),
            active: count(|s| s.status == SubscriptionStatus::Active),
            expired: count(|s| s.status == SubscriptionStatus::Expired),
            revenue: subscriptions.iter().map(|s| s.total_paid).sum(),
            pending_payments: count(|s| s.payment_status == PaymentStatus::Pending),
            auto_renew: count(|s| s.auto_renew),
        }
    }
}

pub fn spec() -> ResourceSpec<Subscription> {
    let kind = ResourceKind::Subscriptions;
    let statuses = [
        ("ACTIVE", "Active"),
        ("INACTIVE", "Inactive"),
        ("EXPIRED", "Expired"),
        ("PENDING", "Pending"),
        ("CANCELLED", "Cancelled"),
    ];
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("farmer", "Farmer").render(|s: &Subscription| s.farmer.label()),
            Column::new("email", "Email").render(farmer_email),
            Column::new("subscription_type", "Plan")
                .render(|s: &Subscription| s.subscription_type.label()),
            Column::new("status", "Status"),
            Column::new("payment_status", "Payment"),
            Column::new("total_paid", "Paid").render(|s: &Subscription| format_usd(s.total_paid)),
            Column::new("end_date", "Ends"),
            Column::new("days_remaining", "Days Left").render(|s: &Subscription| {
                days_remaining(&s.end_date, Utc::now())
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            }),
            Column::new("auto_renew", "Auto Renew").render(|s: &Subscription| {
                String::from(if s.auto_renew { "Yes" } else { "No" })
            }),
        ])
        .fields(vec![
            Field::text("farmer", "Farmer").required().placeholder("Select farmer"),
            Field::text("subscription_type", "Subscription Type")
                .required()
                .placeholder("Select subscription type"),
            Field::select("status", "Status", &statuses),
            Field::date("start_date", "Start Date").required(),
            Field::date("end_date", "End Date").required(),
            Field::checkbox("auto_renew", "Auto Renew"),
        ])
        .normalize_in(numeric(&["farmer", "subscription_type"], &[]))
        .lookups(vec![
            Lookup::of::<Farmer>("farmer", ResourceKind::Farmers.endpoint()),
            Lookup::of::<SubscriptionType>(
                "subscription_type",
                ResourceKind::SubscriptionTypes.endpoint(),
            ),
        ])
}

pub struct SubscriptionsPage {
    manager: ResourceManager<Subscription>,
}

impl SubscriptionsPage {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            manager: ResourceManager::new(spec(), backend),
        }
    }

    pub fn manager(&self) -> &ResourceManager<Subscription> {
        &self.manager
    }

    /// `status: None` shows every status.
    pub async fn visible(
        &self,
        query: &str,
        status: Option<&SubscriptionStatus>,
    ) -> Vec<Subscription> {
        self.manager
            .filtered("", |s| {
                status.map_or(true, |status| &s.status == status) && search_matches(s, query)
            })
            .await
    }

    pub async fn table(&self, query: &str, status: Option<&SubscriptionStatus>) -> Table {
        let rows = self.visible(query, status).await;
        self.manager.table_of(&rows)
    }

    pub async fn stats(&self) -> SubscriptionStats {
        SubscriptionStats::of(&self.manager.rows().await)
    }

    pub async fn toggle_status(&self, id: Id) -> ConsoleResult<SubscriptionStatus> {
        let subscription = self.manager.row(id).await.ok_or_else(|| {
            ConsoleError::NotFound(ResourceKind::Subscriptions.item().to_owned(), id)
        })?;
        let next = subscription.status.toggled();
        self.manager
            .set_status(STATUS_ENDPOINT, id, next.as_str())
            .await?;
        Ok(next)
    }
}
