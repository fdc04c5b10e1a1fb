use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{farm::FarmerSummary, Id, Named, Record, Ref};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Expired,
    Pending,
    Cancelled,
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Inactive => "INACTIVE",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::Other(s) => s,
        }
    }

    pub fn toggled(&self) -> SubscriptionStatus {
        match self {
            SubscriptionStatus::Active => SubscriptionStatus::Inactive,
            _ => SubscriptionStatus::Active,
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => SubscriptionStatus::Active,
            "INACTIVE" => SubscriptionStatus::Inactive,
            "EXPIRED" => SubscriptionStatus::Expired,
            "PENDING" => SubscriptionStatus::Pending,
            "CANCELLED" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Other(value),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(value: SubscriptionStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
    Overdue,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Overdue => "OVERDUE",
            PaymentStatus::Other(s) => s,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PAID" => PaymentStatus::Paid,
            "PENDING" => PaymentStatus::Pending,
            "FAILED" => PaymentStatus::Failed,
            "OVERDUE" => PaymentStatus::Overdue,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SubscriptionType {
    pub id: Id,
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub duration_days: u32,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub features: Vec<String>,
}

impl Named for SubscriptionType {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: Id,
    pub farmer: Ref<FarmerSummary>,
    pub subscription_type: Ref<SubscriptionType>,
    pub status: SubscriptionStatus,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub auto_renew: bool,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub remaining_amount: f64,
    #[serde(default)]
    pub next_payment_date: Option<String>,
    #[serde(default, deserialize_with = "crate::de::number")]
    pub days_remaining: i64,
}

impl Record for Subscription {
    fn id(&self) -> Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_farmer_and_type() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": 11,
            "farmer": {"id": 2, "user": {"first_name": "Amina", "last_name": "Otieno", "email": "amina@example.com"}},
            "subscription_type": 4,
            "status": "EXPIRED",
            "start_date": "2024-01-01",
            "end_date": "2024-02-01",
            "payment_status": "PAID",
            "total_paid": 25.0
        }))
        .unwrap();
        assert_eq!(sub.farmer.label(), "Amina Otieno");
        assert_eq!(sub.subscription_type.id(), 4);
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(sub.payment_status, PaymentStatus::Paid);
        assert!(!sub.auto_renew);
    }

    #[test]
    fn statuses_round_trip_verbatim() {
        let s: SubscriptionStatus = serde_json::from_value(json!("expired")).unwrap();
        assert_eq!(s, SubscriptionStatus::Other("expired".to_owned()));
        assert_eq!(serde_json::to_value(&s).unwrap(), json!("expired"));

        let p: PaymentStatus = serde_json::from_value(json!("Paid")).unwrap();
        assert_eq!(p, PaymentStatus::Other("Paid".to_owned()));
        assert_eq!(serde_json::to_value(&p).unwrap(), json!("Paid"));
    }
}
