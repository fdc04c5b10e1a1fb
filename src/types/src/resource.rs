use std::fmt;

/// Every collection the admin shell links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Farmers,
    Farms,
    Devices,
    BreedTypes,
    Breeds,
    ActivityTypes,
    ConditionTypes,
    FoodTypes,
    SensorTypes,
    Batches,
    Activities,
    Readings,
    Subscriptions,
    SubscriptionTypes,
    Resources,
    Payments,
    HealthConditions,
    Recommendations,
    DiseaseExceptions,
    Anomalies,
    Medications,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 22] = [
        ResourceKind::Users,
        ResourceKind::Farmers,
        ResourceKind::Farms,
        ResourceKind::Devices,
        ResourceKind::BreedTypes,
        ResourceKind::Breeds,
        ResourceKind::ActivityTypes,
        ResourceKind::ConditionTypes,
        ResourceKind::FoodTypes,
        ResourceKind::SensorTypes,
        ResourceKind::Batches,
        ResourceKind::Activities,
        ResourceKind::Readings,
        ResourceKind::Subscriptions,
        ResourceKind::SubscriptionTypes,
        ResourceKind::Resources,
        ResourceKind::Payments,
        ResourceKind::HealthConditions,
        ResourceKind::Recommendations,
        ResourceKind::DiseaseExceptions,
        ResourceKind::Anomalies,
        ResourceKind::Medications,
    ];

    /// Path segment under `/admin`.
    pub fn slug(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Farmers => "farmers",
            ResourceKind::Farms => "farms",
            ResourceKind::Devices => "devices",
            ResourceKind::BreedTypes => "breed-types",
            ResourceKind::Breeds => "breeds",
            ResourceKind::ActivityTypes => "activity-types",
            ResourceKind::ConditionTypes => "condition-types",
            ResourceKind::FoodTypes => "food-types",
            ResourceKind::SensorTypes => "sensor-types",
            ResourceKind::Batches => "batches",
            ResourceKind::Activities => "activities",
            ResourceKind::Readings => "readings",
            ResourceKind::Subscriptions => "subscriptions",
            ResourceKind::SubscriptionTypes => "subscription-types",
            ResourceKind::Resources => "resources",
            ResourceKind::Payments => "payments",
            ResourceKind::HealthConditions => "health-conditions",
            ResourceKind::Recommendations => "recommendations",
            ResourceKind::DiseaseExceptions => "disease-exceptions",
            ResourceKind::Anomalies => "anomalies",
            ResourceKind::Medications => "medications",
        }
    }

    /// Backend collection endpoint, relative to the api root.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Activities => "batch-activities/",
            ResourceKind::Subscriptions => "farmer-subscriptions/",
            ResourceKind::Users => "users/",
            ResourceKind::Farmers => "farmers/",
            ResourceKind::Farms => "farms/",
            ResourceKind::Devices => "devices/",
            ResourceKind::BreedTypes => "breed-types/",
            ResourceKind::Breeds => "breeds/",
            ResourceKind::ActivityTypes => "activity-types/",
            ResourceKind::ConditionTypes => "condition-types/",
            ResourceKind::FoodTypes => "food-types/",
            ResourceKind::SensorTypes => "sensor-types/",
            ResourceKind::Batches => "batches/",
            ResourceKind::Readings => "readings/",
            ResourceKind::SubscriptionTypes => "subscription-types/",
            ResourceKind::Resources => "resources/",
            ResourceKind::Payments => "payments/",
            ResourceKind::HealthConditions => "health-conditions/",
            ResourceKind::Recommendations => "recommendations/",
            ResourceKind::DiseaseExceptions => "disease-exceptions/",
            ResourceKind::Anomalies => "anomalies/",
            ResourceKind::Medications => "medications/",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Users => "Users",
            ResourceKind::Farmers => "Farmers",
            ResourceKind::Farms => "Farms",
            ResourceKind::Devices => "Devices",
            ResourceKind::BreedTypes => "Breed Types",
            ResourceKind::Breeds => "Breeds",
            ResourceKind::ActivityTypes => "Activity Types",
            ResourceKind::ConditionTypes => "Condition Types",
            ResourceKind::FoodTypes => "Food Types",
            ResourceKind::SensorTypes => "Sensor Types",
            ResourceKind::Batches => "Batches",
            ResourceKind::Activities => "Activities",
            ResourceKind::Readings => "Readings",
            ResourceKind::Subscriptions => "Subscriptions",
            ResourceKind::SubscriptionTypes => "Subscription Types",
            ResourceKind::Resources => "Resources",
            ResourceKind::Payments => "Payments",
            ResourceKind::HealthConditions => "Health Conditions",
            ResourceKind::Recommendations => "Recommendations",
            ResourceKind::DiseaseExceptions => "Disease Exceptions",
            ResourceKind::Anomalies => "Anomalies",
            ResourceKind::Medications => "Medications",
        }
    }

    /// Singular, as used in toasts.
    pub fn item(&self) -> &'static str {
        match self {
            ResourceKind::Users => "User",
            ResourceKind::Farmers => "Farmer",
            ResourceKind::Farms => "Farm",
            ResourceKind::Devices => "Device",
            ResourceKind::BreedTypes => "Breed Type",
            ResourceKind::Breeds => "Breed",
            ResourceKind::ActivityTypes => "Activity Type",
            ResourceKind::ConditionTypes => "Condition Type",
            ResourceKind::FoodTypes => "Food Type",
            ResourceKind::SensorTypes => "Sensor Type",
            ResourceKind::Batches => "Batch",
            ResourceKind::Activities => "Activity",
            ResourceKind::Readings => "Reading",
            ResourceKind::Subscriptions => "Subscription",
            ResourceKind::SubscriptionTypes => "Subscription Type",
            ResourceKind::Resources => "Resource",
            ResourceKind::Payments => "Payment",
            ResourceKind::HealthConditions => "Health Condition",
            ResourceKind::Recommendations => "Recommendation",
            ResourceKind::DiseaseExceptions => "Disease Exception",
            ResourceKind::Anomalies => "Anomaly",
            ResourceKind::Medications => "Medication",
        }
    }

    /// Lookup tables, as opposed to transactional collections.
    pub fn is_master_data(&self) -> bool {
        matches!(
            self,
            ResourceKind::BreedTypes
                | ResourceKind::Breeds
                | ResourceKind::ActivityTypes
                | ResourceKind::ConditionTypes
                | ResourceKind::FoodTypes
                | ResourceKind::SensorTypes
                | ResourceKind::SubscriptionTypes
                | ResourceKind::Resources
                | ResourceKind::Payments
                | ResourceKind::HealthConditions
                | ResourceKind::Recommendations
                | ResourceKind::DiseaseExceptions
                | ResourceKind::Anomalies
                | ResourceKind::Medications
        )
    }

    pub fn from_slug(slug: &str) -> Option<ResourceKind> {
        ResourceKind::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn admin_path(&self) -> String {
        format!("/admin/{}", self.slug())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}
