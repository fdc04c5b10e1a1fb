//! The admin navigation tree.

use std::fmt::Write;

use types::resource::ResourceKind;

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: Option<String>,
    pub badge: Option<&'static str>,
    pub children: Vec<NavItem>,
}

impl NavItem {
    fn link(label: &'static str, href: impl Into<String>) -> Self {
        Self {
            label,
            href: Some(href.into()),
            badge: None,
            children: vec![],
        }
    }

    fn resource(kind: ResourceKind) -> Self {
        Self::link(kind.title(), kind.admin_path())
    }

    fn group(label: &'static str, children: Vec<NavItem>) -> Self {
        Self {
            label,
            href: None,
            badge: None,
            children,
        }
    }

    fn badge(mut self, badge: &'static str) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Exact match on the path, ignoring a trailing slash.
    pub fn is_active(&self, path: &str) -> bool {
        self.href
            .as_deref()
            .is_some_and(|href| trim(href) == trim(path))
    }

    /// Whether this item or anything below it is the current page.
    pub fn contains_active(&self, path: &str) -> bool {
        self.is_active(path) || self.children.iter().any(|c| c.contains_active(path))
    }
}

fn trim(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

pub fn admin_nav() -> Vec<NavItem> {
    use ResourceKind::*;

    vec![
        NavItem::link("Dashboard", "/admin"),
        NavItem::group(
            "System Management",
            [Users, Farmers, Farms, Devices]
                .into_iter()
                .map(|kind| NavItem::resource(kind).badge("All"))
                .collect(),
        ),
        NavItem::group(
            "Master Data",
            [BreedTypes, Breeds, ActivityTypes, ConditionTypes, FoodTypes, SensorTypes]
                .into_iter()
                .map(NavItem::resource)
                .collect(),
        ),
        NavItem::group(
            "Farm Operations",
            [Batches, Activities, Readings]
                .into_iter()
                .map(NavItem::resource)
                .collect(),
        ),
        NavItem::group(
            "Subscriptions & Billing",
            vec![
                NavItem::link("All Subscriptions", Subscriptions.admin_path()),
                NavItem::resource(SubscriptionTypes),
                NavItem::resource(Resources),
                NavItem::resource(Payments),
            ],
        ),
        NavItem::group(
            "Knowledge Base",
            [HealthConditions, Recommendations, DiseaseExceptions, Anomalies, Medications]
                .into_iter()
                .map(NavItem::resource)
                .collect(),
        ),
        NavItem::link("Django Admin", "/admin/django-admin"),
    ]
}

/// Labels from the top of the tree down to the active item.
pub fn active_trail(items: &[NavItem], path: &str) -> Vec<&'static str> {
    for item in items {
        if item.is_active(path) {
            return vec![item.label];
        }
        let below = active_trail(&item.children, path);
        if !below.is_empty() {
            let mut trail = vec![item.label];
            trail.extend(below);
            return trail;
        }
    }
    vec![]
}

/// Indented text rendering with the active item starred.
pub fn render(items: &[NavItem], path: &str) -> String {
    let mut out = String::new();
    render_into(&mut out, items, path, 0);
    out
}

fn render_into(out: &mut String, items: &[NavItem], path: &str, depth: usize) {
    for item in items {
        let marker = if item.is_active(path) { "*" } else { " " };
        let _ = write!(out, "{}{} {}", "  ".repeat(depth), marker, item.label);
        if let Some(badge) = item.badge {
            let _ = write!(out, " [{}]", badge);
        }
        match &item.href {
            Some(href) => {
                let _ = writeln!(out, "  {}", href);
            }
            None => {
                let _ = writeln!(out);
                render_into(out, &item.children, path, depth + 1);
            }
        }
    }
}
