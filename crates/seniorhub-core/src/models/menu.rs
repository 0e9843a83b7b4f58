use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCategory {
    DailyCare,
    Health,
    Communication,
    Settings,
}

/// A navigation tile on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: MenuCategory,
    pub enabled: bool,
}

/// Tiles shown on the dashboard, in display order.
pub fn dashboard_tiles() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: "medications",
            title: "Medications",
            description: "Manage your medication schedule",
            icon: "💊",
            category: MenuCategory::Health,
            enabled: true,
        },
        MenuItem {
            id: "appointments",
            title: "Appointments",
            description: "Upcoming doctor visits",
            icon: "📅",
            category: MenuCategory::Health,
            enabled: true,
        },
        MenuItem {
            id: "household",
            title: "Household",
            description: "Manage your household",
            icon: "🏠",
            category: MenuCategory::DailyCare,
            enabled: true,
        },
        MenuItem {
            id: "settings",
            title: "Settings",
            description: "App preferences",
            icon: "⚙️",
            category: MenuCategory::Settings,
            enabled: true,
        },
    ]
}
