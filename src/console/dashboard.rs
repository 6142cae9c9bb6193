use serde::Serialize;
use tracing::debug;

use crate::console::view::{render_table, OutputFormat, ViewState};
use crate::error::TransportError;
use crate::repository::Repository;

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    /// Listings currently active
    pub garage_sales: usize,
    pub total_listings: usize,
    pub total_admins: usize,
}

impl DashboardStats {
    pub async fn fetch(repo: &Repository) -> Result<Self, TransportError> {
        debug!("Fetching stats...");
        Ok(Self {
            total_users: repo.count_users().await?,
            garage_sales: repo.count_active_listings().await?,
            total_listings: repo.count_listings().await?,
            total_admins: repo.count_admins().await?,
        })
    }
}

pub struct Dashboard {
    pub state: ViewState<DashboardStats>,
}

impl Dashboard {
    pub async fn load(repo: &Repository) -> Self {
        let state = ViewState::from_result(
            DashboardStats::fetch(repo).await,
            "Failed to load dashboard stats. Please check your permissions.",
        );
        Self { state }
    }

    pub fn render(&self, format: OutputFormat) -> String {
        if format == OutputFormat::Json {
            return self.state.to_json();
        }

        // Counts fall back to zero next to the inline error
        let (stats, error) = match &self.state {
            ViewState::Loaded(stats) => (stats.clone(), None),
            ViewState::Failed(message) => (DashboardStats::default(), Some(message)),
        };

        let rows = [
            ("Total Users", stats.total_users),
            ("Garage Sales", stats.garage_sales),
            ("Total Items", stats.total_listings),
            ("Admin Users", stats.total_admins),
        ]
        .iter()
        .map(|(title, value)| vec![title.to_string(), value.to_string()])
        .collect::<Vec<_>>();

        let mut out = String::from("Dashboard\n\n");
        if let Some(message) = error {
            out.push_str(&format!("error: {message}\n\n"));
        }
        out.push_str(&render_table(&["Stat", "Value"], &rows));
        out
    }
}
