use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::console::view::{render_table, OutputFormat, ViewState};
use crate::error::{GenerationError, TransportError};
use crate::generator::DummyDataGenerator;
use crate::identity::Session;
use crate::models::{Listing, ListingStatus};
use crate::repository::Repository;

const NOT_AVAILABLE: &str = "N/A";

fn short_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub id: String,
    pub title: String,
    pub location: String,
    pub date_range: String,
    pub status: ListingStatus,
    pub views: u32,
    pub created: String,
}

impl From<Listing> for ListingRow {
    fn from(listing: Listing) -> Self {
        let location = listing
            .location
            .as_ref()
            .map(|l| format!("{}, {}", l.suburb, l.state))
            .unwrap_or_else(|| ", ".to_string());

        let event = listing.first_event();
        let start = short_date(event.map(|e| e.start_date));
        let date_range = if listing.is_multi_day {
            format!("{} - {}", start, short_date(event.map(|e| e.end_date)))
        } else {
            start
        };

        Self {
            location,
            date_range,
            created: short_date(listing.date_created),
            id: listing.id,
            title: listing.title,
            status: listing.status,
            views: listing.views,
        }
    }
}

/// Garage sale listings table
pub struct ListingsView {
    pub state: ViewState<Vec<ListingRow>>,
}

impl ListingsView {
    pub async fn load(repo: &Repository) -> Self {
        let listings = repo
            .list_listings()
            .await
            .map(|listings| listings.into_iter().map(ListingRow::from).collect());
        Self {
            state: ViewState::from_result(listings, "Error fetching listings"),
        }
    }

    pub async fn delete(&mut self, repo: &Repository, id: &str) -> Result<(), TransportError> {
        repo.delete_listing(id).await?;

        if let Some(rows) = self.state.loaded_mut() {
            rows.retain(|row| row.id != id);
        }
        Ok(())
    }

    /// Generate dummy listings, then reload the table
    pub async fn generate(
        &mut self,
        repo: &Repository,
        generator: &DummyDataGenerator,
        caller: Option<&Session>,
        count: usize,
    ) -> Result<Vec<Listing>, GenerationError> {
        let generated = generator.generate(caller, count).await?;
        *self = Self::load(repo).await;
        Ok(generated)
    }

    pub fn render(&self, format: OutputFormat) -> String {
        if format == OutputFormat::Json {
            return self.state.to_json();
        }

        let rows = match &self.state {
            ViewState::Loaded(rows) => rows,
            ViewState::Failed(message) => {
                return format!("Garage Sale Listings\n\nerror: {message}")
            }
        };

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.title.clone(),
                    row.location.clone(),
                    row.date_range.clone(),
                    row.status.as_str().to_string(),
                    row.views.to_string(),
                    row.created.clone(),
                ]
            })
            .collect();

        format!(
            "Garage Sale Listings\n\n{}",
            render_table(
                &["Id", "Title", "Location", "Date Range", "Status", "Views", "Created"],
                &cells
            )
        )
    }
}
