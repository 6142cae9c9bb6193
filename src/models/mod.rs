use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection holding user accounts
pub const USERS: &str = "users";
/// Collection holding garage sale listings
pub const LISTINGS: &str = "listings";
/// Collection holding per-listing view counters
pub const VIEWS: &str = "views";

/// Field names that hold timestamps in any collection, at any depth
pub const TIMESTAMP_FIELDS: [&str; 7] = [
    "createdAt",
    "lastLogin",
    "dateCreated",
    "lastUpdated",
    "startDate",
    "endDate",
    "lastViewed",
];

/// A platform user account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub listings: Vec<String>,
}

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Completed => "completed",
            ListingStatus::Cancelled => "cancelled",
            ListingStatus::Other => "other",
        }
    }
}

/// One opening window of a sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDate {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a sale takes place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingImage {
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Core garage sale listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Document id, attached on read and never stored as a field
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub author_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_dates: Vec<EventDate>,
    #[serde(default)]
    pub is_multi_day: bool,
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Listing {
    /// First event window, if the listing has one
    pub fn first_event(&self) -> Option<&EventDate> {
        self.event_dates.first()
    }
}

/// View counter kept alongside each listing in `views/{listingId}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub listing_id: String,
    pub count: u32,
    #[serde(default)]
    pub unique_visitors: Vec<String>,
    pub last_viewed: DateTime<Utc>,
}
