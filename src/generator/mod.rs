//! Synthetic garage sale listings for demos and testing.

pub mod location;
pub mod pools;
pub mod sampling;

pub use location::{LocationDraft, LocationResolver};
pub use pools::{SeedUser, SEED_USERS, SYDNEY_BOUNDS};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as Days, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{AuthError, GenerationError};
use crate::geocode::Geocoder;
use crate::identity::Session;
use crate::models::{EventDate, Listing, ListingStatus, User, ViewStats, LISTINGS, USERS, VIEWS};
use crate::store::{to_fields, DocumentStore, Fields, WriteBatch};
use pools::{CATEGORIES, END_TIME, START_TIME, TAGS};
use sampling::distinct_sample;

pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

const ITEMS_PER_LISTING: usize = 3;
const TAGS_PER_LISTING: usize = 3;
const MAX_START_OFFSET_DAYS: i64 = 14;
const MAX_VIEWS: u32 = 50;

/// Everything random about one listing, drawn in a single RNG pass
#[derive(Debug, Clone)]
struct ListingDraft {
    author: SeedUser,
    category: &'static str,
    items: Vec<&'static str>,
    is_multi_day: bool,
    start_offset_days: i64,
    extra_days: i64,
    location: LocationDraft,
    tags: Vec<&'static str>,
    views: u32,
    featured: bool,
}

impl ListingDraft {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let author = *SEED_USERS.choose(rng).unwrap_or(&SEED_USERS[0]);
        let (category, pool) = *CATEGORIES.choose(rng).unwrap_or(&CATEGORIES[0]);
        let items = distinct_sample(&pool, ITEMS_PER_LISTING, rng);
        let is_multi_day = rng.gen::<f64>() > 0.7;
        let start_offset_days = rng.gen_range(0..MAX_START_OFFSET_DAYS);
        let extra_days = rng.gen_range(1..=2);
        let location = LocationDraft::random(rng);
        let tags = distinct_sample(&TAGS, TAGS_PER_LISTING, rng);
        let views = rng.gen_range(0..MAX_VIEWS);
        let featured = rng.gen::<f64>() > 0.8;

        Self {
            author,
            category,
            items,
            is_multi_day,
            start_offset_days,
            extra_days,
            location,
            tags,
            views,
            featured,
        }
    }

    fn event_dates(&self, now: DateTime<Utc>) -> Vec<EventDate> {
        let start_date = now + Days::days(self.start_offset_days);
        let end_date = if self.is_multi_day {
            start_date + Days::days(self.extra_days)
        } else {
            start_date
        };

        vec![EventDate {
            start_date,
            end_date,
            start_time: START_TIME.to_string(),
            end_time: END_TIME.to_string(),
        }]
    }

    fn title(&self) -> String {
        format!("{}'s {} Sale", self.author.display_name, self.category)
    }

    fn description(&self) -> String {
        let suffix = if self.is_multi_day {
            "Multi-day sale!"
        } else {
            "One day only!"
        };
        format!("{} and more! {}", self.items.join(", "), suffix)
    }
}

/// Seeds the store with random, internally consistent listings.
///
/// All writes of one call go out in a single batch: either every listing, its view
/// stats and the authors' back-references land, or nothing does.
pub struct DummyDataGenerator {
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
    geocode_timeout: Duration,
    rng: Mutex<StdRng>,
}

impl DummyDataGenerator {
    pub fn new(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Generate and commit `count` listings on behalf of `caller`
    pub async fn generate(
        &self,
        caller: Option<&Session>,
        count: usize,
    ) -> Result<Vec<Listing>, GenerationError> {
        let result = self.try_generate(caller, count).await;
        match &result {
            Ok(listings) => info!("Successfully generated {} dummy listings", listings.len()),
            Err(e) => warn!("Error generating dummy listings: {}", e),
        }
        result
    }

    async fn try_generate(
        &self,
        caller: Option<&Session>,
        count: usize,
    ) -> Result<Vec<Listing>, GenerationError> {
        if count == 0 {
            return Err(GenerationError::InvalidCount);
        }
        self.verify_admin(caller).await?;

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        self.stage_seed_users(&mut batch, now).await?;

        let locations = LocationResolver::new(self.geocoder.clone(), self.geocode_timeout);
        let mut listings = Vec::with_capacity(count);
        for _ in 0..count {
            // The lock is released before the geocoding await
            let draft = ListingDraft::random(&mut *self.rng.lock());
            let location = locations.resolve(&draft.location).await;

            let listing = Listing {
                id: self.store.new_id(),
                author_id: draft.author.uid.to_string(),
                title: draft.title(),
                description: draft.description(),
                status: ListingStatus::Active,
                date_created: Some(now),
                event_dates: draft.event_dates(now),
                is_multi_day: draft.is_multi_day,
                location: Some(location),
                tags: draft.tags.iter().map(|tag| tag.to_string()).collect(),
                views: draft.views,
                images: Vec::new(),
                categories: vec![draft.category.to_string()],
                featured: draft.featured,
                last_updated: Some(now),
            };
            debug!("Staging listing {} for {}", listing.id, listing.author_id);

            stage_listing(&mut batch, &listing, now)?;
            listings.push(listing);
        }

        self.store.commit(batch).await?;
        Ok(listings)
    }

    /// The caller's own user document must carry the admin flag
    async fn verify_admin(&self, caller: Option<&Session>) -> Result<(), GenerationError> {
        let caller = caller.ok_or(AuthError::NotSignedIn)?;

        let user: Option<User> = match self.store.get(USERS, &caller.uid).await? {
            Some(doc) => Some(doc.into_model("uid")?),
            None => None,
        };

        match user {
            Some(user) if user.admin => Ok(()),
            _ => Err(AuthError::NotAdmin.into()),
        }
    }

    /// Upsert the seed users without clobbering fields they already have
    async fn stage_seed_users(
        &self,
        batch: &mut WriteBatch,
        now: DateTime<Utc>,
    ) -> Result<(), GenerationError> {
        for seed in SEED_USERS {
            let exists = self.store.get(USERS, seed.uid).await?.is_some();

            let mut fields = Fields::new();
            fields.insert("uid".into(), json!(seed.uid));
            fields.insert("displayName".into(), json!(seed.display_name));
            fields.insert("email".into(), json!(seed.email));
            fields.insert("lastLogin".into(), json!(now));
            if !exists {
                fields.insert("createdAt".into(), json!(now));
                fields.insert("admin".into(), json!(false));
                fields.insert("listings".into(), json!([]));
            }

            batch.set_merge(USERS, seed.uid, fields);
        }
        Ok(())
    }
}

/// Listing document, its view counter and the author's back-reference
fn stage_listing(
    batch: &mut WriteBatch,
    listing: &Listing,
    now: DateTime<Utc>,
) -> Result<(), GenerationError> {
    batch.set(LISTINGS, &listing.id, to_fields(listing, Some("id"))?);

    let stats = ViewStats {
        listing_id: listing.id.clone(),
        count: listing.views,
        unique_visitors: Vec::new(),
        last_viewed: now,
    };
    batch.set(VIEWS, &listing.id, to_fields(&stats, Some("listingId"))?);

    batch.array_union(
        USERS,
        &listing.author_id,
        "listings",
        vec![Value::String(listing.id.clone())],
    );
    Ok(())
}
