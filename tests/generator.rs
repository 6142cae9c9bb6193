mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use garage_admin::error::{AuthError, GenerationError};
use garage_admin::generator::{DummyDataGenerator, SYDNEY_BOUNDS};
use garage_admin::geocode::Geocoder;
use garage_admin::models::{Listing, ListingStatus, User, ViewStats, LISTINGS, USERS, VIEWS};
use garage_admin::store::{value, DocumentStore, MemoryStore};
use serde_json::json;

use common::{fields, session, store_with_operator, EmptyGeocoder, FixedGeocoder, SlowGeocoder};

const SEED_UIDS: [&str; 3] = ["dummy1", "dummy2", "dummy3"];

fn generator(store: &Arc<MemoryStore>, geocoder: Arc<dyn Geocoder>) -> DummyDataGenerator {
    DummyDataGenerator::new(store.clone(), geocoder).with_seed(42)
}

fn stored_user(store: &MemoryStore, uid: &str) -> User {
    store
        .documents(USERS)
        .into_iter()
        .find(|doc| doc.id == uid)
        .unwrap()
        .into_model("uid")
        .unwrap()
}

fn items(listing: &Listing) -> Vec<String> {
    listing
        .description
        .split(" and more!")
        .next()
        .unwrap()
        .split(", ")
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn admin_generates_exact_count_of_consistent_listings() {
    let store = store_with_operator("op", true);
    let listings = generator(&store, Arc::new(FixedGeocoder))
        .generate(Some(&session("op", true)), 5)
        .await
        .unwrap();

    assert_eq!(listings.len(), 5);
    assert_eq!(store.count(LISTINGS), 5);
    assert_eq!(store.count(VIEWS), 5);

    for listing in &listings {
        assert!(!listing.id.is_empty());
        assert!(SEED_UIDS.contains(&listing.author_id.as_str()));
        assert!(listing.views < 50);
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.categories.len(), 1);

        let event = listing.first_event().unwrap();
        if !listing.is_multi_day {
            assert_eq!(event.end_date, event.start_date);
        } else {
            assert!(event.end_date > event.start_date);
        }

        let tags: HashSet<_> = listing.tags.iter().collect();
        assert_eq!(listing.tags.len(), 3);
        assert_eq!(tags.len(), 3);

        let items = items(listing);
        let distinct: HashSet<_> = items.iter().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(distinct.len(), 3);

        let location = listing.location.as_ref().unwrap();
        assert_eq!(location.address, "12 George St");
        assert_eq!(location.suburb, "Sydney");
    }
}

#[tokio::test]
async fn listings_are_linked_to_authors_and_view_stats() {
    let store = store_with_operator("op", true);
    let listings = generator(&store, Arc::new(FixedGeocoder))
        .generate(Some(&session("op", true)), 8)
        .await
        .unwrap();

    for listing in &listings {
        let author = stored_user(&store, &listing.author_id);
        assert!(author.listings.contains(&listing.id));

        let stats: ViewStats = store
            .get(VIEWS, &listing.id)
            .await
            .unwrap()
            .unwrap()
            .into_model("listingId")
            .unwrap();
        assert_eq!(stats.listing_id, listing.id);
        assert_eq!(stats.count, listing.views);
        assert!(stats.unique_visitors.is_empty());

        let stored: Listing = store
            .get(LISTINGS, &listing.id)
            .await
            .unwrap()
            .unwrap()
            .into_model("id")
            .unwrap();
        assert_eq!(&stored, listing);
    }

    for uid in SEED_UIDS {
        let seed = stored_user(&store, uid);
        assert!(!seed.admin);
        assert!(seed.created_at.is_some());
    }
}

#[tokio::test]
async fn unresolvable_locations_fall_back_inside_the_box() {
    let cases: [(Arc<dyn Geocoder>, Duration); 2] = [
        (Arc::new(EmptyGeocoder), Duration::from_secs(5)),
        (Arc::new(SlowGeocoder), Duration::from_millis(20)),
    ];

    for (geocoder, timeout) in cases {
        let store = store_with_operator("op", true);
        let listings = generator(&store, geocoder)
            .with_geocode_timeout(timeout)
            .generate(Some(&session("op", true)), 3)
            .await
            .unwrap();

        for listing in listings {
            let location = listing.location.unwrap();
            assert!(location.address.ends_with(" Street"));
            assert!(!location.suburb.is_empty());
            assert_eq!(location.state, "NSW");
            assert!(!location.postcode.is_empty());
            assert!(SYDNEY_BOUNDS.contains(
                location.coordinates.latitude,
                location.coordinates.longitude
            ));
        }
    }
}

#[tokio::test]
async fn failed_commit_writes_nothing() {
    let store = store_with_operator("op", true);
    store.fail_commits("deadline exceeded");

    let result = generator(&store, Arc::new(EmptyGeocoder))
        .generate(Some(&session("op", true)), 4)
        .await;

    assert!(matches!(result, Err(GenerationError::Store(_))));
    assert_eq!(store.count(LISTINGS), 0);
    assert_eq!(store.count(VIEWS), 0);
    assert_eq!(store.count(USERS), 1);
}

#[tokio::test]
async fn non_admin_and_anonymous_callers_are_refused() {
    let store = store_with_operator("op", false);
    let generator = generator(&store, Arc::new(EmptyGeocoder));

    let result = generator.generate(Some(&session("op", false)), 2).await;
    assert!(matches!(result, Err(GenerationError::Auth(AuthError::NotAdmin))));

    // A claim alone is not enough without the admin flag on the user document
    let result = generator.generate(Some(&session("op", true)), 2).await;
    assert!(matches!(result, Err(GenerationError::Auth(AuthError::NotAdmin))));

    let result = generator.generate(None, 2).await;
    assert!(matches!(result, Err(GenerationError::Auth(AuthError::NotSignedIn))));

    assert_eq!(store.count(LISTINGS), 0);
    assert_eq!(store.count(VIEWS), 0);
    assert_eq!(store.count(USERS), 1);
}

#[tokio::test]
async fn zero_count_is_rejected() {
    let store = store_with_operator("op", true);
    let result = generator(&store, Arc::new(EmptyGeocoder))
        .generate(Some(&session("op", true)), 0)
        .await;

    assert!(matches!(result, Err(GenerationError::InvalidCount)));
    assert_eq!(store.count(USERS), 1);
}

#[tokio::test]
async fn rerun_keeps_earlier_seed_listings() {
    let store = store_with_operator("op", true);
    store.insert(
        USERS,
        "dummy1",
        fields(json!({
            "uid": "dummy1",
            "email": "sarah.j@example.com",
            "admin": false,
            "listings": ["older"],
        })),
    );

    let generator = generator(&store, Arc::new(EmptyGeocoder));
    let first = generator.generate(Some(&session("op", true)), 6).await.unwrap();
    let second = generator.generate(Some(&session("op", true)), 6).await.unwrap();

    assert_eq!(store.count(LISTINGS), 12);

    let owned: HashSet<String> = SEED_UIDS
        .iter()
        .flat_map(|uid| stored_user(&store, uid).listings)
        .collect();
    assert!(owned.contains("older"));
    for listing in first.iter().chain(&second) {
        assert!(owned.contains(&listing.id));
    }
}

#[tokio::test]
async fn generated_dates_are_stored_as_timestamps() {
    let store = store_with_operator("op", true);
    let listing = generator(&store, Arc::new(EmptyGeocoder))
        .generate(Some(&session("op", true)), 1)
        .await
        .unwrap()
        .remove(0);

    let listing_doc = store.get(LISTINGS, &listing.id).await.unwrap().unwrap();
    let encoded = value::encode_fields(&listing_doc.fields);
    assert!(encoded["dateCreated"]["timestampValue"].is_string());
    assert!(encoded["lastUpdated"]["timestampValue"].is_string());
    let event = &encoded["eventDates"]["arrayValue"]["values"][0]["mapValue"]["fields"];
    assert!(event["startDate"]["timestampValue"].is_string());
    assert!(event["endDate"]["timestampValue"].is_string());

    let stats_doc = store.get(VIEWS, &listing.id).await.unwrap().unwrap();
    let encoded = value::encode_fields(&stats_doc.fields);
    assert!(encoded["lastViewed"]["timestampValue"].is_string());

    let seed_doc = store.get(USERS, &listing.author_id).await.unwrap().unwrap();
    let encoded = value::encode_fields(&seed_doc.fields);
    assert!(encoded["createdAt"]["timestampValue"].is_string());
    assert!(encoded["lastLogin"]["timestampValue"].is_string());
}
