//! Fixed vocabularies the generator samples from.

/// Placeholder identity that owns generated listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedUser {
    pub uid: &'static str,
    pub display_name: &'static str,
    pub email: &'static str,
}

pub const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        uid: "dummy1",
        display_name: "Sarah Johnson",
        email: "sarah.j@example.com",
    },
    SeedUser {
        uid: "dummy2",
        display_name: "Mike Thompson",
        email: "mike.t@example.com",
    },
    SeedUser {
        uid: "dummy3",
        display_name: "Emma Wilson",
        email: "emma.w@example.com",
    },
];

/// Latitude/longitude box generated coordinates fall into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl Bounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }
}

/// Sydney metro area, approximately
pub const SYDNEY_BOUNDS: Bounds = Bounds {
    north: -33.4489,
    south: -34.1706,
    west: 150.5209,
    east: 151.3430,
};

/// Named area used when a coordinate can't be resolved to a real address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub postcode: &'static str,
    pub state: &'static str,
}

pub const SYDNEY_REGIONS: [Region; 5] = [
    Region {
        name: "North Shore",
        postcode: "2060",
        state: "NSW",
    },
    Region {
        name: "Eastern Suburbs",
        postcode: "2021",
        state: "NSW",
    },
    Region {
        name: "Inner West",
        postcode: "2042",
        state: "NSW",
    },
    Region {
        name: "Western Sydney",
        postcode: "2150",
        state: "NSW",
    },
    Region {
        name: "Northern Beaches",
        postcode: "2100",
        state: "NSW",
    },
];

/// Sale categories with the items each one offers
pub const CATEGORIES: [(&str, [&str; 5]); 9] = [
    (
        "Furniture",
        ["Vintage Dining Table", "Leather Sofa", "Bookshelf", "Coffee Table", "Bed Frame"],
    ),
    (
        "Electronics",
        ["Old TV", "Stereo System", "Vintage Radio", "Computer Monitor", "Speakers"],
    ),
    (
        "Clothing",
        ["Designer Clothes", "Vintage Clothing", "Kids Clothes", "Shoes", "Accessories"],
    ),
    (
        "Books",
        ["Book Collection", "Textbooks", "Novels", "Comics", "Magazines"],
    ),
    (
        "Tools",
        ["Power Tools", "Hand Tools", "Garden Tools", "Tool Box", "Workbench"],
    ),
    (
        "Kitchen",
        ["Appliances", "Cookware", "Dishes", "Utensils", "Small Appliances"],
    ),
    (
        "Garden",
        ["Plants", "Pots", "Garden Furniture", "Lawn Mower", "Garden Decor"],
    ),
    (
        "Toys",
        ["Kids Toys", "Board Games", "Video Games", "Puzzles", "Outdoor Toys"],
    ),
    (
        "Sports",
        ["Exercise Equipment", "Sports Gear", "Bicycles", "Camping Gear", "Golf Clubs"],
    ),
];

pub const TAGS: [&str; 13] = [
    "vintage",
    "antique",
    "like-new",
    "collectible",
    "rare",
    "moving-sale",
    "estate-sale",
    "downsizing",
    "renovation",
    "must-go",
    "negotiable",
    "bulk-deals",
    "cheap",
];

/// Street name stems for synthesized addresses
pub const STREET_STEMS: [&str; 4] = ["Park", "Beach", "Forest", "Hill"];

pub const START_TIME: &str = "09:00";
pub const END_TIME: &str = "16:00";
