//! Admin console for the garage sale listings platform.
//!
//! Operators sign in through Firebase Authentication, browse users and listings in
//! Cloud Firestore, promote users to admin through a callable function and seed the
//! store with synthetic listings.

pub mod admin;
pub mod config;
pub mod console;
pub mod error;
pub mod generator;
pub mod geocode;
pub mod identity;
pub mod models;
pub mod repository;
pub mod store;
pub mod subscription;

pub use admin::AdminService;
pub use config::Config;
pub use generator::DummyDataGenerator;
pub use identity::{AdminStatus, IdentityGate};
pub use repository::Repository;
