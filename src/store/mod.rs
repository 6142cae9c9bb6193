pub mod firestore;
pub mod memory;
pub mod traits;
pub mod types;
pub mod value;

pub use firestore::FirestoreClient;
pub use memory::MemoryStore;
pub use traits::DocumentStore;
pub use types::{to_fields, Direction, Document, Fields, Query, Write, WriteBatch};

use rand::{distributions::Alphanumeric, thread_rng, Rng};

const AUTO_ID_LENGTH: usize = 20;

/// Random 20 character alphanumeric document id
pub fn auto_id() -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(AUTO_ID_LENGTH)
        .collect()
}
