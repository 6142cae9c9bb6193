pub mod firebase;
pub mod gate;
pub mod traits;

pub use firebase::FirebaseIdentity;
pub use gate::{AdminStatus, AuthState, IdentityGate};
pub use traits::{Claims, Credential, IdentityProvider, Session, TokenSource};
