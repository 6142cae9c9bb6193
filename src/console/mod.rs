pub mod dashboard;
pub mod listings;
pub mod users;
pub mod view;

pub use dashboard::{Dashboard, DashboardStats};
pub use listings::{ListingRow, ListingsView};
pub use users::{UserRow, UsersView};
pub use view::{render_table, OutputFormat, ViewState};
