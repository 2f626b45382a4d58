//! Persistence seams. Each store is a trait carried in `AppState` as `Arc<dyn …>`,
//! backed by PostgreSQL in production and by in-memory maps in tests.

pub mod applications;
pub mod jobs;
#[cfg(test)]
pub mod memory;
pub mod tokens;

pub use applications::{ApplicationStore, PgApplicationStore};
pub use jobs::{JobStore, PgJobStore};
pub use tokens::{PgTokenStore, TokenStore};
