pub mod query;
pub mod store;
pub mod validation;

pub use query::ReadingQuery;
pub use store::ReadingStore;
pub use validation::NewReading;
