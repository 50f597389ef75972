pub mod fixture;
mod store;

pub use fixture::{load_cases, load_store, parse_cases, seed_store, LoadError, RecordError};
pub use store::{CaseStore, CaseUpdate, StoreError};
