//! PostgreSQL-backed registration store.

mod registration;

pub use registration::PostgresRegistrationStore;
