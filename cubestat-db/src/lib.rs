//! SQLite persistence layer for the results mirror.
//!
//! Provides schema creation, bulk-load operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, insert_continent, insert_country, insert_event, insert_person,
    set_metadata, upsert_average, upsert_single,
};
pub use queries::{
    StoreStats, find_person_by_id, find_persons_by_name, list_countries, list_events, metadata,
    nemeses_of, persons_by_ids, results_for_person, store_stats,
};
pub use schema::{
    SchemaError, create_indexes, create_schema, open_database, open_memory, open_readonly,
    verify_store,
};
