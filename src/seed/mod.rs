pub mod db_types;
pub mod operations;

pub use operations::seed_database;
