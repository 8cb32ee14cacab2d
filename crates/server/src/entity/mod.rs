//! SeaORM entities for the tables this service reads and writes.

pub mod user;
