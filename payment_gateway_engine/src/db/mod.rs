pub mod common;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;
