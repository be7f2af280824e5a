pub mod awards;
pub mod batch;
pub mod connection;
pub mod currency;
pub mod history;
pub mod leagues;
pub mod profiles;
pub mod recaps;
pub mod seasons;
pub mod setup;

pub use batch::{CommitStats, Mutation, commit};
pub use connection::{DbConn, DbPool, create_pool, get_connection};
