// SQLite backend, built on rusqlite.
//
// - config: opening a connection from `Configs`
// - connection: execute / cursor access on one connection
// - params: parameter conversion from `RowValues`
// - query: the row cursor and declared-type reporting

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{MAIN_SCHEMA, MEMORY_PATH, open};
pub use connection::SqliteConnection;
pub use params::Params;
pub use query::{SqliteCursor, declared_type_name};
