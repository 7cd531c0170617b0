// MySQL backend, built on the synchronous `mysql` driver.
//
// - config: connecting from `Configs`
// - connection: execute / cursor access on one connection
// - params: parameter conversion from `RowValues`
// - query: the row cursor and wire-type naming

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::open;
pub use connection::MysqlConnection;
pub use params::Params;
pub use query::{MysqlCursor, type_name_for};
