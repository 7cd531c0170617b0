use ::mysql::{Conn, OptsBuilder};

use crate::config::Configs;
use crate::error::SqlRecordsError;

use super::connection::MysqlConnection;

/// Connect to the server named by `configs`.
///
/// Schemaless mode connects without selecting a database.
///
/// # Errors
///
/// Returns `SqlRecordsError::ConfigError` for a bad port and
/// `SqlRecordsError::ConnectionError` if the server cannot be reached.
pub fn open(configs: &Configs, schemaless: bool) -> Result<MysqlConnection, SqlRecordsError> {
    let port = configs.port_number()?;
    let db_name = if schemaless || configs.database.is_empty() {
        None
    } else {
        Some(configs.database.clone())
    };
    let password = if configs.password.is_empty() {
        None
    } else {
        Some(configs.password.clone())
    };
    let opts = OptsBuilder::new()
        .ip_or_hostname(Some(configs.host.clone()))
        .tcp_port(port)
        .user(Some(configs.username.clone()))
        .pass(password)
        .db_name(db_name);
    let conn = Conn::new(opts).map_err(|e| {
        SqlRecordsError::ConnectionError(format!(
            "Failed to connect to {}: {e}",
            configs.redacted_connection_string(schemaless)
        ))
    })?;
    Ok(MysqlConnection::new(conn))
}
