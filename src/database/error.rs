use thiserror::Error;

/// Errores del gateway de datos
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// No se pudo crear o tomar el handle de conexión
    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    /// La consulta falló; la conexión sigue siendo utilizable
    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to register query metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
