use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not authenticate against the catalog service: {0}")]
    AuthFailed(String),
    #[error("Could not read or persist the catalog session record: {0}")]
    SessionStore(String),
    #[error("Invalid SOAP response: {0}")]
    ResponseError(String),
    #[error("Could not parse catalog XML: {0}")]
    XmlError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
