use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeliApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("No valid token: {0}")]
    NoValidToken(String),
    #[error("Could not read or persist the token record: {0}")]
    TokenStore(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
