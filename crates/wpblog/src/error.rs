#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid content origin: {0}")]
    InvalidOrigin(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
