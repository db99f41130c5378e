use thiserror::Error;

/// Errors surfaced by order submission
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Venue rejected order: {0}")]
    VenueRejection(String),

    #[error("Venue unavailable: {0}")]
    VenueUnavailable(String),
}
