//! The router's only fallible path is misconfiguration at construction time;
//! the search itself never fails (obstacle traversal is penalised, not
//! forbidden, and out-of-area endpoints are clamped rather than rejected).

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("gridStep must be positive, got {0}")]
    InvalidGridStep(f64),
    #[error("margin must be non-negative, got {0}")]
    InvalidMargin(f64),
}
