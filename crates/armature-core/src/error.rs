//! Value-validation errors.
//!
//! Every variant is raised synchronously at the point of misuse, before any
//! backend graph state is touched. These are programmer-usage errors and are
//! never retried.

use thiserror::Error;

/// An option value supplied at construction time failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The supplied direction is not one of `TB`, `BT`, `LR`, `RL`.
    #[error("\"{0}\" is not a valid direction")]
    InvalidDirection(String),

    /// The supplied curve style is not one of `ortho`, `curved`.
    #[error("\"{0}\" is not a valid curvestyle")]
    InvalidCurveStyle(String),

    /// The supplied output format is not one of `png`, `jpg`, `svg`, `pdf`.
    #[error("\"{0}\" is not a valid output format")]
    InvalidOutputFormat(String),
}
