// ABOUTME: Error types for the checkout wizard
// Validation, load, permission and submission failures share one visible error slot

use thiserror::Error;

use super::state::{CheckoutStep, CustomerField};
use crate::session::Role;

/// Local, synchronous validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter your phone number")]
    MissingPhone,

    #[error("Please enter your street address")]
    MissingStreetAddress,

    #[error("Please enter your city")]
    MissingCity,

    #[error("Please select a pickup location")]
    MissingPickupLocation,

    #[error("Unknown pickup location: {0}")]
    UnknownLocation(String),
}

impl ValidationError {
    /// Customer field this error is about, if any
    pub fn field(&self) -> Option<CustomerField> {
        match self {
            Self::MissingName => Some(CustomerField::Name),
            Self::MissingPhone => Some(CustomerField::Phone),
            Self::MissingStreetAddress => Some(CustomerField::StreetAddress),
            Self::MissingCity => Some(CustomerField::City),
            Self::MissingPickupLocation | Self::UnknownLocation(_) => None,
        }
    }

    /// Whether this error concerns the pickup selection
    pub fn is_pickup(&self) -> bool {
        matches!(self, Self::MissingPickupLocation | Self::UnknownLocation(_))
    }
}

/// Errors raised by the checkout wizard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Locations could not be fetched; non-fatal
    #[error("{0}")]
    LocationLoad(String),

    /// Edit attempted by a role that may not edit orders
    #[error("You do not have permission to edit this order (signed in as {role})")]
    Permission { role: Role },

    /// Backend rejected the submission or the network failed
    #[error("{0}")]
    Submission(String),

    /// Caller handed the wizard an unusable context
    #[error("Invalid checkout context: {0}")]
    InvalidContext(String),

    #[error("Orders can only be submitted from the review step (currently at {0:?})")]
    NotAtReview(CheckoutStep),

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("The checkout wizard has been closed")]
    Closed,
}

impl WizardError {
    /// Whether this error belongs in the visible error slot
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::NotAtReview(_) | Self::AlreadySubmitting | Self::Closed | Self::InvalidContext(_)
        )
    }
}
