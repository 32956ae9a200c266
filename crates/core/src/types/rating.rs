//! Review rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside the accepted range.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("rating must be an integer between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError;

/// A review rating: an integer from 1 to 5 inclusive.
///
/// Validation happens at the boundary via serde (`try_from`) or
/// [`Rating::new`], so a constructed `Rating` is always in range.
///
/// ## Examples
///
/// ```
/// use storefront_core::Rating;
///
/// assert!(Rating::new(5).is_ok());
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Create a rating, validating the range.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if the value is not in `1..=5`.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError)
        }
    }

    /// Get the rating as an integer.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
