//! Construction errors.
use thiserror::Error;

use crate::El;

/// Error raised when constructing a permutation or a group from invalid data.
///
/// Only construction can fail this way. Defined negative outcomes of queries (a permutation that
/// is not a member, a rank past the group order) are reported as `Option`/`bool` results instead,
/// and precondition violations (points outside the domain, primitivity of an intransitive group)
/// panic.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An image sequence contains the same point twice.
    #[error("point {image} appears more than once as an image")]
    DuplicateImage {
        /// The repeated image.
        image: El,
    },
    /// An image sequence contains a point outside `0..degree`.
    #[error("image {image} is out of range for degree {degree}")]
    ImageOutOfRange {
        /// The offending image.
        image: El,
        /// The length of the image sequence.
        degree: usize,
    },
    /// A cycle decomposition mentions the same point twice.
    #[error("point {point} appears more than once in a cycle decomposition")]
    RepeatedCyclePoint {
        /// The repeated point.
        point: El,
    },
    /// An explicitly requested group degree is smaller than the generators require.
    #[error("degree {given} is smaller than the generators' degree {required}")]
    DegreeTooSmall {
        /// The requested degree.
        given: usize,
        /// The smallest degree supporting every generator.
        required: usize,
    },
}
