//! Hidden-information handling for search.
//!
//! - `info`: the masked view one seat has of a round.
//! - `sampler`: determinization of that view into a concrete round.

mod info;
mod sampler;

pub use info::InformationSet;
pub use sampler::{Determinization, DeterminizationOutcome, DeterminizeError, Determinizer};
