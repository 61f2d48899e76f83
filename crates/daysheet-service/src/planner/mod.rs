//! Feed-to-page planning: occurrence expansion, normalization, layout and
//! text fitting.

pub mod expand;
pub mod layout;
pub mod normalize;
pub mod occurrence;
pub mod recurrence;
pub mod text;
pub mod zone;
