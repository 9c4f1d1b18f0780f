//! Turning raw customer records into the numeric matrix the model expects.
//!
//! - [`encoder`]: the [`Encoder`](encoder::Encoder) capability and the
//!   label-encoder artifact format.
//! - [`matrix`]: the ordered feature list and the row-major feature matrix.
//! - [`normalizer`]: maps records through the encoders into a matrix aligned
//!   to the feature list, defaulting what it cannot use to zero.

pub mod encoder;
pub mod matrix;
pub mod normalizer;
