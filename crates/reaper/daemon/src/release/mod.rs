//! Release manager
//!
//! Removes the release installed into a namespace before the namespace
//! itself goes away.

mod helm;
mod traits;

pub use helm::HelmCli;
pub use traits::{ReleaseManager, ReleaseStatus};
