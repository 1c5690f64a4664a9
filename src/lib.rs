//! Landmark identification and description with lazily loaded models.
//!

pub use wayfinder_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use wayfinder_internal::prelude::*;
}
