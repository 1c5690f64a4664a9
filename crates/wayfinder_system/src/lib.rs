//! Plugin orchestration for Wayfinder.
//!
//! `wayfinder_system` is the composition root of a Wayfinder process:
//!
//! - [`plugin`] - Plugin trait, identifiers and versions
//! - [`resource`] - Type-keyed storage for shared state
//! - [`server`] - Server runtime that builds plugins in dependency order
//!
//! Long-lived services (model managers, configuration, tracing settings) are
//! constructed by plugins and published as global resources. Request handlers
//! receive them by `Arc` instead of reaching for process-wide singletons.
//!
//! # Example
//!
//! ```
//! use wayfinder_system::plugin::{Plugin, Version};
//! use wayfinder_system::resource::GlobalResource;
//! use wayfinder_system::server::Server;
//!
//! #[derive(Default)]
//! struct GuideConfig { city: String }
//! impl GlobalResource for GuideConfig {}
//!
//! struct GuidePlugin;
//!
//! impl Plugin for GuidePlugin {
//!     const ID: &'static str = "guide";
//!     const VERSION: Version = Version::new(0, 0, 1);
//!
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(GuideConfig { city: "Paris".into() });
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(GuidePlugin);
//! server.finish();
//!
//! assert_eq!(server.get_global::<GuideConfig>().unwrap().city, "Paris");
//! ```

/// Plugin trait for extensible functionality.
pub mod plugin;

/// Shared state containers.
pub mod resource;

/// Server runtime for plugin orchestration.
pub mod server;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::server::*;
}
