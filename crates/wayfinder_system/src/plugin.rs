//! Plugin system for extensible server functionality.
//!
//! Plugins are the unit of composition in Wayfinder. Model managers, provider
//! backends and logging are all delivered through plugins, so a deployment can
//! swap any of them without touching request handlers.
//!
//! # Example
//!
//! ```
//! use wayfinder_system::plugin::{Plugin, PluginId, Version};
//! use wayfinder_system::server::Server;
//!
//! struct LoggingPlugin;
//!
//! impl Plugin for LoggingPlugin {
//!     const ID: &'static str = "logging";
//!     const VERSION: Version = Version::new(0, 1, 0);
//!
//!     fn build(&self, _server: &mut Server) {}
//! }
//!
//! struct GuidePlugin;
//!
//! impl Plugin for GuidePlugin {
//!     const ID: &'static str = "guide";
//!     const VERSION: Version = Version::new(0, 1, 0);
//!
//!     fn build(&self, _server: &mut Server) {}
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<LoggingPlugin>()]
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(GuidePlugin);
//! server.add_plugins(LoggingPlugin);
//! server.finish();
//! ```

use core::any::TypeId;
use core::fmt;

use crate::server::Server;

// ─────────────────────────────────────────────────────────────────────────────
// Version
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic version of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    /// Creates a new version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type.
///
/// Used for dependency resolution and duplicate detection. Based on [`TypeId`],
/// so each plugin type has exactly one `PluginId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of functionality that configures the server.
///
/// Plugins follow a strict lifecycle managed by the server:
///
/// 1. **Build Phase** - `build()` is called in dependency order
/// 2. **Ready Phase** - `ready()` is called in dependency order, after every
///    plugin has been built
/// 3. **Cleanup Phase** - `cleanup()` is called in reverse dependency order
pub trait Plugin: Send + Sync + 'static {
    /// Stable identifier, used in logs.
    const ID: &'static str;

    /// Version of the plugin.
    const VERSION: Version;

    /// Configures the server. Called once, in dependency order.
    ///
    /// Keep `build()` lightweight. Slow work such as model construction
    /// belongs in background tasks started from `ready()`.
    fn build(&self, server: &mut Server);

    /// Called after all plugins have been built.
    ///
    /// Use this to consume registrations made by dependent plugins during
    /// their `build()` phase, or to start background work.
    fn ready(&self, _server: &mut Server) {}

    /// Called when the server is shutting down, in reverse dependency order.
    fn cleanup(&self, _server: &mut Server) {}

    /// Declares plugins that must be added alongside this one.
    ///
    /// The server panics in [`Server::finish`] if a dependency is missing.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Returns true if this plugin can only be added once.
    fn is_unique(&self) -> bool {
        true
    }
}

/// Object-safe view of a [`Plugin`], used for storage inside the server.
pub(crate) trait ErasedPlugin: Send + Sync + 'static {
    fn id_str(&self) -> &'static str;
    fn version(&self) -> Version;
    fn build(&self, server: &mut Server);
    fn ready(&self, server: &mut Server);
    fn cleanup(&self, server: &mut Server);
    fn dependencies(&self) -> Vec<PluginId>;
    fn is_unique(&self) -> bool;
}

impl<P: Plugin> ErasedPlugin for P {
    fn id_str(&self) -> &'static str {
        P::ID
    }

    fn version(&self) -> Version {
        P::VERSION
    }

    fn build(&self, server: &mut Server) {
        Plugin::build(self, server);
    }

    fn ready(&self, server: &mut Server) {
        Plugin::ready(self, server);
    }

    fn cleanup(&self, server: &mut Server) {
        Plugin::cleanup(self, server);
    }

    fn dependencies(&self) -> Vec<PluginId> {
        Plugin::dependencies(self)
    }

    fn is_unique(&self) -> bool {
        Plugin::is_unique(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins Trait (for add_plugins polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for types that can be added to a server as plugins.
///
/// Implemented for single plugins and for [`PluginGroupBuilder`].
pub trait Plugins {
    /// Adds these plugins to the server.
    fn add_to_server(self, server: &mut Server);
}

impl<P: Plugin> Plugins for P {
    fn add_to_server(self, server: &mut Server) {
        server.add_plugin_boxed(PluginId::of::<P>(), Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_server(self, server: &mut Server) {
        for boxed in self.plugins {
            server.add_plugin_boxed(boxed.id, boxed.plugin);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroup
// ─────────────────────────────────────────────────────────────────────────────

/// A collection of plugins that can be added together.
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

pub(crate) struct BoxedPlugin {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn ErasedPlugin>,
}

/// Builder for customizing plugin groups.
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<BoxedPlugin>,
}

impl PluginGroupBuilder {
    /// Creates a new empty plugin group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(BoxedPlugin {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        });
        self
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct First;
    impl Plugin for First {
        const ID: &'static str = "first";
        const VERSION: Version = Version::new(1, 2, 3);
        fn build(&self, _server: &mut Server) {}
    }

    struct Second;
    impl Plugin for Second {
        const ID: &'static str = "second";
        const VERSION: Version = Version::new(0, 0, 1);
        fn build(&self, _server: &mut Server) {}
    }

    #[test]
    fn version_displays_semver() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn plugin_ids_differ_per_type() {
        assert_ne!(PluginId::of::<First>(), PluginId::of::<Second>());
        assert_eq!(PluginId::of::<First>(), PluginId::of::<First>());
    }

    #[test]
    fn group_keeps_insertion_order() {
        let group = PluginGroupBuilder::new().add(Second).add(First);
        assert_eq!(group.len(), 2);
        assert_eq!(group.plugins[0].id, PluginId::of::<Second>());
        assert_eq!(group.plugins[1].plugin.version(), Version::new(1, 2, 3));
    }
}
