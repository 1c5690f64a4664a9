//! Server runtime for plugin orchestration.
//!
//! The [`Server`] is the composition root of a Wayfinder process. It owns the
//! plugins and the resources they publish, and it drives the plugin
//! lifecycle:
//!
//! 1. **Dependency Resolution** - Validate and topologically sort plugins
//! 2. **Build Phase** - Call `plugin.build()` in dependency order
//! 3. **Ready Phase** - Call `plugin.ready()` in dependency order
//! 4. **Cleanup Phase** - Call `plugin.cleanup()` in reverse order

use crate::plugin::{BoxedPlugin, ErasedPlugin, PluginId, Plugins};
use crate::resource::{GlobalResource, Globals, Resource, Resources};
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

/// Represents the build state of the server.
///
/// `NotStarted` → `Building` → `Built`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BuildState {
    #[default]
    NotStarted,
    Building,
    Built,
}

/// The runtime that orchestrates plugins and manages resources.
pub struct Server {
    /// Server-lifetime, read-only resources handed out as `Arc`.
    global: Globals,

    /// Mutable resources used while plugins are being assembled.
    resources: Resources,

    /// Plugins pending build (not yet sorted).
    pending_plugins: Vec<BoxedPlugin>,

    /// Plugins that have been built, in dependency order.
    built_plugins: Vec<BoxedPlugin>,

    /// Set of plugin IDs that have been added (for duplicate detection).
    plugin_ids: HashSet<PluginId>,

    build_state: BuildState,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Server {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Server")
            .field("plugins", &self.plugin_names())
            .field("build_state", &self.build_state)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a new empty server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Globals::new(),
            resources: Resources::new(),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            build_state: BuildState::NotStarted,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds one or more plugins to the server.
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin is added twice, or if the server was already
    /// finished.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_server(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn ErasedPlugin>) {
        assert!(
            self.build_state == BuildState::NotStarted,
            "Plugin '{}' was added after Server::finish(). Add all plugins before finishing.",
            id.type_name()
        );

        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            panic!(
                "Plugin '{}' is unique and was already added.",
                id.type_name()
            );
        }

        self.plugin_ids.insert(id);
        self.pending_plugins.push(BoxedPlugin { id, plugin });
    }

    /// Returns true if a plugin of the given type has been added.
    #[must_use]
    pub fn has_plugin<P: crate::plugin::Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    /// Returns plugin identifiers with their versions, in build order once
    /// the server is finished.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<String> {
        self.built_plugins
            .iter()
            .chain(self.pending_plugins.iter())
            .map(|boxed| format!("{}@{}", boxed.plugin.id_str(), boxed.plugin.version()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a build-time resource, returning any previous value.
    pub fn insert_resource<R: Resource>(&mut self, resource: R) -> Option<R> {
        self.resources.insert(resource)
    }

    /// Returns true if a build-time resource of type `R` exists.
    #[must_use]
    pub fn contains_resource<R: Resource>(&self) -> bool {
        self.resources.contains::<R>()
    }

    /// Gets a reference to a build-time resource.
    #[must_use]
    pub fn get_resource<R: Resource>(&self) -> Option<&R> {
        self.resources.get::<R>()
    }

    /// Gets a mutable reference to a build-time resource.
    #[must_use]
    pub fn get_resource_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.resources.get_mut::<R>()
    }

    /// Removes a build-time resource and returns it.
    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    /// Inserts a global resource.
    ///
    /// Globals live as long as the server and are shared read-only. Use them
    /// for configuration and for services that manage their own interior
    /// state, such as model managers.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<Arc<R>> {
        self.global.insert(resource)
    }

    /// Inserts a global resource that is already shared elsewhere.
    pub fn insert_global_arc<R: GlobalResource>(&mut self, resource: Arc<R>) -> Option<Arc<R>> {
        self.global.insert_arc(resource)
    }

    /// Returns true if a global resource of type `R` exists.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.global.contains::<R>()
    }

    /// Returns a shared handle to a global resource.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<Arc<R>> {
        self.global.get::<R>()
    }

    /// Returns whether [`finish()`](Self::finish) has completed.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.build_state == BuildState::Built
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds all plugins and prepares the server for execution.
    ///
    /// # Panics
    ///
    /// - If a plugin's dependency is not satisfied
    /// - If there is a circular dependency between plugins
    /// - If called more than once
    pub fn finish(&mut self) {
        assert!(
            self.build_state == BuildState::NotStarted,
            "Server::finish() was already called. Cannot build twice."
        );

        let sorted = self.sort_plugins_by_dependencies();

        // Plugins are held outside `self` while their hooks borrow the server.
        self.build_state = BuildState::Building;
        for entry in &sorted {
            entry.plugin.build(self);
        }
        for entry in &sorted {
            entry.plugin.ready(self);
        }

        self.built_plugins = sorted;
        self.build_state = BuildState::Built;
    }

    /// Cleans up all plugins in reverse dependency order.
    pub fn cleanup(&mut self) {
        let built = core::mem::take(&mut self.built_plugins);
        for entry in built.iter().rev() {
            entry.plugin.cleanup(self);
        }
        self.built_plugins = built;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal: Dependency Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Sorts pending plugins with Kahn's algorithm, preserving insertion order
    /// among plugins that do not depend on each other.
    ///
    /// A dependency on a non-unique plugin waits for every added copy.
    fn sort_plugins_by_dependencies(&mut self) -> Vec<BoxedPlugin> {
        let pending = core::mem::take(&mut self.pending_plugins);
        let n = pending.len();

        let mut positions: HashMap<PluginId, Vec<usize>> = HashMap::new();
        for (i, entry) in pending.iter().enumerate() {
            positions.entry(entry.id).or_default().push(i);
        }

        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, entry) in pending.iter().enumerate() {
            for dep in entry.plugin.dependencies() {
                let Some(copies) = positions.get(&dep) else {
                    panic!(
                        "Plugin '{}' requires '{}' which was not added.\n\
                         Add {} to the server before calling finish().",
                        entry.id.type_name(),
                        dep.type_name(),
                        dep.type_name()
                    );
                };
                for &dep_idx in copies {
                    dependents[dep_idx].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        ready.reverse();
        let mut order: Vec<usize> = Vec::with_capacity(n);

        while let Some(idx) = ready.pop() {
            order.push(idx);
            for &dependent in dependents[idx].iter().rev() {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(dependent);
                }
            }
        }

        if order.len() != n {
            let in_cycle: Vec<&str> = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| pending[i].id.type_name())
                .collect();
            panic!("Circular dependency detected among plugins: {in_cycle:?}");
        }

        let mut slots: Vec<Option<BoxedPlugin>> = pending.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }
}
