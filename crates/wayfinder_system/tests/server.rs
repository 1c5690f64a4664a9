//! Plugin lifecycle tests for `wayfinder_system`.

use std::sync::Arc;
use std::sync::Mutex;

use wayfinder_system::plugin::{Plugin, PluginGroup, PluginGroupBuilder, PluginId, Version};
use wayfinder_system::resource::GlobalResource;
use wayfinder_system::server::Server;

/// Records a lifecycle call.
fn record(journal: &Mutex<Vec<String>>, entry: &str) {
    journal.lock().unwrap().push(entry.to_string());
}

struct Base {
    journal: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Base {
    const ID: &'static str = "test::base";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, server: &mut Server) {
        record(&self.journal, "base:build");
        server.insert_resource(Vec::<&'static str>::new());
    }

    fn ready(&self, server: &mut Server) {
        record(&self.journal, "base:ready");
        let names = server
            .remove_resource::<Vec<&'static str>>()
            .unwrap_or_default();
        server.insert_global(Registered(names));
    }

    fn cleanup(&self, _server: &mut Server) {
        record(&self.journal, "base:cleanup");
    }
}

struct Extension {
    journal: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Extension {
    const ID: &'static str = "test::extension";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, server: &mut Server) {
        record(&self.journal, "extension:build");
        server
            .get_resource_mut::<Vec<&'static str>>()
            .expect("Base must be built first")
            .push("extension");
    }

    fn ready(&self, _server: &mut Server) {
        record(&self.journal, "extension:ready");
    }

    fn cleanup(&self, _server: &mut Server) {
        record(&self.journal, "extension:cleanup");
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<Base>()]
    }
}

#[derive(Debug)]
struct Registered(Vec<&'static str>);
impl GlobalResource for Registered {}

struct Lonely;

impl Plugin for Lonely {
    const ID: &'static str = "test::lonely";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, _server: &mut Server) {}

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<Base>()]
    }
}

#[test]
fn plugins_build_in_dependency_order_regardless_of_insertion() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut server = Server::new();
    server.add_plugins(Extension {
        journal: Arc::clone(&journal),
    });
    server.add_plugins(Base {
        journal: Arc::clone(&journal),
    });
    server.finish();

    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "base:build",
            "extension:build",
            "base:ready",
            "extension:ready"
        ]
    );
    assert!(server.is_built());
}

#[test]
fn build_time_resources_become_globals() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut server = Server::new();
    server.add_plugins(Base {
        journal: Arc::clone(&journal),
    });
    server.add_plugins(Extension { journal });
    server.finish();

    let registered = server.get_global::<Registered>().unwrap();
    assert_eq!(registered.0, vec!["extension"]);
    assert!(!server.contains_resource::<Vec<&'static str>>());
}

#[test]
fn cleanup_runs_in_reverse_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut server = Server::new();
    server.add_plugins(Base {
        journal: Arc::clone(&journal),
    });
    server.add_plugins(Extension {
        journal: Arc::clone(&journal),
    });
    server.finish();
    journal.lock().unwrap().clear();

    server.cleanup();
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["extension:cleanup", "base:cleanup"]
    );
}

#[test]
#[should_panic(expected = "which was not added")]
fn missing_dependency_panics() {
    let mut server = Server::new();
    server.add_plugins(Lonely);
    server.finish();
}

#[test]
#[should_panic(expected = "already added")]
fn duplicate_unique_plugin_panics() {
    let mut server = Server::new();
    server.add_plugins(Lonely);
    server.add_plugins(Lonely);
}

#[test]
#[should_panic(expected = "already called")]
fn finish_twice_panics() {
    let mut server = Server::new();
    server.finish();
    server.finish();
}

struct Bundle(Arc<Mutex<Vec<String>>>);

impl PluginGroup for Bundle {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(Base {
                journal: Arc::clone(&self.0),
            })
            .add(Extension { journal: self.0 })
    }
}

#[test]
fn plugin_groups_add_all_members() {
    let mut server = Server::new();
    server.add_plugins(Bundle(Arc::new(Mutex::new(Vec::new()))).build());
    assert!(server.has_plugin::<Base>());
    assert!(server.has_plugin::<Extension>());

    server.finish();
    assert_eq!(
        server.plugin_names(),
        vec!["test::base@0.0.1", "test::extension@0.0.1"]
    );
}

struct Source {
    label: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Source {
    const ID: &'static str = "test::source";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, _server: &mut Server) {
        record(&self.journal, self.label);
    }

    fn is_unique(&self) -> bool {
        false
    }
}

struct Sink {
    journal: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Sink {
    const ID: &'static str = "test::sink";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, _server: &mut Server) {
        record(&self.journal, "sink");
    }

    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<Source>()]
    }
}

#[test]
fn dependents_wait_for_every_copy_of_a_repeated_plugin() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut server = Server::new();
    server.add_plugins(Source {
        label: "source:a",
        journal: Arc::clone(&journal),
    });
    server.add_plugins(Sink {
        journal: Arc::clone(&journal),
    });
    server.add_plugins(Source {
        label: "source:b",
        journal: Arc::clone(&journal),
    });
    server.finish();

    assert_eq!(*journal.lock().unwrap(), vec!["source:a", "source:b", "sink"]);
}
