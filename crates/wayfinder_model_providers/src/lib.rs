//! Plugins providing model backends for Wayfinder.
//!
//! Each backend is packaged as a standalone plugin. When added to the server,
//! it registers loaders in the [`ModelLoaders`](wayfinder_models::ModelLoaders)
//! build-time resource, and [`ModelsPlugin`](wayfinder_models::ModelsPlugin)
//! turns them into managed models.
//!
//! # Supported Backends
//!
//! | Backend | Feature Flag | Description |
//! |---------|--------------|-------------|
//! | Inference server | `http` (default) | JSON model server over HTTP |
//!
//! # Usage
//!
//! Provider plugins depend on [`ModelsPlugin`](wayfinder_models::ModelsPlugin),
//! which must be added to the server as well.
//!
//! ```no_run
//! # #[cfg(feature = "http")]
//! # {
//! use wayfinder_model_providers::HttpProvidersPlugin;
//! use wayfinder_models::ModelsPlugin;
//! use wayfinder_system::server::Server;
//!
//! let mut server = Server::new();
//! server.add_plugins(ModelsPlugin::default());
//! server.add_plugins(HttpProvidersPlugin::from_env("WAYFINDER_INFERENCE_URL"));
//! server.finish();
//! # }
//! ```

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpProvidersPlugin;
