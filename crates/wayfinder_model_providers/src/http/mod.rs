//! Inference server backend.
//!
//! Talks JSON to a model server that hosts both models. Loading a model
//! probes `GET /health` and requires the server to list the configured model;
//! calls go to `POST /v1/vision/chat` and `POST /v1/generate`.
//!
//! ```no_run
//! # use wayfinder_model_providers::http::HttpProvidersPlugin;
//! # use wayfinder_system::server::Server;
//! # let mut server = Server::new();
//!
//! server.add_plugins(HttpProvidersPlugin::from_env("WAYFINDER_INFERENCE_URL"));
//! ```

mod client;
mod plugin;
mod provider;
pub mod types;

pub use client::InferenceClient;
pub use plugin::HttpProvidersPlugin;
pub use provider::{HttpTextLoader, HttpTextModel, HttpVisionLoader, HttpVisionModel};
