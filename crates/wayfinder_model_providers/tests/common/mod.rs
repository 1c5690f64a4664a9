//! Shared test helpers for provider integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test helpers, not all items used in every test binary"
)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// A small 10x10 red PNG image.
pub const RED_SQUARE_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAoAAAAKCAIAAAACUFjqAAAAEklEQVR4nGP4z8CAB+GTG8HSALfKY52fTcuYAAAAAElFTkSuQmCC";
