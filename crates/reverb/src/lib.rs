//! # REVERB Demo Host
//!
//! A headless stand-in for the game: one tick thread owns and mutates the
//! world, listener threads trace sound occlusion against read proxies.
//!
//! ```text
//! tick thread ──on_tick──► AccessStrategy ◄──read_proxy── listener 0..N
//!      │                                                     │
//!      └── observer position (RwLock) ──────────────────────►┘
//!                                       reports ──channel──► main
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod demo;

pub use demo::{run, DemoSettings, DemoSummary, ListenerReport};
