//! # am-silences
//!
//! Silence model and the logic behind `amtool silence add`.
//!
//! The workflow is a pipeline of small steps, each usable on its own:
//!
//! - [`matcher`]: turn `label=value` arguments into candidate matcher groups
//! - [`expiry`]: resolve `--expires` / `--expire-on` into a silence window
//! - [`config`]: merge flags, the config file and defaults
//! - [`dedup`]: drop candidates that already have an active silence
//! - [`submit`]: build silences and classify server replies
//! - [`client`]: talk to the Alertmanager HTTP API
//!
//! ```text
//! args ─► matcher ─► dedup ◄── GET /api/v1/silences
//!                      │
//!                      ▼
//!            submit ─► POST /api/v1/silences (one per group)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod dedup;
pub mod error;
pub mod expiry;
pub mod matcher;
pub mod submit;
pub mod types;

pub use client::HttpSilenceClient;
pub use config::{ConfigFile, Defaults, EffectiveConfig, FlagValues, LoadedConfig};
pub use dedup::{FilterOutcome, SkippedDuplicate, filter_duplicates};
pub use error::{Result, SilenceError};
pub use expiry::{SilenceWindow, resolve_expiry};
pub use matcher::parse_matcher_groups;
pub use submit::{SilenceApi, SubmitOutcome, build_silences};
pub use types::{Matcher, MatcherGroup, Silence};
