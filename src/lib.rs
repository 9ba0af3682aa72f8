//! National Treasure: an adaptive browser-automation and web-archival
//! engine.
//!
//! Three subsystems compose into one capture pipeline: a per-domain
//! configuration [`learner`] that picks browser settings via Thompson
//! sampling over historical outcomes; a durable SQLite-backed [`store`]
//! holding that history, the configuration catalog, and a leased priority
//! job queue; and a [`pipeline`] that runs one capture end to end —
//! [`session`] acquisition, navigation, [`validator`] classification,
//! [`behaviors`] expansion, and artifact emission. [`worker`] drains the
//! job queue against all three.

pub mod behaviors;
pub mod config;
pub mod error;
pub mod learner;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod utils;
pub mod validator;
pub mod worker;

pub use config::AppConfig;
pub use error::FailureKind;
pub use learner::Learner;
pub use pipeline::{CaptureRequest, CaptureResult, PipelineError};
pub use store::{Configuration, OutcomeResult, Store, StoreError};
