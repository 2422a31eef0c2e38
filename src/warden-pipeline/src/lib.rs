//! Request authorization pipeline for Warden.
//!
//! Every inbound message passes through a fixed list of gates before it may
//! reach a command handler:
//!
//! ```text
//! message -> rate limiter -> setup -> upsert -> scope -> terms -> access mode -> Dispatch
//!                 |            |                 |        |          |
//!                 +------------+-----------------+--------+----------+--> Cancelled(reason)
//! ```
//!
//! A cancelling gate sends its own notice (or stays silent) and the message
//! is dropped. A gate that finds the deployment misconfigured returns a
//! [`ConfigurationFault`], which halts the pipeline for good.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_pipeline::{AuthorizationPipeline, PipelineConfig};
//!
//! let pipeline = AuthorizationPipeline::new(store, notifier, PipelineConfig::default());
//! match pipeline.process(&message).await? {
//!     Outcome::Dispatch => handle(message).await,
//!     Outcome::Cancelled(reason) => tracing::debug!(?reason, "dropped"),
//! }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod gate;
pub mod install;
pub mod message;
pub mod notify;
pub mod pipeline;
pub mod ratelimit;
pub mod settings;
pub mod stages;

pub use audit::{AuditSink, TracingAudit};
pub use config::{Messages, PipelineConfig, RateLimitConfig};
pub use error::{ConfigError, ConfigurationFault};
pub use gate::{CancelReason, Gate, GateContext, Verdict};
pub use install::{AlreadyInstalled, Installer, MarkerFileInstaller};
pub use message::{InboundMessage, Sender};
pub use notify::{Notifier, NotifyOptions, NotifyTarget};
pub use pipeline::{AuthorizationPipeline, Outcome};
pub use ratelimit::{RateLimiter, TokenBucketLimiter};
pub use settings::{AccessMode, SettingsSnapshot, UnknownAccessMode};
