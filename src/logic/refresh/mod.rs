//! Refresh Module - Polling with manual override
//!
//! This module handles:
//! - The `Idle -> Fetching -> {Settled, Failed}` cycle (`machine`)
//! - Periodic analytics refresh on a tokio timer (`scheduler`)
//! - Single guarded detection requests (`oneshot`)
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use rakshak_core::config::Config;
//! use rakshak_core::logic::detection::DetectionClient;
//! use rakshak_core::logic::refresh::RefreshScheduler;
//!
//! # async fn run() -> Result<(), rakshak_core::error::DetectionError> {
//! let config = Config::from_env();
//! let client = Arc::new(DetectionClient::new(&config)?);
//! let handle = RefreshScheduler::spawn(client, config.refresh_interval());
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     let state = updates.borrow().clone();
//!     println!("{:?}", state.phase);
//! }
//! # Ok(())
//! # }
//! ```

pub mod machine;
pub mod oneshot;
pub mod scheduler;

pub use machine::{DashboardState, FetchTicket, Phase, RefreshMachine, Resolution, Trigger};
pub use oneshot::OneShot;
pub use scheduler::{AnalyticsSource, AnalyticsState, RefreshHandle, RefreshScheduler};
