//! Background jobs.
//!
//! Each submodule exposes a long-running `run` function meant for
//! `tokio::spawn`. Jobs stop when their [`CancellationToken`] fires.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod session_cleanup;
