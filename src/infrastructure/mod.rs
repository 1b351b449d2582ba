//! Infrastructure Layer
//!
//! Implementations of the domain seams that talk to the outside world:
//! - Detection oracle (remote inference service, frame annotation)
//! - Alert notifiers (log, webhook)
//! - Prometheus metrics

pub mod metrics;
pub mod notifier;
pub mod oracle;
