//! Application Services
//!
//! Components that coordinate domain rules with shared runtime state.
//!
//! ## Available Services
//!
//! - **SessionRegistry**: One record per connected producer
//! - **BroadcastRelay**: Fan-out to the admin audience
//! - **AlertDispatcher**: Background alert delivery
//! - **FramePipeline**: Per-frame orchestration of all of the above, fed
//!   through one serial `FrameLane` per connection

pub mod alert_dispatcher;
pub mod broadcast_relay;
pub mod frame_pipeline;
pub mod session_registry;

pub use alert_dispatcher::AlertDispatcher;
pub use broadcast_relay::{BroadcastRelay, PublishReport, Subscription};
pub use frame_pipeline::{FrameLane, FramePipeline, PipelineOutcome};
pub use session_registry::{SessionHandle, SessionRegistry};
