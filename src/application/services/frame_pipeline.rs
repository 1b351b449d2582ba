//! Frame Pipeline
//!
//! Runs one inbound frame through the stages: registry lookup, rate gate,
//! detector, detection window, alert policy, notification and broadcast.
//!
//! Session locks are only held for the short bookkeeping steps before and
//! after detection, never across the detector call.
//!
//! Each connection feeds its frames through a `FrameLane`: a bounded queue
//! drained by one worker, so a session's frames reach the detection window
//! in arrival order.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::application::dto::{AlertPayload, ProcessedFramePayload, ServerEvent};
use crate::config::DetectionSettings;
use crate::domain::{Alert, AlertDecision, AlertPolicy, DetectionOracle, IngestGate};
use crate::infrastructure::metrics;
use crate::shared::error::DetectionError;

use super::alert_dispatcher::AlertDispatcher;
use super::broadcast_relay::{BroadcastRelay, PublishReport};
use super::session_registry::{SessionHandle, SessionRegistry};

/// What happened to one inbound frame
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Detection ran and the result was broadcast
    Processed {
        consecutive: usize,
        alert: AlertDecision,
    },
    /// Rejected by the rate gate
    Dropped,
    /// Session unknown or removed while the frame was in flight
    Discarded,
    /// Detection failed; session state untouched
    Failed(DetectionError),
}

impl PipelineOutcome {
    fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Processed { .. } => "processed",
            PipelineOutcome::Dropped => "dropped",
            PipelineOutcome::Discarded => "discarded",
            PipelineOutcome::Failed(e) => e.kind(),
        }
    }
}

/// Per-frame orchestration over shared components
pub struct FramePipeline {
    registry: Arc<SessionRegistry>,
    relay: Arc<BroadcastRelay>,
    oracle: Arc<dyn DetectionOracle>,
    dispatcher: AlertDispatcher,
    gate: IngestGate,
    policy: AlertPolicy,
}

impl FramePipeline {
    pub fn new(
        registry: Arc<SessionRegistry>,
        relay: Arc<BroadcastRelay>,
        oracle: Arc<dyn DetectionOracle>,
        dispatcher: AlertDispatcher,
        settings: &DetectionSettings,
    ) -> Self {
        Self {
            registry,
            relay,
            oracle,
            dispatcher,
            gate: IngestGate::new(settings.frame_interval()),
            policy: AlertPolicy::new(settings.alert_consecutive_frames, settings.alert_cooldown()),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn relay(&self) -> &Arc<BroadcastRelay> {
        &self.relay
    }

    /// Register a producer connection.
    pub fn open_session(&self, client_id: &str) -> SessionHandle {
        self.registry.create(client_id)
    }

    /// Tear down everything tied to a connection: its session record and,
    /// if it had joined, its place in the broadcast audience.
    pub fn close_session(&self, client_id: &str) {
        self.registry.remove(client_id);
        self.relay.unsubscribe(client_id);
    }

    /// Start the serial frame worker for one connection.
    ///
    /// The worker stops once the returned lane is dropped and its queue is
    /// drained; frames still queued for a closed session are discarded.
    pub fn open_lane(self: &Arc<Self>, client_id: &str, capacity: usize) -> (FrameLane, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<(String, Instant)>(capacity.max(1));
        let pipeline = Arc::clone(self);
        let id = client_id.to_string();
        let worker = tokio::spawn(async move {
            while let Some((frame, arrived_at)) = rx.recv().await {
                pipeline.handle_frame_at(&id, &frame, arrived_at).await;
            }
        });

        let lane = FrameLane {
            client_id: client_id.to_string(),
            tx,
            pipeline: Arc::clone(self),
        };
        (lane, worker)
    }

    /// Count a frame that never reached the gate because its lane was full.
    pub fn drop_frame(&self, client_id: &str) {
        if let Some(handle) = self.registry.get(client_id) {
            handle.lock().skip_frame();
        }
        metrics::record_frame("dropped");
    }

    /// Process a frame using the current time.
    pub async fn handle_frame(&self, client_id: &str, frame: &str) -> PipelineOutcome {
        self.handle_frame_at(client_id, frame, Instant::now()).await
    }

    /// Process a frame as if it arrived at `now`.
    pub async fn handle_frame_at(&self, client_id: &str, frame: &str, now: Instant) -> PipelineOutcome {
        let outcome = self.run(client_id, frame, now).await;
        metrics::record_frame(outcome.label());
        outcome
    }

    async fn run(&self, client_id: &str, frame: &str, now: Instant) -> PipelineOutcome {
        let Some(handle) = self.registry.get(client_id) else {
            tracing::debug!(client_id = %client_id, "Frame for unknown session ignored");
            return PipelineOutcome::Discarded;
        };

        {
            let mut session = handle.lock();
            if session.is_closed() {
                return PipelineOutcome::Discarded;
            }
            if !session.admit_frame(&self.gate, now) {
                tracing::trace!(client_id = %client_id, "Frame dropped by rate gate");
                return PipelineOutcome::Dropped;
            }
        }

        let started = Instant::now();
        let result = self.oracle.detect(frame).await;
        metrics::record_detection_latency(started.elapsed().as_secs_f64());

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                match &e {
                    DetectionError::ModelUnavailable => {
                        tracing::error!(client_id = %client_id, "Model not loaded, frame dropped")
                    }
                    _ => {
                        tracing::warn!(client_id = %client_id, error = %e, "Frame processing failed")
                    }
                }
                return PipelineOutcome::Failed(e);
            }
        };

        let update = {
            let mut session = handle.lock();
            if session.is_closed() {
                tracing::debug!(client_id = %client_id, "Session closed during detection, result discarded");
                return PipelineOutcome::Discarded;
            }
            session.record_detection(&output, &self.policy, now)
        };

        tracing::debug!(
            client_id = %client_id,
            detections = output.detections.len(),
            consecutive = update.consecutive,
            "Processed frame"
        );

        if update.alert.fired() {
            let class_id = output
                .detections
                .iter()
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .map_or(0, |d| d.class_id);
            let alert = Alert::new(client_id, update.consecutive).with_class(class_id);
            metrics::record_alert("fired");
            tracing::warn!(
                client_id = %client_id,
                consecutive = update.consecutive,
                "Sustained detection alert"
            );
            self.broadcast(ServerEvent::Alert(AlertPayload::from(&alert)));
            self.dispatcher.dispatch(alert);
        }

        self.broadcast(ServerEvent::ProcessedFrame(ProcessedFramePayload {
            frame: output.annotated_frame,
            client_id: client_id.to_string(),
            detections: output.detections,
            consecutive_detections: update.consecutive,
        }));

        PipelineOutcome::Processed {
            consecutive: update.consecutive,
            alert: update.alert,
        }
    }

    fn broadcast(&self, event: ServerEvent) -> PublishReport {
        let name = event.event_name();
        let report = self.relay.publish(event);
        metrics::record_broadcast("delivered", report.delivered);
        metrics::record_broadcast("dropped", report.dropped);
        metrics::record_broadcast("pruned", report.pruned);
        if report.dropped > 0 {
            tracing::debug!(
                event = name,
                dropped = report.dropped,
                delivered = report.delivered,
                "Broadcast dropped for lagging subscribers"
            );
        }
        report
    }
}

/// Enqueue side of one connection's frame worker
pub struct FrameLane {
    client_id: String,
    tx: mpsc::Sender<(String, Instant)>,
    pipeline: Arc<FramePipeline>,
}

impl FrameLane {
    /// Queue a frame that arrived at `now`. Returns `false` if the queue was
    /// full and the frame was dropped.
    pub fn submit(&self, frame: String, now: Instant) -> bool {
        match self.tx.try_send((frame, now)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!(client_id = %self.client_id, "Frame lane full, frame dropped");
                self.pipeline.drop_frame(&self.client_id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(client_id = %self.client_id, "Frame worker stopped, frame dropped");
                self.pipeline.drop_frame(&self.client_id);
                false
            }
        }
    }
}
