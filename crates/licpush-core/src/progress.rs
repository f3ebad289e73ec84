// ── Progress reporting ──
//
// The runner narrates a run through these events instead of printing.
// The CLI turns them into console output and a progress bar; tests
// collect them to assert ordering.

use crate::report::DeviceOutcome;
use crate::stage::StageName;

/// One step in the life of a run, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    RunStarted {
        total: usize,
    },
    /// Work on one device begins. `index` is zero-based.
    DeviceStarted {
        address: String,
        index: usize,
        total: usize,
    },
    Connecting {
        address: String,
    },
    Connected {
        address: String,
    },
    StageStarted {
        address: String,
        stage: StageName,
    },
    StageCompleted {
        address: String,
        stage: StageName,
    },
    /// Work on one device is over, successfully or not.
    DeviceCompleted {
        address: String,
        outcome: DeviceOutcome,
    },
    RunFinished {
        succeeded: usize,
        failed: usize,
        invalid: usize,
    },
}

/// Receives run events as they happen.
pub trait ProgressSink {
    fn on_event(&mut self, event: ProgressEvent);
}

/// Discards every event. For library callers that only want the report.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&mut self, _event: ProgressEvent) {}
}
