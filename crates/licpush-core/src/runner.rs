// ── Provisioning runner ──
//
// Sequential orchestration of one run: for each valid address, connect,
// apply the stage plan in order, close. A device's first failure ends
// its sequence but never the run; the report collects everything.

use std::net::IpAddr;

use tracing::{debug, info, warn};

use crate::connect::{Connector, DeviceChannel};
use crate::device_list::DeviceList;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::report::{DeviceOutcome, FailureReason, RunReport};
use crate::settings::Credentials;
use crate::stage::{StageAction, StagePlan};

/// Applies a stage plan to a list of devices, one device at a time.
///
/// Generic over the connector so the engine runs against real SSH in
/// production and scripted fakes in tests.
pub struct ProvisionRunner<C> {
    connector: C,
    plan: StagePlan,
}

impl<C: Connector> ProvisionRunner<C> {
    pub fn new(connector: C, plan: StagePlan) -> Self {
        Self { connector, plan }
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Provision every valid device and report every entry's fate.
    ///
    /// Invalid entries go straight into the report; they are never
    /// dialed. The run itself cannot fail -- per-device problems are
    /// data, not errors.
    pub async fn run(
        &self,
        devices: &DeviceList,
        credentials: &Credentials,
        progress: &mut dyn ProgressSink,
    ) -> RunReport {
        let total = devices.valid().len();
        let mut report = RunReport::with_invalid(devices.invalid().to_vec());
        progress.on_event(ProgressEvent::RunStarted { total });
        info!(total, invalid = devices.invalid().len(), "run started");

        for (index, address) in devices.valid().iter().enumerate() {
            let label = address.to_string();
            progress.on_event(ProgressEvent::DeviceStarted {
                address: label.clone(),
                index,
                total,
            });

            let outcome = self.provision_device(*address, credentials, progress).await;
            match &outcome {
                DeviceOutcome::Success => debug!(address = %address, "device provisioned"),
                DeviceOutcome::Failed(reason) => {
                    warn!(address = %address, reason = %reason, "device failed");
                }
            }
            progress.on_event(ProgressEvent::DeviceCompleted {
                address: label.clone(),
                outcome: outcome.clone(),
            });
            report.record(label, outcome);
        }

        progress.on_event(ProgressEvent::RunFinished {
            succeeded: report.success_count(),
            failed: report.failure_count(),
            invalid: report.invalid_count(),
        });
        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            invalid = report.invalid_count(),
            "run finished"
        );
        report
    }

    /// Connect, apply every stage, and close no matter what happened.
    async fn provision_device(
        &self,
        address: IpAddr,
        credentials: &Credentials,
        progress: &mut dyn ProgressSink,
    ) -> DeviceOutcome {
        let label = address.to_string();
        progress.on_event(ProgressEvent::Connecting {
            address: label.clone(),
        });
        let mut session = match self.connector.connect(address, credentials).await {
            Ok(session) => session,
            Err(failure) => return DeviceOutcome::Failed(FailureReason::from(failure)),
        };
        progress.on_event(ProgressEvent::Connected {
            address: label.clone(),
        });

        let outcome = self.apply_stages(&mut session, &label, progress).await;
        session.close().await;
        outcome
    }

    /// Apply stages in order; the first failure ends this device's run.
    async fn apply_stages(
        &self,
        session: &mut C::Session,
        address: &str,
        progress: &mut dyn ProgressSink,
    ) -> DeviceOutcome {
        for stage in self.plan.stages() {
            progress.on_event(ProgressEvent::StageStarted {
                address: address.to_string(),
                stage: stage.name,
            });

            let result = match &stage.action {
                StageAction::ConfigBatch(lines) => session.apply_config(lines).await,
                StageAction::Command(command) => session.run_command(command).await,
            };

            match result {
                Ok(output) if output.failed => {
                    return DeviceOutcome::Failed(FailureReason::stage(stage.name, output.output));
                }
                Ok(_) => {
                    progress.on_event(ProgressEvent::StageCompleted {
                        address: address.to_string(),
                        stage: stage.name,
                    });
                }
                Err(err) => {
                    return DeviceOutcome::Failed(FailureReason::stage(stage.name, err.message));
                }
            }
        }
        DeviceOutcome::Success
    }
}
