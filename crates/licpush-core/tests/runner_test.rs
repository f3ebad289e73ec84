#![allow(clippy::unwrap_used)]
// Engine tests with a scripted connector: the full runner loop,
// fail-fast stage semantics, and close discipline, with no network.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use secrecy::SecretString;

use licpush_core::{
    ChannelError, CommandOutput, ConnectFailure, Connector, Credentials, DeviceChannel,
    DeviceList, DeviceOutcome, FailureKind, NullSink, ProgressEvent, ProgressSink,
    ProvisionRunner, RunSettings, StageName, StagePlan,
};

// ── Scripted connector ──────────────────────────────────────────────

/// What one stage exchange does once a device is connected.
#[derive(Clone)]
enum Step {
    Ok,
    /// Device echoes a failure marker; the session survives.
    Rejected(&'static str),
    /// The session itself dies mid-exchange.
    Broken(&'static str),
}

#[derive(Clone)]
enum Script {
    Accept(Vec<Step>),
    RefuseAuth,
    RefuseEnable,
    Unreachable,
}

/// Shared log of connector activity, for ordering assertions.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn log(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

struct ScriptedConnector {
    scripts: HashMap<IpAddr, Script>,
    journal: Journal,
}

impl ScriptedConnector {
    fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(addr, script)| (addr.parse().unwrap(), script.clone()))
                .collect(),
            journal: Journal::default(),
        }
    }
}

struct ScriptedChannel {
    address: String,
    steps: VecDeque<Step>,
    journal: Journal,
    closed: bool,
}

impl Connector for ScriptedConnector {
    type Session = ScriptedChannel;

    async fn connect(
        &self,
        address: IpAddr,
        credentials: &Credentials,
    ) -> Result<Self::Session, ConnectFailure> {
        self.journal
            .log(format!("connect {address} as {}", credentials.username));
        match self.scripts.get(&address) {
            Some(Script::Accept(steps)) => Ok(ScriptedChannel {
                address: address.to_string(),
                steps: steps.iter().cloned().collect(),
                journal: self.journal.clone(),
                closed: false,
            }),
            Some(Script::RefuseAuth) => Err(ConnectFailure::Authentication {
                message: "bad password".into(),
            }),
            Some(Script::RefuseEnable) => Err(ConnectFailure::Privilege {
                message: "bad enable secret".into(),
            }),
            Some(Script::Unreachable) | None => Err(ConnectFailure::Unreachable {
                message: "connection refused".into(),
            }),
        }
    }
}

impl ScriptedChannel {
    fn next_step(&mut self) -> Result<CommandOutput, ChannelError> {
        match self.steps.pop_front().unwrap_or(Step::Ok) {
            Step::Ok => Ok(CommandOutput {
                failed: false,
                output: String::new(),
            }),
            Step::Rejected(marker) => Ok(CommandOutput {
                failed: true,
                output: marker.to_string(),
            }),
            Step::Broken(message) => Err(ChannelError {
                message: message.to_string(),
            }),
        }
    }
}

impl DeviceChannel for ScriptedChannel {
    async fn apply_config(&mut self, lines: &[String]) -> Result<CommandOutput, ChannelError> {
        self.journal
            .log(format!("config {} ({} lines)", self.address, lines.len()));
        self.next_step()
    }

    async fn run_command(&mut self, _command: &str) -> Result<CommandOutput, ChannelError> {
        self.journal.log(format!("command {}", self.address));
        self.next_step()
    }

    async fn close(&mut self) {
        assert!(!self.closed, "close called twice for {}", self.address);
        self.closed = true;
        self.journal.log(format!("close {}", self.address));
    }
}

/// Collects every event so tests can assert the exact sequence.
#[derive(Default)]
struct Recorder {
    events: Vec<ProgressEvent>,
}

impl ProgressSink for Recorder {
    fn on_event(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials {
        username: "netops".to_string(),
        password: SecretString::from("hunter2".to_string()),
        enable_secret: Some(SecretString::from("letmein".to_string())),
    }
}

fn settings() -> RunSettings {
    RunSettings::new(
        "SSM-Lab",
        "http://ssm.lab.example/Transportgateway/services/DeviceRequestHandler",
        SecretString::from("tok-abc".to_string()),
    )
}

fn full_plan() -> StagePlan {
    StagePlan::from_settings(&settings()).unwrap()
}

// ── Whole-run outcomes ──────────────────────────────────────────────

#[tokio::test]
async fn test_clean_run_reports_every_device_successful() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Accept(vec![])),
        ("10.0.0.2", Script::Accept(vec![])),
    ]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n10.0.0.2\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.succeeded(), &["10.0.0.1".to_string(), "10.0.0.2".to_string()]);
    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.invalid_count(), 0);

    // Devices are worked strictly one at a time, in input order.
    assert_eq!(
        journal.entries(),
        vec![
            "connect 10.0.0.1 as netops".to_string(),
            "config 10.0.0.1 (2 lines)".to_string(),
            "config 10.0.0.1 (9 lines)".to_string(),
            "command 10.0.0.1".to_string(),
            "close 10.0.0.1".to_string(),
            "connect 10.0.0.2 as netops".to_string(),
            "config 10.0.0.2 (2 lines)".to_string(),
            "config 10.0.0.2 (9 lines)".to_string(),
            "command 10.0.0.2".to_string(),
            "close 10.0.0.2".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_mixed_list_puts_every_entry_in_exactly_one_bucket() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Accept(vec![])),
        (
            "10.0.0.2",
            Script::Accept(vec![
                Step::Ok,
                Step::Ok,
                Step::Rejected("% Invalid input detected at '^' marker."),
            ]),
        ),
    ]);
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\nnot-an-ip\n10.0.0.2\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.succeeded(), &["10.0.0.1".to_string()]);
    assert_eq!(report.invalid(), &["not-an-ip".to_string()]);

    let reason = &report.failures()["10.0.0.2"];
    assert_eq!(reason.kind, FailureKind::Stage(StageName::RegisterLicense));
    assert!(reason.detail.contains("% Invalid input detected"));

    assert_eq!(
        report.success_count() + report.failure_count() + report.invalid_count(),
        3
    );
}

#[tokio::test]
async fn test_auth_and_enable_failures_stay_distinct() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::RefuseAuth),
        ("10.0.0.2", Script::RefuseEnable),
    ]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n10.0.0.2\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.failures()["10.0.0.1"].kind, FailureKind::Authentication);
    assert_eq!(report.failures()["10.0.0.2"].kind, FailureKind::Privilege);

    // No session ever existed, so nothing was configured or closed.
    assert_eq!(journal.count("config"), 0);
    assert_eq!(journal.count("close"), 0);
}

#[tokio::test]
async fn test_unreachable_device_does_not_stop_the_run() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Accept(vec![])),
        ("10.0.0.2", Script::Unreachable),
        ("10.0.0.3", Script::Accept(vec![])),
    ]);
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n10.0.0.2\n10.0.0.3\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.succeeded(), &["10.0.0.1".to_string(), "10.0.0.3".to_string()]);
    assert_eq!(report.failures()["10.0.0.2"].kind, FailureKind::Connect);
}

// ── Stage sequencing ────────────────────────────────────────────────

#[tokio::test]
async fn test_first_stage_failure_ends_that_device_sequence() {
    let connector = ScriptedConnector::new(&[(
        "10.0.0.1",
        Script::Accept(vec![Step::Rejected("% Invalid input detected at '^' marker.")]),
    )]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(
        report.failures()["10.0.0.1"].kind,
        FailureKind::Stage(StageName::RemoveDefaultProfile)
    );
    // Later stages never ran; the session still got closed exactly once.
    assert_eq!(journal.count("config"), 1);
    assert_eq!(journal.count("command"), 0);
    assert_eq!(journal.count("close"), 1);
}

#[tokio::test]
async fn test_session_break_is_a_stage_failure_and_still_closes() {
    let connector = ScriptedConnector::new(&[(
        "10.0.0.1",
        Script::Accept(vec![Step::Ok, Step::Broken("connection reset by peer")]),
    )]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    let reason = &report.failures()["10.0.0.1"];
    assert_eq!(reason.kind, FailureKind::Stage(StageName::ApplyProfile));
    assert!(reason.detail.contains("connection reset"));
    assert_eq!(journal.count("close"), 1);
}

#[tokio::test]
async fn test_disabled_removal_sends_only_two_stages() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::Accept(vec![]))]);
    let journal = connector.journal.clone();

    let mut run_settings = settings();
    run_settings.remove_default_profile = false;
    let plan = StagePlan::from_settings(&run_settings).unwrap();
    let runner = ProvisionRunner::new(connector, plan);
    let devices = DeviceList::parse("10.0.0.1\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.success_count(), 1);
    assert_eq!(
        journal.entries(),
        vec![
            "connect 10.0.0.1 as netops".to_string(),
            "config 10.0.0.1 (9 lines)".to_string(),
            "command 10.0.0.1".to_string(),
            "close 10.0.0.1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_addresses_are_provisioned_per_occurrence() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::Accept(vec![]))]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n10.0.0.1\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(journal.count("connect"), 2);
    assert_eq!(report.succeeded().len(), 2);
}

// ── Edges and events ────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_list_makes_no_connections() {
    let connector = ScriptedConnector::new(&[]);
    let journal = connector.journal.clone();
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("\n\n");

    let report = runner.run(&devices, &credentials(), &mut NullSink).await;

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.invalid_count(), 0);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn test_events_follow_the_device_lifecycle() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::Accept(vec![]))]);
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n");
    let mut recorder = Recorder::default();

    runner.run(&devices, &credentials(), &mut recorder).await;

    let addr = "10.0.0.1".to_string();
    assert_eq!(
        recorder.events,
        vec![
            ProgressEvent::RunStarted { total: 1 },
            ProgressEvent::DeviceStarted {
                address: addr.clone(),
                index: 0,
                total: 1
            },
            ProgressEvent::Connecting {
                address: addr.clone()
            },
            ProgressEvent::Connected {
                address: addr.clone()
            },
            ProgressEvent::StageStarted {
                address: addr.clone(),
                stage: StageName::RemoveDefaultProfile
            },
            ProgressEvent::StageCompleted {
                address: addr.clone(),
                stage: StageName::RemoveDefaultProfile
            },
            ProgressEvent::StageStarted {
                address: addr.clone(),
                stage: StageName::ApplyProfile
            },
            ProgressEvent::StageCompleted {
                address: addr.clone(),
                stage: StageName::ApplyProfile
            },
            ProgressEvent::StageStarted {
                address: addr.clone(),
                stage: StageName::RegisterLicense
            },
            ProgressEvent::StageCompleted {
                address: addr.clone(),
                stage: StageName::RegisterLicense
            },
            ProgressEvent::DeviceCompleted {
                address: addr.clone(),
                outcome: DeviceOutcome::Success
            },
            ProgressEvent::RunFinished {
                succeeded: 1,
                failed: 0,
                invalid: 0
            },
        ]
    );
}

#[tokio::test]
async fn test_failed_connect_emits_no_connected_or_stage_events() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::RefuseAuth)]);
    let runner = ProvisionRunner::new(connector, full_plan());
    let devices = DeviceList::parse("10.0.0.1\n");
    let mut recorder = Recorder::default();

    runner.run(&devices, &credentials(), &mut recorder).await;

    assert!(!recorder
        .events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Connected { .. })));
    assert!(!recorder
        .events
        .iter()
        .any(|e| matches!(e, ProgressEvent::StageStarted { .. })));
    assert!(recorder.events.iter().any(|e| matches!(
        e,
        ProgressEvent::DeviceCompleted {
            outcome: DeviceOutcome::Failed(_),
            ..
        }
    )));
}
