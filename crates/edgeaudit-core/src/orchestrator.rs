// ── Session orchestrator ──
//
// One pass over the inventory: filter, connect, run the plan's commands,
// parse, classify, record. Per-device failures are contained here and never
// abort the run. SSH work is blocking and runs on the blocking pool; results
// come back to the driving task in inventory order.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::commands;
use crate::config::{AuditSettings, HubConfig};
use crate::error::CoreError;
use crate::executor::{CommandExecutor, CommandSession};
use crate::model::{ClassificationOutcome, Device, DeviceState, DiagnosticResult, Rate};
use crate::parse;
use crate::plan::RunPlan;
use crate::report::{Report, ReportAggregator};

/// Reported once per device, when it reaches a terminal state.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    /// Zero-based position in the inventory.
    pub index: usize,
    pub total: usize,
    pub device: &'a Device,
    pub state: &'a DeviceState,
}

/// Interactive menu options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CheckPorts,
    ShapingReport,
    Exit,
}

impl MenuChoice {
    /// The run plan behind a menu option; `None` for `Exit`.
    pub fn plan(self) -> Option<RunPlan> {
        match self {
            Self::CheckPorts => Some(RunPlan::ports()),
            Self::ShapingReport => Some(RunPlan::shaping()),
            Self::Exit => None,
        }
    }
}

/// The interactive front end driven by [`Orchestrator::run_interactive`].
pub trait Menu {
    fn choose(&mut self) -> Result<MenuChoice, CoreError>;

    fn progress(&mut self, _event: &ProgressEvent<'_>) {}

    fn show(&mut self, report: &Report) -> Result<(), CoreError>;
}

type SharedSession<S> = Arc<Mutex<S>>;

/// Everything a blocking inspection needs, cloned into each worker.
struct RunContext<E: CommandExecutor> {
    executor: Arc<E>,
    settings: Arc<AuditSettings>,
    plan: Arc<RunPlan>,
    hub: Option<SharedSession<E::Session>>,
}

impl<E: CommandExecutor> Clone for RunContext<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            settings: Arc::clone(&self.settings),
            plan: Arc::clone(&self.plan),
            hub: self.hub.clone(),
        }
    }
}

/// Terminal result of one device.
enum DeviceRun {
    Classified {
        device_class: Option<String>,
        diagnostic: DiagnosticResult,
        outcome: ClassificationOutcome,
    },
    Unclassified(DeviceState),
}

impl DeviceRun {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Unclassified(DeviceState::ConnectFailed {
            reason: reason.into(),
        })
    }
}

/// Drives audit runs over an inventory snapshot.
pub struct Orchestrator<E: CommandExecutor> {
    executor: Arc<E>,
    settings: Arc<AuditSettings>,
}

impl<E: CommandExecutor> Orchestrator<E> {
    pub fn new(executor: E, settings: AuditSettings) -> Self {
        Self {
            executor: Arc::new(executor),
            settings: Arc::new(settings),
        }
    }

    pub async fn run_once(&self, devices: &[Device], plan: &RunPlan) -> Report {
        self.run_once_with(devices, plan, |_| {}).await
    }

    /// One pass, reporting each device's terminal state to `progress`.
    pub async fn run_once_with<F>(&self, devices: &[Device], plan: &RunPlan, mut progress: F) -> Report
    where
        F: FnMut(&ProgressEvent<'_>),
    {
        let settings = &self.settings;
        let mut aggregator = ReportAggregator::new(plan.clone(), settings.shaper_threshold_mbps);
        info!(plan = %plan, devices = devices.len(), "starting audit run");

        let hub = if plan.needs_hub() {
            match settings.hub.as_ref() {
                Some(hub) => {
                    let session = self.open_hub(hub).await;
                    if session.is_none() {
                        aggregator.mark_hub_unavailable();
                    }
                    session
                }
                None => {
                    debug!("no hub configured, downstream bandwidth stays unknown");
                    None
                }
            }
        } else {
            None
        };

        let ctx = RunContext {
            executor: Arc::clone(&self.executor),
            settings: Arc::clone(settings),
            plan: Arc::new(plan.clone()),
            hub: hub.clone(),
        };
        let started = Instant::now();
        let total = devices.len();

        let mut results = stream::iter(devices.iter().enumerate())
            .map(|(index, device)| {
                let ctx = ctx.clone();
                async move { (index, device, run_device(ctx, device, started).await) }
            })
            .buffered(settings.concurrency.max(1));

        while let Some((index, device, run)) = results.next().await {
            match run {
                DeviceRun::Classified {
                    device_class,
                    diagnostic,
                    outcome,
                } => {
                    let state = DeviceState::Classified {
                        flagged: outcome.is_flagged(),
                        undetermined: !outcome.undetermined(plan).is_empty(),
                        partial: diagnostic.has_gaps(),
                    };
                    progress(&ProgressEvent {
                        index,
                        total,
                        device,
                        state: &state,
                    });
                    aggregator.record(device.clone(), device_class, diagnostic, outcome);
                }
                DeviceRun::Unclassified(state) => {
                    progress(&ProgressEvent {
                        index,
                        total,
                        device,
                        state: &state,
                    });
                    aggregator.record_unclassified(device.clone(), state);
                }
            }
        }
        drop(results);

        if let Some(hub) = hub {
            let _ = tokio::task::spawn_blocking(move || {
                hub.lock().unwrap_or_else(PoisonError::into_inner).close();
            })
            .await;
        }

        let report = aggregator.summary();
        info!(
            classified = report.counters.classified,
            flagged = report.counters.flagged,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "audit run complete"
        );
        report
    }

    /// Menu loop: run the chosen plan and show its report until `Exit`.
    pub async fn run_interactive<M: Menu>(&self, devices: &[Device], menu: &mut M) -> Result<(), CoreError> {
        loop {
            let Some(plan) = menu.choose()?.plan() else {
                return Ok(());
            };
            let report = self
                .run_once_with(devices, &plan, |event| menu.progress(event))
                .await;
            menu.show(&report)?;
        }
    }

    /// Open the shared hub session; failures are logged once and yield `None`.
    async fn open_hub(&self, hub: &HubConfig) -> Option<SharedSession<E::Session>> {
        let executor = Arc::clone(&self.executor);
        let address = hub.address.clone();
        let opened = tokio::time::timeout(
            self.settings.device_timeout,
            tokio::task::spawn_blocking(move || executor.open(&address)),
        )
        .await;

        let reason = match opened {
            Ok(Ok(Ok(session))) => {
                info!(hub = %hub.address, "hub session established");
                return Some(Arc::new(Mutex::new(session)));
            }
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(e)) => format!("worker failed: {e}"),
            Err(_) => format!("timed out after {}s", self.settings.device_timeout.as_secs()),
        };
        warn!(hub = %hub.address, reason = %reason, "hub unavailable, downstream bandwidth will be unknown");
        None
    }
}

/// Filter one device and, if in scope, inspect it on the blocking pool.
async fn run_device<E: CommandExecutor>(ctx: RunContext<E>, device: &Device, started: Instant) -> DeviceRun {
    if let Some(state) = prefilter(device, &ctx) {
        if state == DeviceState::SkippedUnreachable {
            info!(system_ip = %device.system_ip, hostname = %device.hostname, "device offline, skipping");
        } else {
            debug!(system_ip = %device.system_ip, hostname = %device.hostname, state = %state.label(), "device filtered");
        }
        return DeviceRun::Unclassified(state);
    }

    if ctx.settings.run_deadline.is_some_and(|deadline| started.elapsed() >= deadline) {
        warn!(system_ip = %device.system_ip, hostname = %device.hostname, "run deadline exceeded before device started");
        return DeviceRun::failed("run deadline exceeded");
    }

    info!(system_ip = %device.system_ip, hostname = %device.hostname, "connecting");
    let timeout: Duration = ctx.settings.device_timeout;
    let owned = device.clone();
    let inspection = tokio::task::spawn_blocking(move || inspect(&ctx, &owned));

    match tokio::time::timeout(timeout, inspection).await {
        Ok(Ok(run)) => run,
        Ok(Err(e)) => {
            warn!(system_ip = %device.system_ip, error = %e, "inspection worker failed");
            DeviceRun::failed(format!("worker failed: {e}"))
        }
        Err(_) => {
            warn!(system_ip = %device.system_ip, hostname = %device.hostname, timeout_secs = timeout.as_secs(), "inspection timed out");
            DeviceRun::failed(format!("inspection timed out after {}s", timeout.as_secs()))
        }
    }
}

/// Role, hardware class and reachability gates, in that order.
fn prefilter<E: CommandExecutor>(device: &Device, ctx: &RunContext<E>) -> Option<DeviceState> {
    if !device.is_edge() {
        return Some(DeviceState::FilteredOut {
            reason: "not an edge router".into(),
        });
    }
    if ctx.plan.restrict_to_models && device.device_class(&ctx.settings.model_codes).is_none() {
        return Some(DeviceState::FilteredOut {
            reason: "hardware model not in scope".into(),
        });
    }
    if !device.reachability.is_reachable() {
        return Some(DeviceState::SkippedUnreachable);
    }
    None
}

/// Blocking: open a session, collect diagnostics, classify.
fn inspect<E: CommandExecutor>(ctx: &RunContext<E>, device: &Device) -> DeviceRun {
    let mut session = match ctx.executor.open(&device.system_ip) {
        Ok(session) => session,
        Err(e) => {
            warn!(system_ip = %device.system_ip, hostname = %device.hostname, error = %e, "connection failed");
            return DeviceRun::failed(e.to_string());
        }
    };

    let settings = &ctx.settings;
    let postcode = parse::parse_postcode(&device.hostname, settings.postcode.delimiter, settings.postcode.index);
    let mut diagnostic = DiagnosticResult::new(postcode);
    let mut runner = Runner {
        session: &mut session,
        device,
        broken: None,
    };

    collect(ctx, device, &mut runner, &mut diagnostic);
    session.close();

    let device_class = device.device_class(&settings.model_codes).map(str::to_owned);
    let outcome = classify(
        device_class.as_deref(),
        &diagnostic,
        &ctx.plan,
        &settings.ports,
        settings.shaper_threshold_mbps,
    );
    diagnostic.liveness = outcome.liveness;

    if diagnostic.has_gaps() {
        debug!(system_ip = %device.system_ip, gaps = diagnostic.gaps.len(), "partial diagnostics");
    }
    DeviceRun::Classified {
        device_class,
        diagnostic,
        outcome,
    }
}

/// Issue the plan's commands. Each failure only blanks its own field.
fn collect<E: CommandExecutor>(
    ctx: &RunContext<E>,
    device: &Device,
    runner: &mut Runner<'_, E::Session>,
    diagnostic: &mut DiagnosticResult,
) {
    let plan = &ctx.plan;
    let settings = &ctx.settings;

    if plan.needs_interface_status() {
        match runner.run(commands::SHOW_INTERFACE_STATUS) {
            Ok(text) => {
                let rows = parse::parse_interface_status(&text);
                if rows.is_empty() {
                    diagnostic.record_gap("interfaces", "no interface status table in output");
                } else {
                    diagnostic.interfaces = Some(rows);
                }
            }
            Err(reason) => diagnostic.record_gap("interfaces", reason),
        }
    }

    if plan.needs_shaping_rate() {
        match runner.run(commands::SHOW_SHAPING_RATE) {
            Ok(text) => {
                let parsed = parse::parse_shaping_rate(&text);
                diagnostic.shaping_rate = shaper_rate(&text, parsed, "shaping_rate", diagnostic);
            }
            Err(reason) => diagnostic.record_gap("shaping_rate", reason),
        }
    }

    if plan.needs_wan_ip() {
        let cef = runner.run(&commands::show_cef(settings.wan_probe));
        let brief = runner.run(commands::SHOW_IP_INTERFACE_BRIEF);
        match (cef, brief) {
            (Ok(cef), Ok(brief)) => {
                diagnostic.wan_ip = parse::parse_wan_ip(&cef, &brief, &settings.internal_range);
                if diagnostic.wan_ip.is_none() {
                    diagnostic.record_gap("wan_ip", "no WAN address resolved for probe route");
                }
            }
            (Err(reason), _) | (_, Err(reason)) => diagnostic.record_gap("wan_ip", reason),
        }
    }

    if plan.needs_hub() {
        diagnostic.downstream = downstream(ctx, device, diagnostic);
    }
}

/// Hub-side QoS target for this spoke. `Unknown` without hub or WAN address.
fn downstream<E: CommandExecutor>(ctx: &RunContext<E>, device: &Device, diagnostic: &mut DiagnosticResult) -> Rate {
    let (Some(hub), Some(tunnel)) = (ctx.hub.as_ref(), ctx.settings.hub.as_ref().map(|h| h.tunnel.as_str())) else {
        return Rate::Unknown;
    };
    let Some(wan_ip) = diagnostic.wan_ip else {
        diagnostic.record_gap("downstream", "WAN address unknown");
        return Rate::Unknown;
    };

    let command = commands::show_hub_qos(tunnel, wan_ip);
    let result = hub.lock().unwrap_or_else(PoisonError::into_inner).run(&command);
    match result {
        Ok(text) => shaper_rate(&text, parse::parse_downstream_rate(&text), "downstream", diagnostic),
        Err(e) => {
            warn!(system_ip = %device.system_ip, %wan_ip, error = %e, "hub QoS lookup failed");
            diagnostic.record_gap("downstream", e.to_string());
            Rate::Unknown
        }
    }
}

/// A marker line whose value does not parse is a gap, not an absent shaper.
fn shaper_rate(text: &str, parsed: Option<u64>, field: &'static str, diagnostic: &mut DiagnosticResult) -> Rate {
    if parsed.is_none() && parse::has_shape_marker(text) {
        diagnostic.record_gap(field, "unparseable shaper line");
        return Rate::Unknown;
    }
    Rate::from_parsed(parsed)
}

/// Runs commands on one session, short-circuiting once the session is gone.
struct Runner<'a, S: CommandSession> {
    session: &'a mut S,
    device: &'a Device,
    broken: Option<String>,
}

impl<S: CommandSession> Runner<'_, S> {
    fn run(&mut self, command: &str) -> Result<String, String> {
        if let Some(reason) = &self.broken {
            return Err(format!("session lost: {reason}"));
        }
        self.session.run(command).map_err(|e| {
            warn!(system_ip = %self.device.system_ip, command, error = %e, "command failed");
            let reason = e.to_string();
            if !e.is_command_scoped() {
                self.broken = Some(reason.clone());
            }
            reason
        })
    }
}
