//! Inspection core between `edgeaudit-api` and the `edgeaudit` CLI.
//!
//! This crate owns the domain model and the per-device inspection protocol:
//!
//! - **[`Inventory`]** : Manager session facade: logs in, pulls the device
//!   list once per run, and converts it into immutable [`Device`] snapshots.
//!
//! - **[`parse`]** : Total text parsers for the show-command output the
//!   audit relies on (shaping rate, interface status, WAN address, hub QoS
//!   target, hostname postcode). Missing structure yields `None`, never an
//!   error.
//!
//! - **[`classify`]** : Pure, independent judgments (port disable, shaper
//!   threshold, liveness) composed per run from a [`RunPlan`].
//!
//! - **[`Orchestrator`]** : Drives one pass over the inventory through a
//!   [`CommandExecutor`], isolating per-device failures and sharing one
//!   optional hub session, then hands results to the [`ReportAggregator`].
//!
//! - **[`Report`]** : Ordered, de-duplicated outcome of a run, renderable as
//!   fixed-width text or serialized for structured output.

pub mod classify;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod model;
pub mod orchestrator;
pub mod parse;
pub mod plan;
pub mod report;
pub mod ssh;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    AuditSettings, ControllerConfig, HubConfig, Ipv4Range, PortPolicy, PostcodeRule,
    SshCredentials, TlsVerification,
};
pub use error::CoreError;
pub use executor::{CommandExecutor, CommandSession, ExecError};
pub use inventory::Inventory;
pub use orchestrator::{Menu, MenuChoice, Orchestrator, ProgressEvent};
pub use plan::{Check, RunPlan};
pub use report::{Report, ReportAggregator, ReportEntry, RunCounters, UnclassifiedDevice};
pub use ssh::SshExecutor;

pub use model::{
    ClassificationOutcome, Device, DeviceRole, DeviceState, DiagnosticResult, FieldGap,
    InterfaceStatus, Liveness, Rate, Reachability,
};
