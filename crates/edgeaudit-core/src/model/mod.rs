// ── Domain model ──
//
// Canonical types shared by the parsers, classifier, orchestrator and report.

pub mod device;
pub mod diagnostic;
pub mod outcome;

pub use device::{Device, DeviceRole, Reachability};
pub use diagnostic::{DiagnosticResult, FieldGap, InterfaceStatus, Liveness, Rate};
pub use outcome::{ClassificationOutcome, DeviceState};
