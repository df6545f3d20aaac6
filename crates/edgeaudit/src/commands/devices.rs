//! `devices`: the manager inventory as this tool sees it.

use tabled::Tabled;

use edgeaudit_core::{Device, DeviceRole, Inventory};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "System IP")]
    system_ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            system_ip: d.system_ip.clone(),
            hostname: d.hostname.clone(),
            serial: d.serial.clone(),
            role: role_name(d.role).into(),
            model: d.model.clone().unwrap_or_default(),
            state: if d.reachability.is_reachable() {
                "reachable".into()
            } else {
                "offline".into()
            },
        }
    }
}

fn role_name(role: DeviceRole) -> &'static str {
    match role {
        DeviceRole::Edge => "edge",
        DeviceRole::Controller => "controller",
        DeviceRole::Manager => "manager",
        DeviceRole::Validator => "validator",
        _ => "other",
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile_name, profile) = config::effective_profile(global)?;
    let controller = config::resolve_controller(&profile, &profile_name, config::can_prompt())?;

    let inventory = Inventory::connect(&controller)
        .await
        .map_err(|e| CliError::from(e).with_profile(&profile_name))?;
    let devices = if args.all {
        inventory.devices().await
    } else {
        inventory.edge_devices().await
    };
    inventory.close().await;
    let devices = devices?;

    let out = output::render_list(&global.output, &devices, |d: &Device| DeviceRow::from(d), |d| {
        d.system_ip.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
