use serde::Serialize;

use ordena_core::config::AppConfig;

use crate::commands::{serialize_payload, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigReport {
    command: &'static str,
    reminder_secs: u64,
    cancellation_secs: u64,
    delivery_fee: String,
    branch_hours: String,
    log_level: String,
}

pub fn run(config: &AppConfig) -> CommandResult {
    let report = ConfigReport {
        command: "config",
        reminder_secs: config.timers.reminder_secs,
        cancellation_secs: config.timers.cancellation_secs,
        delivery_fee: config.branch.delivery_fee.to_string(),
        branch_hours: config.branch.hours.clone(),
        log_level: config.logging.level.clone(),
    };
    CommandResult::success(serialize_payload(&report))
}
