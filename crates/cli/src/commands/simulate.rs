use serde::Serialize;

use ordena_agent::demo::demo_deployment;
use ordena_core::config::AppConfig;
use ordena_core::ConversationKey;

use crate::commands::{serialize_payload, CommandResult};

#[derive(Debug, Serialize)]
struct SimulationReport {
    command: &'static str,
    customer: String,
    branch: String,
    turns: Vec<SimulationTurn>,
    final_session_state: Option<String>,
}

#[derive(Debug, Serialize)]
struct SimulationTurn {
    message: String,
    reply_kind: String,
    reply: String,
}

pub fn run(
    config: &AppConfig,
    messages: Vec<String>,
    customer: String,
    branch: String,
) -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(format!("could not start runtime: {error}"), 1);
        }
    };

    let report = runtime.block_on(async {
        let key = ConversationKey::new(customer.clone(), branch.clone());
        let deployment = demo_deployment(config, &key.branch_id).await;

        let mut turns = Vec::with_capacity(messages.len());
        for message in messages {
            let reply = deployment.router.handle_message(&key, &message).await;
            turns.push(SimulationTurn {
                message,
                reply_kind: format!("{:?}", reply.kind),
                reply: reply.text,
            });
        }

        let final_session_state = deployment
            .router
            .lifecycle()
            .session(&key)
            .await
            .map(|session| format!("{:?}", session.state));

        SimulationReport { command: "simulate", customer, branch, turns, final_session_state }
    });

    CommandResult::success(serialize_payload(&report))
}
