//! `ragloop ask` — Run one question through the conversation loop.

use std::path::Path;

use ragloop_agent::{AgentRuntime, StopReason};
use ragloop_core::message::{Conversation, Message};
use ragloop_gateway::NO_REPLY;
use tracing::{info, warn};

pub async fn run(config_path: Option<&Path>, message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let credentials = config.credentials()?;

    let runtime = AgentRuntime::build(&config, &credentials)?;
    runtime.preflight().await?;

    info!(model = %config.llm.model, "Asking one question");
    let mut conversation = Conversation::from_messages(vec![Message::user(message)]);

    eprint!("  Thinking...");
    let outcome = runtime.agent.run(&mut conversation).await;
    eprint!("\r              \r");
    let outcome = outcome?;

    if outcome.reply.is_empty() {
        println!("{NO_REPLY}");
    } else {
        println!("{}", outcome.reply);
    }

    if outcome.stop_reason == StopReason::MaxIterations {
        warn!(iterations = outcome.iterations, "Stopped at the iteration cap");
    }

    Ok(())
}
