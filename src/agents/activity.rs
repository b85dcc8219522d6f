use crate::agents::Responder;
use crate::error::AgentError;
use crate::manager::{timestamp, AgentState, ConnectionManager, Interaction, InteractionKind, StatusRecord};
use serde_json::Value;
use std::future::Future;
use std::time::Instant;

const EXCERPT_LEN: usize = 200;

#[derive(Debug)]
pub struct ChatOutcome {
    pub result: Result<String, AgentError>,
    /// Id of the interaction logged when the run started.
    pub interaction_id: String,
}

/// Interaction kinds logged when a run succeeds or fails.
struct Lifecycle {
    done: InteractionKind,
    failed: InteractionKind,
}

const CHAT: Lifecycle = Lifecycle {
    done: InteractionKind::ChatResponse,
    failed: InteractionKind::ChatError,
};

const TASK: Lifecycle = Lifecycle {
    done: InteractionKind::TaskComplete,
    failed: InteractionKind::TaskError,
};

/// Run `responder` on `message` while publishing its status and the
/// `chat_request`/`chat_response`/`chat_error` interactions under `agent_id`.
pub async fn run_tracked(
    manager: &ConnectionManager,
    agent_id: &str,
    responder: &dyn Responder,
    message: &str,
    metadata: Option<Value>,
) -> ChatOutcome {
    let mut request = Interaction::new(agent_id, InteractionKind::ChatRequest).with("message", message);
    if let Some(metadata) = metadata {
        request = request.with("metadata", metadata);
    }
    track(manager, agent_id, &CHAT, message, request, responder.respond(message)).await
}

/// Same bookkeeping for a named background task, logged as
/// `task_start`/`task_complete`/`task_error`.
pub async fn track_task<F>(
    manager: &ConnectionManager,
    agent_id: &str,
    task: &str,
    metadata: Option<Value>,
    work: F,
) -> ChatOutcome
where
    F: Future<Output = Result<String, AgentError>>,
{
    let mut start = Interaction::new(agent_id, InteractionKind::TaskStart).with("task", task);
    if let Some(metadata) = metadata {
        start = start.with("metadata", metadata);
    }
    track(manager, agent_id, &TASK, task, start, work).await
}

async fn track<F>(
    manager: &ConnectionManager,
    agent_id: &str,
    kinds: &Lifecycle,
    label: &str,
    start: Interaction,
    work: F,
) -> ChatOutcome
where
    F: Future<Output = Result<String, AgentError>>,
{
    let started_at = timestamp();

    let mut busy = StatusRecord::new();
    busy.insert("status".into(), AgentState::Busy.to_string().into());
    busy.insert("current_task".into(), excerpt(label).into());
    busy.insert("started_at".into(), started_at.clone().into());
    manager.update_agent_status(agent_id, busy);

    let interaction_id = manager.record_interaction(start.at(started_at));

    let clock = Instant::now();
    let result = work.await;
    let duration = clock.elapsed().as_secs_f64();

    let mut status = StatusRecord::new();
    status.insert("last_message".into(), excerpt(label).into());
    status.insert("last_task_duration".into(), duration.into());
    match &result {
        Ok(response) => {
            status.insert("status".into(), AgentState::Idle.to_string().into());
            status.insert("last_response".into(), excerpt(response).into());
            manager.update_agent_status(agent_id, status);
            manager.record_interaction(
                Interaction::new(agent_id, kinds.done)
                    .with("request_id", interaction_id.as_str())
                    .with("response", excerpt(response))
                    .with("duration", duration)
                    .with("success", true),
            );
        }
        Err(e) => {
            log::warn!("Agent {} failed: {}", agent_id, e);
            status.insert("status".into(), AgentState::Error.to_string().into());
            status.insert("last_error".into(), e.to_string().into());
            manager.update_agent_status(agent_id, status);
            manager.record_interaction(
                Interaction::new(agent_id, kinds.failed)
                    .with("request_id", interaction_id.as_str())
                    .with("error", e.to_string())
                    .with("duration", duration)
                    .with("success", false),
            );
        }
    }

    ChatOutcome {
        result,
        interaction_id,
    }
}

/// First 200 characters, on a char boundary.
pub(crate) fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
