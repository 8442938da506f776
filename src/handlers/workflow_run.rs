//! Workflow run handler - reports finished GitHub Actions runs.

use super::{Handler, HandlerError};
use crate::config::AppConfig;
use crate::discord::{format_duration, status_text, DeliverySink, Embed, EmbedField};
use crate::event::EventType;
use crate::payload::{RunStatus, WorkflowRunPayload};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const SUCCESS_COLOR: u32 = 0x57F287;
const FAILURE_COLOR: u32 = 0xED4245;

/// Embed color for a run or job conclusion; neutral conclusions keep `fallback`.
pub(crate) fn conclusion_color(conclusion: Option<&str>, fallback: u32) -> u32 {
    match conclusion {
        Some("success") => SUCCESS_COLOR,
        Some("failure") => FAILURE_COLOR,
        _ => fallback,
    }
}

pub struct WorkflowRunHandler {
    config: Arc<AppConfig>,
    sink: Arc<dyn DeliverySink>,
}

impl WorkflowRunHandler {
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn DeliverySink>) -> Self {
        Self { config, sink }
    }

    fn build_embed(&self, payload: &WorkflowRunPayload) -> Embed {
        let options = &self.config.events_config.workflow_run;
        let run = &payload.workflow_run;
        let conclusion = run.conclusion.as_deref();
        let status = status_text(conclusion);

        let mut description = format!(
            "Workflow [{}]({}) finished in [`{}`]({})",
            run.name,
            run.html_url,
            payload.repository.full_name,
            payload.repository.url()
        );
        if let Some(branch) = &run.head_branch {
            description.push_str(&format!(" on `{}`", branch));
        }

        let mut fields = Vec::new();
        let mut color = options.embed_color;

        if options.show_conclusion {
            fields.push(EmbedField::new("Status", format!("`{}`", status), true));
            color = conclusion_color(conclusion, color);
        }

        if options.show_duration {
            let started = run.run_started_at.as_deref().or(run.created_at.as_deref());
            fields.push(EmbedField::new(
                "Duration",
                format_duration(started, run.updated_at.as_deref()),
                true,
            ));
        }

        Embed::new(format!("Workflow {}: {}", run.name, status))
            .with_url(run.html_url.clone())
            .with_description(description)
            .with_color(color)
            .with_fields(fields)
            .with_footer(format!("Run #{}", run.id))
            .with_sender(&payload.sender)
    }
}

#[async_trait]
impl Handler for WorkflowRunHandler {
    fn name(&self) -> &str {
        "workflow-run"
    }

    fn events(&self) -> &[EventType] {
        &[EventType::WorkflowRun]
    }

    async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
        if !self.config.events.is_enabled(EventType::WorkflowRun) {
            debug!("Workflow run notifications disabled, skipping");
            return Ok(());
        }

        let payload = WorkflowRunPayload::deserialize(payload)?;
        if payload.workflow_run.status != RunStatus::Completed {
            debug!(
                action = %payload.action,
                run_id = payload.workflow_run.id,
                "Workflow run not completed yet, skipping"
            );
            return Ok(());
        }

        let embed = self.build_embed(&payload);
        self.sink.deliver(embed).await?;
        Ok(())
    }
}
