//! Workflow job handler - reports finished GitHub Actions jobs.

use super::workflow_run::conclusion_color;
use super::{Handler, HandlerError};
use crate::config::AppConfig;
use crate::discord::{format_duration, status_text, truncate, DeliverySink, Embed, EmbedField};
use crate::event::EventType;
use crate::payload::{JobStep, RunStatus, WorkflowJobPayload};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Discord rejects field values longer than 1024 characters
const FIELD_LIMIT: usize = 1024;

pub struct WorkflowJobHandler {
    config: Arc<AppConfig>,
    sink: Arc<dyn DeliverySink>,
}

impl WorkflowJobHandler {
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn DeliverySink>) -> Self {
        Self { config, sink }
    }

    fn build_embed(&self, payload: &WorkflowJobPayload) -> Embed {
        let options = &self.config.events_config.workflow_job;
        let job = &payload.workflow_job;
        let conclusion = job.conclusion.as_deref();
        let status = status_text(conclusion);

        let mut fields = vec![
            EmbedField::new("Status", format!("`{}`", status), true),
            EmbedField::new(
                "Duration",
                format_duration(job.started_at.as_deref(), job.completed_at.as_deref()),
                true,
            ),
        ];

        if options.show_runner {
            if let Some(runner) = &job.runner_name {
                fields.push(EmbedField::new("Runner", format!("`{}`", runner), true));
            }
        }

        if options.show_steps && !job.steps.is_empty() {
            // The closing fence must survive truncation
            let fence = "```diff\n\n```".chars().count();
            let steps = format_steps(&job.steps);
            fields.push(EmbedField::new(
                "Steps",
                format!("```diff\n{}\n```", truncate(&steps, FIELD_LIMIT - fence)),
                false,
            ));
        }

        Embed::new(format!("Job {}: {}", job.name, status))
            .with_url(job.html_url.clone())
            .with_description(format!(
                "Job [{}]({}) finished in [`{}`]({})",
                job.name,
                job.html_url,
                payload.repository.full_name,
                payload.repository.url()
            ))
            .with_color(conclusion_color(conclusion, options.embed_color))
            .with_fields(fields)
            .with_footer(format!("Job #{}", job.id))
            .with_sender(&payload.sender)
    }
}

/// One `diff`-highlighted line per step: `+` passed, `-` failed, blank otherwise.
fn format_steps(steps: &[JobStep]) -> String {
    steps
        .iter()
        .map(|step| {
            let marker = match step.conclusion.as_deref() {
                Some("success") => '+',
                Some("failure") => '-',
                _ => ' ',
            };
            format!("{} {}", marker, step.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Handler for WorkflowJobHandler {
    fn name(&self) -> &str {
        "workflow-job"
    }

    fn events(&self) -> &[EventType] {
        &[EventType::WorkflowJob]
    }

    async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
        if !self.config.events.is_enabled(EventType::WorkflowJob) {
            debug!("Workflow job notifications disabled, skipping");
            return Ok(());
        }

        let payload = WorkflowJobPayload::deserialize(payload)?;
        if payload.workflow_job.status != RunStatus::Completed {
            debug!(
                action = %payload.action,
                job_id = payload.workflow_job.id,
                "Workflow job not completed yet, skipping"
            );
            return Ok(());
        }

        let embed = self.build_embed(&payload);
        self.sink.deliver(embed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::RecordingSink;
    use serde_json::json;

    fn payload(status: &str) -> Value {
        json!({
            "action": "completed",
            "workflow_job": {
                "id": 5,
                "name": "test",
                "status": status,
                "conclusion": "success",
                "html_url": "https://github.com/org/repo/actions/runs/1/job/5",
                "started_at": "2025-01-01T10:00:00Z",
                "completed_at": "2025-01-01T10:00:45Z",
                "runner_name": "ubuntu-22",
                "steps": [
                    {"name": "checkout", "status": "completed", "conclusion": "success"},
                    {"name": "cargo test", "status": "completed", "conclusion": "failure"},
                    {"name": "upload", "status": "completed", "conclusion": "skipped"}
                ]
            },
            "repository": {"full_name": "org/repo"},
            "sender": {"login": "alice"}
        })
    }

    fn handler(config: AppConfig) -> (WorkflowJobHandler, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (WorkflowJobHandler::new(Arc::new(config), sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_completed_job() {
        let (handler, sink) = handler(AppConfig::default());
        handler.execute(&payload("completed")).await.unwrap();

        let sent = sink.sent();
        let embed = &sent[0];
        assert_eq!(embed.title.as_deref(), Some("Job test: SUCCESS"));
        assert_eq!(embed.color, Some(0x57F287));

        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Status", "Duration", "Runner"]);
        assert_eq!(embed.fields[1].value, "45s");
        assert_eq!(embed.fields[2].value, "`ubuntu-22`");
    }

    #[tokio::test]
    async fn test_steps_field() {
        let mut config = AppConfig::default();
        config.events_config.workflow_job.show_steps = true;
        config.events_config.workflow_job.show_runner = false;
        let (handler, sink) = handler(config);

        handler.execute(&payload("completed")).await.unwrap();

        let steps = sink.sent()[0].fields.last().cloned().unwrap();
        assert_eq!(steps.name, "Steps");
        assert_eq!(
            steps.value,
            "```diff\n+ checkout\n- cargo test\n  upload\n```"
        );
    }

    #[tokio::test]
    async fn test_queued_job_is_skipped() {
        let (handler, sink) = handler(AppConfig::default());
        handler.execute(&payload("queued")).await.unwrap();
        assert!(sink.sent().is_empty());
    }
}
