use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dayplan_core::{
    resolve_estimate, Complexity, PlannerBackend, Priority, SessionDescriptor, Task, TaskStatus,
    WireId,
};
use serde::{Deserialize, Serialize};

/// REST client for the planner backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "planner request");
        url
    }
}

/// Task row as the backend serializes it.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    id: WireId,
    title: String,
    category: Option<String>,
    priority: Option<String>,
    deadline: Option<DateTime<Utc>>,
    manual_time: Option<f64>,
    ml_predicted_time: Option<f64>,
    default_expected_time: Option<f64>,
    complexity: Option<String>,
    progress: Option<f64>,
    status: Option<String>,
}

impl TaskRecord {
    fn into_task(self) -> Task {
        let minutes = |v: Option<f64>| v.map(|m| m.round() as i32);
        let estimate = resolve_estimate(
            minutes(self.manual_time),
            minutes(self.ml_predicted_time),
            minutes(self.default_expected_time),
        );

        let mut task = Task::new(self.id.into_string(), self.title)
            .with_duration(estimate)
            .with_status(status_from_wire(self.status.as_deref()));
        if let Some(category) = self.category {
            task = task.with_category(category);
        }
        if let Some(p) = self.priority.as_deref() {
            task = task.with_priority(Priority::parse_lenient(p));
        }
        if let Some(c) = self.complexity.as_deref() {
            task.complexity = Complexity::parse_lenient(c);
        }
        task.deadline = self.deadline;
        task.set_progress(self.progress.unwrap_or(0.0).round() as i64);
        task
    }
}

fn status_from_wire(raw: Option<&str>) -> TaskStatus {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) if s == "completed" => TaskStatus::Completed,
        Some(s) if s == "in-progress" || s == "in progress" || s == "inprogress" => {
            TaskStatus::InProgress
        }
        _ => TaskStatus::Pending,
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Serialize)]
struct ProgressRequest {
    progress: u8,
}

#[derive(Serialize)]
struct StatusRequest {
    status: TaskStatus,
    actual_time: i32,
}

async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("{what} failed: {status} {txt}");
    }
    Ok(resp)
}

#[async_trait]
impl PlannerBackend for HttpBackend {
    async fn fetch_schedule(&self, user_id: &str) -> Result<Vec<SessionDescriptor>> {
        let resp = self
            .client
            .post(self.url("schedule/generate"))
            .json(&GenerateRequest { user_id })
            .send()
            .await
            .context("schedule request")?;
        let resp = check(resp, "schedule generate").await?;
        // The backend answers `null` when the scheduler produced nothing.
        let sessions: Option<Vec<SessionDescriptor>> =
            resp.json().await.context("parse schedule response")?;
        let sessions = sessions.unwrap_or_default();
        tracing::debug!(user_id, sessions = sessions.len(), "schedule received");
        Ok(sessions)
    }

    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let resp = self
            .client
            .get(self.url(&format!("tasks/{user_id}")))
            .send()
            .await
            .context("tasks request")?;
        let resp = check(resp, "fetch tasks").await?;
        let records: Vec<TaskRecord> = resp.json().await.context("parse tasks response")?;
        Ok(records.into_iter().map(TaskRecord::into_task).collect())
    }

    async fn fetch_task(&self, task_id: &str) -> Result<Task> {
        let resp = self
            .client
            .get(self.url(&format!("tasks/details/{task_id}")))
            .send()
            .await
            .context("task details request")?;
        let resp = check(resp, "fetch task").await?;
        let record: TaskRecord = resp.json().await.context("parse task response")?;
        Ok(record.into_task())
    }

    async fn update_progress(&self, task_id: &str, percent: u8) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&format!("tasks/{task_id}/progress")))
            .json(&ProgressRequest { progress: percent })
            .send()
            .await
            .context("progress request")?;
        check(resp, "update progress").await?;
        Ok(())
    }

    async fn mark_completed(&self, task_id: &str, actual_minutes: i32) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&format!("tasks/{task_id}/status")))
            .json(&StatusRequest {
                status: TaskStatus::Completed,
                actual_time: actual_minutes,
            })
            .send()
            .await
            .context("status request")?;
        check(resp, "mark completed").await?;
        Ok(())
    }
}
