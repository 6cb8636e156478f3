//! PostgREST client for a Supabase-hosted project store.
//!
//! Every request carries the `apikey` header plus a bearer token (the
//! user's access token when configured, otherwise the anon key). Tables
//! live under `<url>/rest/v1/<table>` and rows are filtered with
//! PostgREST operators (`id=eq.<id>`).

use crate::backend::{ProjectBackend, ProjectData, validate_title, validate_update};
use crate::config::SupabaseConfig;
use crate::error::{Result, SyncError};
use crate::rows::{ConnectionRow, NewProjectRow, ProjectRow, StepRow, steps_from_rows};
use jf_core::id::{ConnectionId, ProjectId};
use jf_core::model::{Project, ProjectUpdate};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

const PROJECTS: &str = "projects";
const STEPS: &str = "journey_steps";
const CONNECTIONS: &str = "connections";

pub struct SupabaseBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    user_id: Option<String>,
}

impl SupabaseBackend {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone(),
            user_id: config.user_id.clone(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Request whose response body is the affected rows.
    fn returning(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, table)
            .header("Prefer", "return=representation")
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let response = check(request.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<()> {
        check(request.send().await?).await?;
        Ok(())
    }

    async fn touch(&self, id: ProjectId) -> Result<()> {
        let body = serde_json::json!({ "updated_at": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true) });
        self.execute(
            self.request(Method::PATCH, PROJECTS)
                .query(&[("id", eq(id.as_str()))])
                .json(&body),
        )
        .await
    }

    async fn step_rows(&self, id: ProjectId) -> Result<Vec<StepRow>> {
        self.rows(self.request(Method::GET, STEPS).query(&[
            ("select", "*".to_string()),
            ("project_id", eq(id.as_str())),
            ("order", "order_index.asc".to_string()),
        ]))
        .await
    }

    async fn connection_rows(&self, id: ProjectId) -> Result<Vec<ConnectionRow>> {
        self.rows(self.request(Method::GET, CONNECTIONS).query(&[
            ("select", "*".to_string()),
            ("project_id", eq(id.as_str())),
        ]))
        .await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Turn a non-success response into [`SyncError::Remote`], using the
/// PostgREST `message` field when the body has one.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::Remote {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error").and_then(|e| e.get("message").or(Some(e))))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn first<T>(rows: Vec<T>, what: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| SyncError::NotFound(what.to_string()))
}

#[async_trait::async_trait]
impl ProjectBackend for SupabaseBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "updated_at.desc".to_string()),
        ];
        if let Some(user) = &self.user_id {
            query.push(("user_id", eq(user)));
        }
        let rows: Vec<ProjectRow> = self
            .rows(self.request(Method::GET, PROJECTS).query(&query))
            .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, title: &str, description: Option<&str>) -> Result<Project> {
        let row = NewProjectRow {
            title: validate_title(title)?,
            description: description.map(str::to_string),
            user_id: self.user_id.clone(),
            is_public: false,
        };
        let rows: Vec<ProjectRow> = self
            .rows(self.returning(Method::POST, PROJECTS).json(&[row]))
            .await?;
        let project = Project::from(first(rows, "created project")?);
        log::info!("created project {} ({})", project.id, project.title);
        Ok(project)
    }

    async fn load_project(&self, id: ProjectId) -> Result<Project> {
        let rows: Vec<ProjectRow> = self
            .rows(
                self.request(Method::GET, PROJECTS)
                    .query(&[("select", "*".to_string()), ("id", eq(id.as_str()))]),
            )
            .await?;
        Ok(first(rows, &format!("project {id}"))?.into())
    }

    async fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> Result<Project> {
        let update = validate_update(update)?;
        let rows: Vec<ProjectRow> = self
            .rows(
                self.returning(Method::PATCH, PROJECTS)
                    .query(&[("id", eq(id.as_str()))])
                    .json(&update),
            )
            .await?;
        Ok(first(rows, &format!("project {id}"))?.into())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.execute(
            self.request(Method::DELETE, PROJECTS)
                .query(&[("id", eq(id.as_str()))]),
        )
        .await
    }

    async fn load_project_data(&self, id: ProjectId) -> Option<ProjectData> {
        let (steps, connections) = tokio::join!(self.step_rows(id), self.connection_rows(id));
        match (steps, connections) {
            (Ok(steps), Ok(connections)) => Some(ProjectData {
                steps: steps_from_rows(steps),
                connections: connections
                    .into_iter()
                    .map(ConnectionRow::into_connection)
                    .collect(),
            }),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("error loading project data for {id}: {e}");
                None
            }
        }
    }

    async fn save_project(&self, id: ProjectId, data: &ProjectData) -> Result<()> {
        if !data.steps.is_empty()
            && let Err(e) = self
                .execute(
                    self.request(Method::DELETE, STEPS)
                        .query(&[("project_id", eq(id.as_str()))]),
                )
                .await
        {
            log::warn!("error deleting old steps of {id}: {e}");
        }
        if !data.connections.is_empty()
            && let Err(e) = self
                .execute(
                    self.request(Method::DELETE, CONNECTIONS)
                        .query(&[("project_id", eq(id.as_str()))]),
                )
                .await
        {
            log::warn!("error deleting old connections of {id}: {e}");
        }

        if !data.steps.is_empty() {
            let rows: Vec<StepRow> = data
                .steps
                .iter()
                .enumerate()
                .map(|(i, s)| StepRow::from_step(id, i, s))
                .collect();
            self.execute(self.request(Method::POST, STEPS).json(&rows))
                .await
                .map_err(|e| with_context(e, "failed to save steps"))?;
        }
        if !data.connections.is_empty() {
            let rows: Vec<ConnectionRow> = data
                .connections
                .iter()
                .map(|c| ConnectionRow::from_connection(id, c))
                .collect();
            self.execute(self.request(Method::POST, CONNECTIONS).json(&rows))
                .await
                .map_err(|e| with_context(e, "failed to save connections"))?;
        }

        if let Err(e) = self.touch(id).await {
            log::warn!("error updating timestamp of {id}: {e}");
        }
        log::info!(
            "saved project {id}: {} steps, {} connections",
            data.steps.len(),
            data.connections.len()
        );
        Ok(())
    }

    async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
        self.execute(
            self.request(Method::DELETE, CONNECTIONS)
                .query(&[("id", eq(id.as_str()))]),
        )
        .await
    }
}

fn with_context(e: SyncError, what: &str) -> SyncError {
    match e {
        SyncError::Remote { status, message } => SyncError::Remote {
            status,
            message: format!("{what}: {message}"),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backend(url: &str) -> SupabaseBackend {
        SupabaseBackend::new(&SupabaseConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        assert_eq!(
            backend("https://demo.supabase.co/").table_url("journey_steps"),
            "https://demo.supabase.co/rest/v1/journey_steps"
        );
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = SupabaseBackend::new(&SupabaseConfig {
            url: "https://demo.supabase.co".into(),
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn postgrest_error_message_is_extracted() {
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(error_message(r#"{"error":"bad token"}"#), "bad token");
        assert_eq!(error_message(" gateway timeout \n"), "gateway timeout");
    }
}
