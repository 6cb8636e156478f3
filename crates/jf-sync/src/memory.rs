//! In-process project store with failure injection.
//!
//! Stores the same rows the remote store would, so geometry rounding and
//! `order_index` ordering behave identically. Any operation can be made to
//! fail once or until healed.

use crate::backend::{ProjectBackend, ProjectData, validate_title, validate_update};
use crate::error::{Result, SyncError};
use crate::rows::{ConnectionRow, StepRow, steps_from_rows};
use jf_core::id::{ConnectionId, ProjectId};
use jf_core::model::{Project, ProjectUpdate};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    List,
    Create,
    Load,
    Update,
    Delete,
    LoadData,
    Save,
    DeleteConnection,
}

#[derive(Default)]
struct State {
    /// `(project, write sequence)`; the sequence breaks `updated_at` ties.
    projects: Vec<(Project, u64)>,
    steps: Vec<StepRow>,
    connections: Vec<ConnectionRow>,
    seq: u64,
    fail_once: HashSet<FailPoint>,
    fail_always: HashSet<FailPoint>,
}

impl State {
    fn check(&mut self, point: FailPoint) -> Result<()> {
        if self.fail_always.contains(&point) || self.fail_once.remove(&point) {
            log::debug!("injected failure at {point:?}");
            return Err(SyncError::Remote {
                status: 503,
                message: format!("injected failure ({point:?})"),
            });
        }
        Ok(())
    }

    fn tick(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn project_mut(&mut self, id: ProjectId) -> Result<&mut (Project, u64)> {
        self.projects
            .iter_mut()
            .find(|(p, _)| p.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("project {id}")))
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `point` fail.
    pub async fn fail_next(&self, point: FailPoint) {
        self.state.lock().await.fail_once.insert(point);
    }

    /// Make every call to `point` fail until [`heal`](Self::heal).
    pub async fn fail_always(&self, point: FailPoint) {
        self.state.lock().await.fail_always.insert(point);
    }

    pub async fn heal(&self) {
        let mut state = self.state.lock().await;
        state.fail_once.clear();
        state.fail_always.clear();
    }

    /// Stored step rows of `project`, in insertion order.
    pub async fn step_rows(&self, project: ProjectId) -> Vec<StepRow> {
        let state = self.state.lock().await;
        state
            .steps
            .iter()
            .filter(|r| r.project_id == project.as_str())
            .cloned()
            .collect()
    }

    pub async fn connection_rows(&self, project: ProjectId) -> Vec<ConnectionRow> {
        let state = self.state.lock().await;
        state
            .connections
            .iter()
            .filter(|r| r.project_id == project.as_str())
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ProjectBackend for MemoryBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::List)?;
        let mut projects = state.projects.clone();
        projects.sort_by(|(a, sa), (b, sb)| b.updated_at.cmp(&a.updated_at).then(sb.cmp(sa)));
        Ok(projects.into_iter().map(|(p, _)| p).collect())
    }

    async fn create_project(&self, title: &str, description: Option<&str>) -> Result<Project> {
        let title = validate_title(title)?;
        let mut state = self.state.lock().await;
        state.check(FailPoint::Create)?;
        let stamp = now();
        let project = Project {
            id: ProjectId::generate(),
            title,
            description: description.map(str::to_string),
            created_at: stamp.clone(),
            updated_at: stamp,
            is_public: false,
        };
        let seq = state.tick();
        state.projects.push((project.clone(), seq));
        Ok(project)
    }

    async fn load_project(&self, id: ProjectId) -> Result<Project> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::Load)?;
        Ok(state.project_mut(id)?.0.clone())
    }

    async fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> Result<Project> {
        let update = validate_update(update)?;
        let mut state = self.state.lock().await;
        state.check(FailPoint::Update)?;
        let seq = state.tick();
        let entry = state.project_mut(id)?;
        update.apply_to(&mut entry.0);
        entry.0.updated_at = now();
        entry.1 = seq;
        Ok(entry.0.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::Delete)?;
        let before = state.projects.len();
        state.projects.retain(|(p, _)| p.id != id);
        if state.projects.len() == before {
            return Err(SyncError::NotFound(format!("project {id}")));
        }
        state.steps.retain(|r| r.project_id != id.as_str());
        state.connections.retain(|r| r.project_id != id.as_str());
        Ok(())
    }

    async fn load_project_data(&self, id: ProjectId) -> Option<ProjectData> {
        let mut state = self.state.lock().await;
        if let Err(e) = state.check(FailPoint::LoadData) {
            log::error!("error loading project data: {e}");
            return None;
        }
        let steps = state
            .steps
            .iter()
            .filter(|r| r.project_id == id.as_str())
            .cloned()
            .collect();
        let connections = state
            .connections
            .iter()
            .filter(|r| r.project_id == id.as_str())
            .cloned()
            .map(ConnectionRow::into_connection)
            .collect();
        Some(ProjectData {
            steps: steps_from_rows(steps),
            connections,
        })
    }

    async fn save_project(&self, id: ProjectId, data: &ProjectData) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::Save)?;
        state.project_mut(id)?;

        if !data.steps.is_empty() {
            state.steps.retain(|r| r.project_id != id.as_str());
        }
        if !data.connections.is_empty() {
            state.connections.retain(|r| r.project_id != id.as_str());
        }
        state.steps.extend(
            data.steps
                .iter()
                .enumerate()
                .map(|(i, s)| StepRow::from_step(id, i, s)),
        );
        state.connections.extend(
            data.connections
                .iter()
                .map(|c| ConnectionRow::from_connection(id, c)),
        );

        let seq = state.tick();
        let entry = state.project_mut(id)?;
        entry.0.updated_at = now();
        entry.1 = seq;
        log::info!(
            "saved project {id}: {} steps, {} connections",
            data.steps.len(),
            data.connections.len()
        );
        Ok(())
    }

    async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::DeleteConnection)?;
        state.connections.retain(|r| r.id != id.as_str());
        Ok(())
    }
}
