//! The project store seam.
//!
//! [`ProjectBackend`] is implemented by the PostgREST client and by the
//! in-memory store used in tests and offline runs. Saves replace the whole
//! project: existing rows are deleted, then the current map is inserted.

use crate::error::{Result, SyncError};
use jf_core::id::{ConnectionId, ProjectId};
use jf_core::map::JourneyMap;
use jf_core::model::{Connection, Project, ProjectUpdate, Step};

/// Steps (in display order) and connections of one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectData {
    pub steps: Vec<Step>,
    pub connections: Vec<Connection>,
}

impl ProjectData {
    pub fn from_map(map: &JourneyMap) -> Self {
        Self {
            steps: map.steps().to_vec(),
            connections: map.connections().to_vec(),
        }
    }

    pub fn into_map(self) -> JourneyMap {
        JourneyMap::from_parts(self.steps, self.connections)
    }
}

#[async_trait::async_trait]
pub trait ProjectBackend: Send + Sync {
    /// The caller's projects, most recently updated first.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Create a private project. The title is required.
    async fn create_project(&self, title: &str, description: Option<&str>) -> Result<Project>;

    async fn load_project(&self, id: ProjectId) -> Result<Project>;

    async fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> Result<Project>;

    async fn delete_project(&self, id: ProjectId) -> Result<()>;

    /// Steps and connections of a project, or `None` if either query fails.
    async fn load_project_data(&self, id: ProjectId) -> Option<ProjectData>;

    /// Replace the stored steps and connections with `data`.
    async fn save_project(&self, id: ProjectId, data: &ProjectData) -> Result<()>;

    async fn delete_connection(&self, id: ConnectionId) -> Result<()>;
}

/// Trimmed, non-empty project title.
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SyncError::Validation("project title is required".into()));
    }
    Ok(title.to_string())
}

/// Validates the title of a partial update, if it carries one.
pub fn validate_update(update: &ProjectUpdate) -> Result<ProjectUpdate> {
    let mut update = update.clone();
    if let Some(title) = &update.title {
        update.title = Some(validate_title(title)?);
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_are_rejected() {
        assert!(matches!(validate_title("   "), Err(SyncError::Validation(_))));
        assert_eq!(validate_title("  Onboarding ").unwrap(), "Onboarding");
    }

    #[test]
    fn update_without_title_passes() {
        let update = ProjectUpdate {
            is_public: Some(true),
            ..Default::default()
        };
        assert_eq!(validate_update(&update).unwrap(), update);
        let bad = ProjectUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update(&bad).is_err());
    }
}
