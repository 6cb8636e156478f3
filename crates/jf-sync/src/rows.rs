//! Database row shapes (`projects`, `journey_steps`, `connections`).
//!
//! Rows use the store's snake_case column names. Geometry is stored as
//! integers, so coordinates are rounded on the way in.

use jf_core::id::{ConnectionId, ProjectId, StepId};
use jf_core::model::{Connection, Project, Step, StepColor, StepType};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_public: bool,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: ProjectId::intern(&row.id),
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_public: row.is_public,
        }
    }
}

/// Insert payload for `projects`. New projects are private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProjectRow {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "rounded")]
    pub x: i64,
    #[serde(deserialize_with = "rounded")]
    pub y: i64,
    #[serde(deserialize_with = "rounded")]
    pub width: i64,
    #[serde(deserialize_with = "rounded")]
    pub height: i64,
    #[serde(default)]
    pub step_type: Option<String>,
    #[serde(default)]
    pub step_color: Option<String>,
    #[serde(default)]
    pub custom_color_override: bool,
    #[serde(default)]
    pub order_index: i64,
}

/// Accept either an integer or a float column value.
fn rounded<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let v = f64::deserialize(deserializer)?;
    Ok(v.round() as i64)
}

impl StepRow {
    /// Row for `step` at display position `index`.
    pub fn from_step(project: ProjectId, index: usize, step: &Step) -> Self {
        let color = step.step_color.as_str();
        Self {
            id: step.id.as_str().to_string(),
            project_id: project.as_str().to_string(),
            title: step.title.clone(),
            description: Some(step.description.clone()),
            x: step.x.round() as i64,
            y: step.y.round() as i64,
            width: step.width.round() as i64,
            height: step.height.round() as i64,
            step_type: Some(step.step_type.id().to_string()),
            step_color: (!color.is_empty()).then(|| color.to_string()),
            custom_color_override: step.custom_color_override,
            order_index: index as i64,
        }
    }

    /// Highlight is session-only, so loaded steps are never highlighted.
    pub fn into_step(self) -> Step {
        Step {
            id: StepId::intern(&self.id),
            title: self.title,
            description: self.description.unwrap_or_default(),
            x: self.x as f64,
            y: self.y as f64,
            width: self.width as f64,
            height: self.height as f64,
            highlighted: false,
            step_type: StepType::from_id_lossy(self.step_type.as_deref()),
            step_color: StepColor::new(self.step_color.unwrap_or_default()),
            custom_color_override: self.custom_color_override,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: String,
    pub project_id: String,
    pub from_step_id: String,
    pub to_step_id: String,
}

impl ConnectionRow {
    pub fn from_connection(project: ProjectId, connection: &Connection) -> Self {
        Self {
            id: connection.id.as_str().to_string(),
            project_id: project.as_str().to_string(),
            from_step_id: connection.from_id.as_str().to_string(),
            to_step_id: connection.to_id.as_str().to_string(),
        }
    }

    pub fn into_connection(self) -> Connection {
        Connection {
            id: ConnectionId::intern(&self.id),
            from_id: StepId::intern(&self.from_step_id),
            to_id: StepId::intern(&self.to_step_id),
        }
    }
}

/// Steps in stored order. Rows are sorted by `order_index` first, so
/// callers may pass them in any order.
pub fn steps_from_rows(mut rows: Vec<StepRow>) -> Vec<Step> {
    rows.sort_by_key(|r| r.order_index);
    rows.into_iter().map(StepRow::into_step).collect()
}
