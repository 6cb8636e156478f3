//! Core data model for journey maps.
//!
//! A journey map is a flat, ordered list of step cards plus a list of
//! directed connections between them. Steps live in canvas space: `(x, y)`
//! is the card's top-left corner and `width`/`height` are canvas units,
//! independent of the current pan/zoom transform.

use crate::id::{ConnectionId, ProjectId, StepId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a freshly created step card.
pub const DEFAULT_STEP_WIDTH: f64 = 280.0;
pub const DEFAULT_STEP_HEIGHT: f64 = 160.0;

/// Hard floor applied by the resize handles.
pub const MIN_STEP_WIDTH: f64 = 240.0;
pub const MIN_STEP_HEIGHT: f64 = 120.0;

pub const DEFAULT_STEP_TITLE: &str = "New Step";
pub const DEFAULT_STEP_DESCRIPTION: &str = "Describe this step...";

// ─── Colors ──────────────────────────────────────────────────────────────

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// A step's display color, kept exactly as it was written (`#FFD700` and
/// `#ffd700` are different values here). Validation is advisory: the
/// renderer falls back to the category color for strings that aren't hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepColor(String);

impl StepColor {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn is_hex(&self) -> bool {
        let Some(hex) = self.0.strip_prefix('#') else {
            return false;
        };
        matches!(hex.len(), 3 | 4 | 6 | 8) && hex.bytes().all(|b| hex_val(b).is_some())
    }
}

impl fmt::Display for StepColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepColor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ─── Step categories ─────────────────────────────────────────────────────

/// Closed set of step categories. Each carries a fixed tag, label, icon and
/// display color that generated journeys must reproduce verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepType {
    #[default]
    Action,
    Decision,
    Wait,
    Email,
    Sms,
    Webhook,
    Feedback,
    Discovery,
    Support,
    Milestone,
    Internal,
}

impl StepType {
    pub const ALL: [StepType; 11] = [
        StepType::Action,
        StepType::Decision,
        StepType::Wait,
        StepType::Email,
        StepType::Sms,
        StepType::Webhook,
        StepType::Feedback,
        StepType::Discovery,
        StepType::Support,
        StepType::Milestone,
        StepType::Internal,
    ];

    /// Wire tag (`"action"`, `"sms"`, ...).
    pub fn id(self) -> &'static str {
        match self {
            StepType::Action => "action",
            StepType::Decision => "decision",
            StepType::Wait => "wait",
            StepType::Email => "email",
            StepType::Sms => "sms",
            StepType::Webhook => "webhook",
            StepType::Feedback => "feedback",
            StepType::Discovery => "discovery",
            StepType::Support => "support",
            StepType::Milestone => "milestone",
            StepType::Internal => "internal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StepType::Action => "Action",
            StepType::Decision => "Decision",
            StepType::Wait => "Wait",
            StepType::Email => "Email",
            StepType::Sms => "SMS",
            StepType::Webhook => "Webhook",
            StepType::Feedback => "Feedback",
            StepType::Discovery => "Discovery",
            StepType::Support => "Support",
            StepType::Milestone => "Milestone",
            StepType::Internal => "Internal",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            StepType::Action => "⚡",
            StepType::Decision => "❓",
            StepType::Wait => "⏱️",
            StepType::Email => "📧",
            StepType::Sms => "📱",
            StepType::Webhook => "🔗",
            StepType::Feedback => "💬",
            StepType::Discovery => "🔍",
            StepType::Support => "🆘",
            StepType::Milestone => "🏁",
            StepType::Internal => "⚙️",
        }
    }

    /// Canonical display color for the category.
    pub fn color(self) -> &'static str {
        match self {
            StepType::Action => "#10b981",
            StepType::Decision => "#f59e0b",
            StepType::Wait => "#6b7280",
            StepType::Email => "#3b82f6",
            StepType::Sms => "#8b5cf6",
            StepType::Webhook => "#ef4444",
            StepType::Feedback => "#FFD700",
            StepType::Discovery => "#00BFFF",
            StepType::Support => "#06b6d4",
            StepType::Milestone => "#84cc16",
            StepType::Internal => "#64748b",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Resolve a tag coming from storage or a generated payload. Missing or
    /// unknown tags fall back to `Action`.
    pub fn from_id_lossy(id: Option<&str>) -> Self {
        match id {
            Some(tag) => Self::from_id(tag).unwrap_or_else(|| {
                log::warn!("unknown step type {tag:?}, defaulting to action");
                StepType::Action
            }),
            None => StepType::Action,
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for StepType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for StepType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(StepType::from_id_lossy(tag.as_deref()))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Bounds {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// A single journey-map card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub step_type: StepType,
    #[serde(default)]
    pub step_color: StepColor,
    #[serde(default)]
    pub custom_color_override: bool,
}

impl Step {
    /// A default "New Step" card of category `action` at `(x, y)`.
    pub fn new(id: StepId, x: f64, y: f64) -> Self {
        Self {
            id,
            title: DEFAULT_STEP_TITLE.to_string(),
            description: DEFAULT_STEP_DESCRIPTION.to_string(),
            x,
            y,
            width: DEFAULT_STEP_WIDTH,
            height: DEFAULT_STEP_HEIGHT,
            highlighted: false,
            step_type: StepType::Action,
            step_color: StepColor::from(StepType::Action.color()),
            custom_color_override: false,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        self.bounds().center()
    }

    /// The color to paint with: the stored color when it parses as hex,
    /// otherwise the category default.
    pub fn display_color(&self) -> &str {
        if self.step_color.is_hex() {
            self.step_color.as_str()
        } else {
            self.step_type.color()
        }
    }
}

/// A directed edge between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_id: StepId,
    pub to_id: StepId,
}

impl Connection {
    pub fn new(from_id: StepId, to_id: StepId) -> Self {
        Self {
            id: ConnectionId::generate(),
            from_id,
            to_id,
        }
    }

    /// True if `step` is either endpoint.
    pub fn involves(&self, step: StepId) -> bool {
        self.from_id == step || self.to_id == step
    }

    /// True if this connection joins `a` and `b` in either direction.
    pub fn joins(&self, a: StepId, b: StepId) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }
}

/// A persisted project: the unit that owns one journey map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial project update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(is_public) = self.is_public {
            project.is_public = is_public;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_type_catalogue_lookup() {
        assert_eq!(StepType::from_id("sms"), Some(StepType::Sms));
        assert_eq!(StepType::from_label("SMS"), Some(StepType::Sms));
        assert_eq!(StepType::from_id("SMS"), None);
        assert_eq!(StepType::Feedback.color(), "#FFD700");
        assert_eq!(StepType::ALL.len(), 11);
    }

    #[test]
    fn unknown_step_type_falls_back_to_action() {
        let t: StepType = serde_json::from_str("\"teleport\"").unwrap();
        assert_eq!(t, StepType::Action);
        let t: StepType = serde_json::from_str("null").unwrap();
        assert_eq!(t, StepType::Action);
    }

    #[test]
    fn step_color_keeps_case() {
        let c = StepColor::from("#00BFFF");
        assert_eq!(c.as_str(), "#00BFFF");
        assert!(c.is_hex());
        assert!(!StepColor::from("cornflower").is_hex());
        assert!(!StepColor::from("#12345").is_hex());
    }

    #[test]
    fn step_json_uses_camel_case() {
        let step = Step::new(StepId::intern("s-json"), 10.0, 20.0);
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["stepType"], "action");
        assert_eq!(json["stepColor"], "#10b981");
        assert_eq!(json["customColorOverride"], false);
        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn display_color_falls_back_on_garbage() {
        let mut step = Step::new(StepId::intern("s-color"), 0.0, 0.0);
        step.step_type = StepType::Email;
        step.step_color = StepColor::from("blue-ish");
        assert_eq!(step.display_color(), "#3b82f6");
    }

    #[test]
    fn connection_joins_either_direction() {
        let a = StepId::intern("join-a");
        let b = StepId::intern("join-b");
        let c = StepId::intern("join-c");
        let conn = Connection::new(a, b);
        assert!(conn.joins(a, b));
        assert!(conn.joins(b, a));
        assert!(!conn.joins(a, c));
        assert!(conn.involves(b));
        assert!(!conn.involves(c));
    }

    #[test]
    fn bounds_contains_edges_inclusive() {
        let b = Bounds {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 5.0,
        };
        assert!(b.contains(10.0, 5.0));
        assert!(!b.contains(10.1, 5.0));
        assert_eq!(b.center(), (5.0, 2.5));
    }
}
