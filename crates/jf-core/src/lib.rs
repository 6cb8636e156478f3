pub mod export;
pub mod generate;
pub mod id;
pub mod layout;
pub mod map;
pub mod model;
pub mod transform;

pub use export::{ExportError, export_csv};
pub use generate::{GenerateError, GeneratedJourney, GenerationMode, GenerationRequest};
pub use id::{ConnectionId, ProjectId, StepId};
pub use map::JourneyMap;
pub use model::*;
pub use transform::{CanvasTransform, Viewport};
