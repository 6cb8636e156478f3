pub mod frame;
pub mod hit;
pub mod svg;

pub use frame::{EdgeVisual, Frame, FrameInput, PreviewEdge, StepVisual};
pub use hit::{Corner, StepHit, StepPart, hit_test};
pub use svg::render_svg;
