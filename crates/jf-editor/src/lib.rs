pub mod history;
pub mod hover;
pub mod input;
pub mod interaction;
pub mod mutation;
pub mod session;
pub mod shortcuts;

pub use history::History;
pub use hover::HoverTracker;
pub use input::InputEvent;
pub use interaction::Interaction;
pub use mutation::{MapMutation, apply_mutation};
pub use session::{EditField, EditorSession, HostRequest, InlineEdit};
pub use shortcuts::{ShortcutAction, ShortcutMap};
