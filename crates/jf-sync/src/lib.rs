pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod openai;
pub mod ops;
pub mod rows;
pub mod supabase;

pub use backend::{ProjectBackend, ProjectData};
pub use config::{GenerationConfig, SupabaseConfig, SyncConfig};
pub use error::{Result, SyncError};
pub use memory::{FailPoint, MemoryBackend};
pub use openai::{JourneyGenerator, OpenAiGenerator};
pub use ops::{delete_connection_optimistic, generate_journey, load_map, save_map};
pub use supabase::SupabaseBackend;
