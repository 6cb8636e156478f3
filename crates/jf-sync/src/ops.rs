//! Editor-facing sync operations over any [`ProjectBackend`].

use crate::backend::{ProjectBackend, ProjectData};
use crate::error::Result;
use crate::openai::JourneyGenerator;
use jf_core::generate::{GeneratedJourney, GenerationRequest};
use jf_core::id::{ConnectionId, ProjectId};
use jf_core::map::JourneyMap;

/// The stored map of `project`, or `None` when loading failed.
pub async fn load_map(backend: &dyn ProjectBackend, project: ProjectId) -> Option<JourneyMap> {
    let data = backend.load_project_data(project).await?;
    log::debug!(
        "loaded project {project}: {} steps, {} connections",
        data.steps.len(),
        data.connections.len()
    );
    Some(data.into_map())
}

/// Persist a snapshot of `map`. The map itself is never touched, so a
/// failed save leaves the editor exactly as it was.
pub async fn save_map(
    backend: &dyn ProjectBackend,
    project: ProjectId,
    map: &JourneyMap,
) -> Result<()> {
    let data = ProjectData::from_map(map);
    backend.save_project(project, &data).await.inspect_err(|e| {
        log::error!("save of project {project} failed: {e}");
    })
}

/// Remove a connection locally, then remotely. If the remote delete fails
/// the connection list is restored exactly as it was.
///
/// Returns `Ok(false)` when the connection wasn't in the map.
pub async fn delete_connection_optimistic(
    map: &mut JourneyMap,
    backend: &dyn ProjectBackend,
    id: ConnectionId,
) -> Result<bool> {
    let prior = map.connections().to_vec();
    if map.remove_connection(id).is_none() {
        return Ok(false);
    }
    match backend.delete_connection(id).await {
        Ok(()) => Ok(true),
        Err(e) => {
            log::warn!("delete of connection {id} failed, rolling back: {e}");
            map.restore_connections(prior);
            Err(e)
        }
    }
}

/// Validate the request, then ask the generator for a draft.
pub async fn generate_journey(
    generator: &dyn JourneyGenerator,
    request: &GenerationRequest,
) -> Result<GeneratedJourney> {
    request.validate()?;
    generator.generate(request).await
}
