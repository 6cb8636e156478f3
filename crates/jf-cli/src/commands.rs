use crate::{Command, ExportFormat, ProjectsCommand};
use anyhow::{Context, bail};
use jf_core::generate::{AdvancedContext, GenerationRequest};
use jf_core::id::ProjectId;
use jf_core::map::JourneyMap;
use jf_core::model::ProjectUpdate;
use jf_core::transform::{CanvasTransform, Viewport};
use jf_sync::{OpenAiGenerator, ProjectBackend, SupabaseBackend, SyncConfig};
use std::path::Path;

pub async fn run(command: Command, config: &SyncConfig) -> anyhow::Result<()> {
    match command {
        Command::Generate {
            prompt,
            persona,
            scenario,
            goals,
            project,
            output,
        } => {
            let request = generation_request(prompt, persona, scenario, goals);
            let generator = OpenAiGenerator::new(&config.openai)?;
            let journey = jf_sync::generate_journey(&generator, &request)
                .await
                .context("generation failed")?;
            if let Some(title) = &journey.journey_title {
                log::info!("drafted \"{title}\"");
            }

            match project {
                Some(project) => {
                    let backend = backend(config)?;
                    let id = ProjectId::intern(&project);
                    let mut map = jf_sync::load_map(&backend, id)
                        .await
                        .with_context(|| format!("could not load project {project}"))?;
                    let (steps, connections) = journey.instantiate(draft_center(&map));
                    map.extend(steps, connections);
                    jf_sync::save_map(&backend, id, &map).await?;
                    log::info!("appended {} steps to project {project}", journey.steps.len());
                }
                None => {
                    let (steps, connections) =
                        journey.instantiate(CanvasTransform::IDENTITY.view_center(Viewport::default()));
                    let map = JourneyMap::from_parts(steps, connections);
                    write_output(output.as_deref(), &serde_json::to_string_pretty(&map)?)?;
                }
            }
        }
        Command::Pull { project, output } => {
            let backend = backend(config)?;
            let map = jf_sync::load_map(&backend, ProjectId::intern(&project))
                .await
                .with_context(|| format!("could not load project {project}"))?;
            write_output(output.as_deref(), &serde_json::to_string_pretty(&map)?)?;
        }
        Command::Push { project, input } => {
            let map = read_map(&input)?;
            let backend = backend(config)?;
            jf_sync::save_map(&backend, ProjectId::intern(&project), &map)
                .await
                .with_context(|| format!("could not save project {project}"))?;
            println!(
                "Saved {} steps and {} connections to {project}",
                map.steps().len(),
                map.connections().len()
            );
        }
        Command::Export {
            input,
            format,
            output,
        } => {
            let map = read_map(&input)?;
            write_output(output.as_deref(), &render_export(&map, format)?)?;
        }
        Command::Projects(cmd) => projects(cmd, &backend(config)?).await?,
    }
    Ok(())
}

async fn projects(command: ProjectsCommand, backend: &dyn ProjectBackend) -> anyhow::Result<()> {
    match command {
        ProjectsCommand::List => {
            let projects = backend.list_projects().await?;
            if projects.is_empty() {
                println!("No projects yet.");
            }
            for p in projects {
                println!("{}  {}  (updated {})", p.id, p.title, p.updated_at);
            }
        }
        ProjectsCommand::Create { title, description } => {
            let p = backend
                .create_project(&title, description.as_deref())
                .await?;
            println!("{}", p.id);
        }
        ProjectsCommand::Rename { id, title } => {
            let update = ProjectUpdate {
                title: Some(title),
                ..Default::default()
            };
            let p = backend
                .update_project(ProjectId::intern(&id), &update)
                .await?;
            println!("Renamed {} to \"{}\"", p.id, p.title);
        }
        ProjectsCommand::Delete { id } => {
            backend.delete_project(ProjectId::intern(&id)).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

fn backend(config: &SyncConfig) -> anyhow::Result<SupabaseBackend> {
    Ok(SupabaseBackend::new(&config.supabase)?)
}

fn generation_request(
    prompt: String,
    persona: Option<String>,
    scenario: Option<String>,
    goals: Option<String>,
) -> GenerationRequest {
    if persona.is_none() && scenario.is_none() && goals.is_none() {
        return GenerationRequest::basic(prompt);
    }
    GenerationRequest::advanced(
        prompt,
        AdvancedContext {
            persona: persona.unwrap_or_default(),
            scenario: scenario.unwrap_or_default(),
            goals: goals.unwrap_or_default(),
        },
    )
}

/// Where to lay out a draft appended to `map`: below the existing cards.
fn draft_center(map: &JourneyMap) -> (f64, f64) {
    match map.bounding_box() {
        Some(b) => (b.x + b.width / 2.0, b.y + b.height + 400.0),
        None => CanvasTransform::IDENTITY.view_center(Viewport::default()),
    }
}

fn render_export(map: &JourneyMap, format: ExportFormat) -> anyhow::Result<String> {
    Ok(match format {
        ExportFormat::Svg => jf_render::render_svg(map),
        ExportFormat::Csv => jf_core::export_csv(map)?,
    })
}

fn read_map(path: &Path) -> anyhow::Result<JourneyMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let map: JourneyMap = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a journey map", path.display()))?;
    if map.steps().is_empty() {
        log::warn!("{} has no steps", path.display());
    }
    Ok(map)
}

fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if path.is_dir() {
                bail!("{} is a directory", path.display());
            }
            std::fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jf_core::id::StepId;
    use jf_core::model::Step;
    use jf_core::GenerationMode;

    #[test]
    fn context_flags_switch_to_advanced() {
        let basic = generation_request("Checkout".into(), None, None, None);
        assert_eq!(basic.mode, GenerationMode::Basic);
        let advanced = generation_request("Checkout".into(), None, Some("Mobile".into()), None);
        assert_eq!(advanced.user_message(), "Checkout\n\nScenario: Mobile");
    }

    #[test]
    fn csv_export_of_empty_map_fails() {
        assert!(render_export(&JourneyMap::new(), ExportFormat::Csv).is_err());
        assert!(render_export(&JourneyMap::new(), ExportFormat::Svg).is_ok());
    }

    #[test]
    fn drafts_land_below_existing_cards() {
        let mut map = JourneyMap::new();
        map.add_step(Step::new(StepId::intern("cli-draft"), 0.0, 0.0));
        let (_, y) = draft_center(&map);
        assert!(y > 160.0);
    }
}
