//! CSV export of a journey map snapshot.

use crate::map::JourneyMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("no steps to export")]
    Empty,
}

pub const CSV_HEADER: &str = "Step Number,Title,Description";

/// Quote a field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One row per step in display order: 1-based number, title, description.
pub fn export_csv(map: &JourneyMap) -> Result<String, ExportError> {
    if map.steps().is_empty() {
        return Err(ExportError::Empty);
    }
    let mut out = String::from(CSV_HEADER);
    for (i, step) in map.steps().iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{}",
            i + 1,
            csv_field(&step.title),
            csv_field(&step.description)
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::StepId;
    use crate::model::Step;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_map_is_rejected() {
        assert_eq!(export_csv(&JourneyMap::new()), Err(ExportError::Empty));
    }

    #[test]
    fn quotes_are_doubled() {
        let mut map = JourneyMap::new();
        let mut step = Step::new(StepId::intern("csv-1"), 0.0, 0.0);
        step.title = "Say \"hi\"".into();
        step.description = "a, b".into();
        map.add_step(step);
        map.add_step(Step::new(StepId::intern("csv-2"), 0.0, 0.0));

        let csv = export_csv(&map).unwrap();
        assert_eq!(
            csv,
            "Step Number,Title,Description\n\
             1,\"Say \"\"hi\"\"\",\"a, b\"\n\
             2,\"New Step\",\"Describe this step...\""
        );
    }
}
