//! Load projection sets from JSON or CSV
//!
//! CSV layout, one row per scenario (blank cell = absent):
//!
//! ```text
//! Scenario,Ebitda,NetIncome,InitialInvestment,GrowthRate,TerminalMultiple,DiscountRate
//! baseline,,100,-500,0.03,8,0.10
//! realistic,,130,-500,0.05,8,
//! ```
//!
//! `DiscountRate` is optional; the first non-blank value becomes the set's rate.

use super::{Projection, ProjectionSet, ScenarioKind};
use crate::error::LoadError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Scenario")]
    scenario: String,
    #[serde(rename = "Ebitda", default)]
    ebitda: Option<String>,
    #[serde(rename = "NetIncome", default)]
    net_income: Option<String>,
    #[serde(rename = "InitialInvestment", default)]
    initial_investment: Option<String>,
    #[serde(rename = "GrowthRate", default)]
    growth_rate: Option<String>,
    #[serde(rename = "TerminalMultiple", default)]
    terminal_multiple: Option<String>,
    #[serde(rename = "DiscountRate", default)]
    discount_rate: Option<String>,
}

impl CsvRow {
    fn kind(&self) -> Result<ScenarioKind, LoadError> {
        self.scenario
            .parse()
            .map_err(LoadError::UnknownScenario)
    }

    fn to_projection(&self) -> Result<Projection, LoadError> {
        Ok(Projection {
            ebitda: parse_cell("Ebitda", &self.ebitda)?,
            net_income: parse_cell("NetIncome", &self.net_income)?,
            initial_investment: parse_cell("InitialInvestment", &self.initial_investment)?,
            growth_rate: parse_cell("GrowthRate", &self.growth_rate)?,
            terminal_multiple: parse_cell("TerminalMultiple", &self.terminal_multiple)?,
        })
    }
}

fn parse_cell(column: &'static str, cell: &Option<String>) -> Result<Option<f64>, LoadError> {
    match cell.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| LoadError::InvalidNumber {
                column,
                value: raw.to_string(),
            }),
    }
}

/// Load a projection set, choosing the format from the file extension
pub fn load_projection_set<P: AsRef<Path>>(path: P) -> Result<ProjectionSet, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = File::open(path)?;
    match extension.as_str() {
        "json" => load_projection_set_from_json_reader(file),
        "csv" => load_projection_set_from_csv_reader(file),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a projection set from JSON in the `ProjectionSet` shape
pub fn load_projection_set_from_json_reader<R: Read>(reader: R) -> Result<ProjectionSet, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a projection set from CSV rows, one per scenario
pub fn load_projection_set_from_csv_reader<R: Read>(reader: R) -> Result<ProjectionSet, LoadError> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut set = ProjectionSet::default();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let kind = row.kind()?;
        if set.get(kind).is_some() {
            return Err(LoadError::DuplicateScenario(kind.to_string()));
        }
        set.set(kind, Some(row.to_projection()?));

        if set.discount_rate.is_none() {
            set.discount_rate = parse_cell("DiscountRate", &row.discount_rate)?;
        }
    }

    log::debug!(
        "loaded projection set with {} of 4 scenarios",
        ScenarioKind::ALL.iter().filter(|&&k| set.get(k).is_some()).count()
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Scenario,Ebitda,NetIncome,InitialInvestment,GrowthRate,TerminalMultiple,DiscountRate
baseline,,100,-500,0.03,8,0.10
Realistic, 200 ,,-500,0.05,,
";

    #[test]
    fn test_load_csv() {
        let set = load_projection_set_from_csv_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(set.discount_rate, Some(0.10));
        let baseline = set.baseline().unwrap();
        assert_eq!(baseline.net_income, Some(100.0));
        assert_eq!(baseline.ebitda, None);
        assert_eq!(baseline.initial_investment, Some(-500.0));

        let (kind, scenario) = set.scenario().unwrap();
        assert_eq!(kind, ScenarioKind::Realistic);
        assert_eq!(scenario.ebitda, Some(200.0));
        assert_eq!(scenario.terminal_multiple, None);
        assert!(set.optimistic.is_none());
    }

    #[test]
    fn test_discount_rate_column_optional() {
        let csv = "Scenario,NetIncome\nbaseline,10\noptimistic,20\n";
        let set = load_projection_set_from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(set.discount_rate, None);
        assert_eq!(set.optimistic.unwrap().net_income, Some(20.0));
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let csv = "Scenario,NetIncome\nupside,10\n";
        let err = load_projection_set_from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownScenario(label) if label == "upside"));
    }

    #[test]
    fn test_bad_number_names_column() {
        let csv = "Scenario,NetIncome,GrowthRate\nbaseline,10,fast\n";
        let err = load_projection_set_from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidNumber { column, value } => {
                assert_eq!(column, "GrowthRate");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_scenario_rejected() {
        let csv = "Scenario,NetIncome\nbaseline,10\nbaseline,20\n";
        assert!(matches!(
            load_projection_set_from_csv_reader(csv.as_bytes()),
            Err(LoadError::DuplicateScenario(_))
        ));
    }

    #[test]
    fn test_bundled_samples_agree() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let from_csv = load_projection_set(data.join("sample_projection_set.csv")).unwrap();
        let from_json = load_projection_set(data.join("sample_projection_set.json")).unwrap();
        assert_eq!(from_csv, from_json);
        assert!(from_csv.missing_or_degenerate().is_empty());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("set.json");
        let mut file = File::create(&json_path).unwrap();
        write!(file, r#"{{"baseline": {{"net_income": 5}}, "discount_rate": 0.07}}"#).unwrap();
        let set = load_projection_set(&json_path).unwrap();
        assert_eq!(set.discount_rate, Some(0.07));

        let csv_path = dir.path().join("set.CSV");
        std::fs::write(&csv_path, SAMPLE).unwrap();
        assert!(load_projection_set(&csv_path).unwrap().realistic.is_some());

        let txt_path = dir.path().join("set.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            load_projection_set(&txt_path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }
}
