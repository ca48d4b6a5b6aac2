use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One comparison: every table in `input_dir` ends up in `output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    /// Orthogroups used for this comparison instead of the shared ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSettings>,
}

impl Comparison {
    fn new(input_dir: &str, output: &str) -> Self {
        Comparison {
            input_dir: PathBuf::from(input_dir),
            output: PathBuf::from(output),
            reference: None,
        }
    }

    /// The reference this comparison annotates against.
    pub fn reference_or<'a>(&'a self, shared: &'a ReferenceSettings) -> &'a ReferenceSettings {
        self.reference.as_ref().unwrap_or(shared)
    }
}

/// Where the orthogroups live and which columns to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Comma-delimited orthogroups table.
    pub path: PathBuf,
    /// Column searched for the identifier. Matched after lowercasing.
    pub lookup_column: String,
    /// Column whose value becomes the annotation.
    pub ortholog_column: String,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        ReferenceSettings {
            path: PathBuf::from("Orthogroups_Asterales_bidensv5soft.csv"),
            lookup_column: "bidensv5_hap1_soft_transdecoder".to_string(),
            ortholog_column: "arabidopsis".to_string(),
        }
    }
}

/// The whole job list. Fields missing from a JSON file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reference: ReferenceSettings,
    pub comparisons: Vec<Comparison>,
}

impl Default for Config {
    /// The six pairwise comparisons of conditions I–IV.
    fn default() -> Self {
        Config {
            reference: ReferenceSettings::default(),
            comparisons: vec![
                Comparison::new("IvII/", "I_v_II_AtID.xlsx"),
                Comparison::new("IvIII/", "I_v_III_AtID.xlsx"),
                Comparison::new("IvIV/", "I_v_IV_AtID.xlsx"),
                Comparison::new("IIvIII/", "II_v_III_AtID.xlsx"),
                Comparison::new("IIvIV/", "II_v_IV_AtID.xlsx"),
                Comparison::new("IIIvIV/", "III_v_IV_AtID.xlsx"),
            ],
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve every relative path against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.reference.path = base.join(&self.reference.path);
        for c in &mut self.comparisons {
            c.input_dir = base.join(&c.input_dir);
            c.output = base.join(&c.output);
            if let Some(r) = &mut c.reference {
                r.path = base.join(&r.path);
            }
        }
        self
    }
}
