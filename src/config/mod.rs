use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use anyhow::{Result, Context};

pub const GEO_LONG: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#long";
pub const GEO_LAT: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#lat";
pub const GEO_ALT: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#alt";
pub const GEO_POINT: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#Point";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const PROV_WAS_INFORMED_BY: &str = "http://www.w3.org/ns/prov#wasInformedBy";

pub const GEO_NS: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";

/// Predicate and class URIs used when building triples. Kept as a table
/// rather than inline literals so alternative vocabularies can be swapped
/// in from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default = "default_long")]
    pub long_predicate: String,
    #[serde(default = "default_lat")]
    pub lat_predicate: String,
    #[serde(default = "default_alt")]
    pub alt_predicate: String,
    #[serde(default = "default_type")]
    pub type_predicate: String,
    #[serde(default = "default_point")]
    pub point_class: String,
    #[serde(default = "default_informed_by")]
    pub was_informed_by_predicate: String,
}

fn default_long() -> String { GEO_LONG.to_string() }
fn default_lat() -> String { GEO_LAT.to_string() }
fn default_alt() -> String { GEO_ALT.to_string() }
fn default_type() -> String { RDF_TYPE.to_string() }
fn default_point() -> String { GEO_POINT.to_string() }
fn default_informed_by() -> String { PROV_WAS_INFORMED_BY.to_string() }

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            long_predicate: default_long(),
            lat_predicate: default_lat(),
            alt_predicate: default_alt(),
            type_predicate: default_type(),
            point_class: default_point(),
            was_informed_by_predicate: default_informed_by(),
        }
    }
}

impl Vocabulary {
    /// Load vocabulary overrides from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file: {}", path.display()))?;

        let vocab = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        Ok(vocab)
    }

    /// Validate the vocabulary
    pub fn validate(&self) -> Result<()> {
        let uris = [
            ("long_predicate", &self.long_predicate),
            ("lat_predicate", &self.lat_predicate),
            ("alt_predicate", &self.alt_predicate),
            ("type_predicate", &self.type_predicate),
            ("point_class", &self.point_class),
            ("was_informed_by_predicate", &self.was_informed_by_predicate),
        ];

        for (name, uri) in uris {
            if uri.is_empty() {
                anyhow::bail!("Vocabulary entry is empty: {}", name);
            }
            if !uri.starts_with("http://") && !uri.starts_with("https://") {
                anyhow::bail!("Vocabulary entry is not an absolute URI: {} = {}", name, uri);
            }
        }

        Ok(())
    }

    /// Create an example vocabulary (the WGS84 + PROV defaults)
    pub fn example() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    NTriples,
    Turtle,
    N3,
    RdfXml,
    Json,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::NTriples,
            OutputFormat::Turtle,
            OutputFormat::N3,
            OutputFormat::RdfXml,
            OutputFormat::Json,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::NTriples => "ntriples",
            OutputFormat::Turtle => "turtle",
            OutputFormat::N3 => "n3",
            OutputFormat::RdfXml => "rdfxml",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
