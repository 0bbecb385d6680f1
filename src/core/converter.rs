use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Vocabulary;

/// Placeholder string the original tool fed to its digest once per line
/// instead of the coordinate values. Kept verbatim for cumulative mode.
pub const LEGACY_DIGEST_SEED: &str = "%geo_long_url %geo_lat_url %geo_alt_uri";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("expected 3 coordinate tokens, found {found}")]
    MissingTokens { found: usize },
}

/// One input line's worth of coordinates, kept as raw text tokens.
/// The values are written out as plain literals, never parsed as numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateRecord {
    pub longitude: String,
    pub latitude: String,
    pub altitude: String,
}

impl CoordinateRecord {
    /// Take the first three whitespace-separated tokens; excess tokens are
    /// ignored, fewer than three is an error.
    pub fn parse(line: &str) -> Result<Self, ConvertError> {
        let mut tokens = line.split_whitespace();

        let longitude = tokens.next();
        let latitude = tokens.next();
        let altitude = tokens.next();

        match (longitude, latitude, altitude) {
            (Some(lon), Some(lat), Some(alt)) => Ok(Self {
                longitude: lon.to_string(),
                latitude: lat.to_string(),
                altitude: alt.to_string(),
            }),
            (lon, lat, _) => {
                let found = [lon, lat].iter().filter(|t| t.is_some()).count();
                Err(ConvertError::MissingTokens { found })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Object {
    Iri(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfTriple {
    /// Blank-node identifier, without the leading `_:`
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

impl RdfTriple {
    pub fn new(subject: String, predicate: String, object: Object) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub fn to_ntriple(&self) -> String {
        let object = match &self.object {
            Object::Iri(iri) => format!("<{}>", iri),
            Object::Literal(text) => {
                format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
        };
        format!("_:{} <{}> {} .", self.subject, self.predicate, object)
    }
}

/// How blank-node subject identifiers are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectMode {
    /// Fresh MD5 of the coordinate tokens for each line. Identical lines
    /// map to identical identifiers and runs are reproducible.
    #[default]
    PerLine,
    /// One MD5 digest carried across the whole run, fed the legacy seed
    /// string once per line. The identifier is the digest of everything
    /// fed so far, so every line gets a distinct identifier even for
    /// identical input. Matches the original tool byte for byte.
    Cumulative,
}

/// Converts one text line into the triple set describing it.
pub struct LineConverter {
    vocab: Vocabulary,
    dataset: Option<String>,
    mode: SubjectMode,
    digest: Md5,
}

impl LineConverter {
    pub fn new(vocab: Vocabulary, mode: SubjectMode) -> Self {
        Self {
            vocab,
            dataset: None,
            mode,
            digest: Md5::new(),
        }
    }

    /// Dataset URI emitted as the object of `prov:wasInformedBy`. When set,
    /// each line also gets an `rdf:type` triple.
    pub fn with_dataset(mut self, uri: String) -> Self {
        self.dataset = Some(uri);
        self
    }

    pub fn convert(&mut self, line: &str) -> Result<Vec<RdfTriple>, ConvertError> {
        let record = CoordinateRecord::parse(line)?;
        let subject = self.subject_id(&record);

        let mut triples = vec![
            RdfTriple::new(
                subject.clone(),
                self.vocab.long_predicate.clone(),
                Object::Literal(record.longitude),
            ),
            RdfTriple::new(
                subject.clone(),
                self.vocab.lat_predicate.clone(),
                Object::Literal(record.latitude),
            ),
            RdfTriple::new(
                subject.clone(),
                self.vocab.alt_predicate.clone(),
                Object::Literal(record.altitude),
            ),
        ];

        if let Some(dataset) = &self.dataset {
            triples.push(RdfTriple::new(
                subject.clone(),
                self.vocab.type_predicate.clone(),
                Object::Iri(self.vocab.point_class.clone()),
            ));
            triples.push(RdfTriple::new(
                subject,
                self.vocab.was_informed_by_predicate.clone(),
                Object::Iri(dataset.clone()),
            ));
        }

        Ok(triples)
    }

    fn subject_id(&mut self, record: &CoordinateRecord) -> String {
        match self.mode {
            SubjectMode::PerLine => {
                let mut digest = Md5::new();
                digest.update(record.longitude.as_bytes());
                digest.update(b" ");
                digest.update(record.latitude.as_bytes());
                digest.update(b" ");
                digest.update(record.altitude.as_bytes());
                format!("{:x}", digest.finalize())
            }
            SubjectMode::Cumulative => {
                self.digest.update(LEGACY_DIGEST_SEED.as_bytes());
                // Peek at the accumulated state without resetting it
                format!("{:x}", self.digest.clone().finalize())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(mode: SubjectMode) -> LineConverter {
        LineConverter::new(Vocabulary::default(), mode)
    }

    #[test]
    fn test_three_tokens_yield_three_triples() {
        let mut conv = converter(SubjectMode::PerLine);
        let triples = conv.convert("2.5 50.3 100.3").unwrap();

        assert_eq!(triples.len(), 3);
        assert!(triples.iter().all(|t| t.subject == triples[0].subject));
        assert_eq!(triples[0].predicate, crate::config::GEO_LONG);
        assert_eq!(triples[0].object, Object::Literal("2.5".to_string()));
        assert_eq!(triples[1].object, Object::Literal("50.3".to_string()));
        assert_eq!(triples[2].object, Object::Literal("100.3".to_string()));
    }

    #[test]
    fn test_dataset_adds_type_and_provenance() {
        let mut conv = converter(SubjectMode::PerLine)
            .with_dataset("http://example.org/dataset1".to_string());
        let triples = conv.convert("2.5 50.3 100.3").unwrap();

        assert_eq!(triples.len(), 5);
        assert_eq!(triples[3].predicate, crate::config::RDF_TYPE);
        assert_eq!(
            triples[3].object,
            Object::Iri(crate::config::GEO_POINT.to_string())
        );
        assert_eq!(triples[4].predicate, crate::config::PROV_WAS_INFORMED_BY);
        assert_eq!(
            triples[4].object,
            Object::Iri("http://example.org/dataset1".to_string())
        );
    }

    #[test]
    fn test_excess_tokens_ignored() {
        let mut conv = converter(SubjectMode::PerLine);
        let triples = conv.convert("1 2 3 4 5").unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[2].object, Object::Literal("3".to_string()));
    }

    #[test]
    fn test_missing_tokens_is_an_error() {
        let mut conv = converter(SubjectMode::PerLine);
        match conv.convert("2.5 50.3") {
            Err(ConvertError::MissingTokens { found }) => assert_eq!(found, 2),
            other => panic!("expected MissingTokens, got {:?}", other),
        }
    }

    #[test]
    fn test_per_line_subjects_are_reproducible() {
        let mut a = converter(SubjectMode::PerLine);
        let mut b = converter(SubjectMode::PerLine);

        let first = a.convert("2.5 50.3 100.3").unwrap();
        let second = b.convert("2.5 50.3 100.3").unwrap();
        assert_eq!(first[0].subject, second[0].subject);
        // MD5 of "2.5 50.3 100.3"
        assert_eq!(first[0].subject, "3c94f0ad15bc6ba339fa5103f67cf470");
    }

    #[test]
    fn test_per_line_identical_lines_share_a_subject() {
        let mut conv = converter(SubjectMode::PerLine);
        let first = conv.convert("1 2 3").unwrap();
        let second = conv.convert("1 2 3").unwrap();
        assert_eq!(first[0].subject, second[0].subject);
    }

    #[test]
    fn test_cumulative_subjects_differ_per_line() {
        let mut conv = converter(SubjectMode::Cumulative);
        let first = conv.convert("1 2 3").unwrap();
        let second = conv.convert("1 2 3").unwrap();

        // The digest accumulates the seed string, so even identical lines
        // get distinct identifiers, in a fixed sequence.
        assert_eq!(first[0].subject, "2f60a0dbca51c3b2e010dc050ebb8b8b");
        assert_eq!(second[0].subject, "44bb8c69da389a0b9047572cab6eee1c");
    }

    #[test]
    fn test_converter_recovers_after_malformed_line() {
        let mut conv = converter(SubjectMode::Cumulative);
        assert!(conv.convert("1 2").is_err());

        let triples = conv.convert("4 5 6").unwrap();
        assert_eq!(triples.len(), 3);
        // The malformed line never reached the digest, so this is still the
        // first identifier in the cumulative sequence
        assert_eq!(triples[0].subject, "2f60a0dbca51c3b2e010dc050ebb8b8b");
    }

    #[test]
    fn test_non_numeric_tokens_pass_through() {
        let mut conv = converter(SubjectMode::PerLine);
        let triples = conv.convert("east north up").unwrap();
        assert_eq!(triples[0].object, Object::Literal("east".to_string()));
    }

    #[test]
    fn test_to_ntriple_escapes_quotes() {
        let triple = RdfTriple::new(
            "b0".to_string(),
            "http://example.org/p".to_string(),
            Object::Literal("say \"hi\"".to_string()),
        );
        assert_eq!(
            triple.to_ntriple(),
            "_:b0 <http://example.org/p> \"say \\\"hi\\\"\" ."
        );
    }
}
