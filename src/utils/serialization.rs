use anyhow::{Result, Context};

use crate::config::{OutputFormat, GEO_NS, PROV_NS, RDF_NS};
use crate::core::{Object, RdfTriple};

const PREFIXES: &[(&str, &str)] = &[("geo", GEO_NS), ("rdf", RDF_NS), ("prov", PROV_NS)];

pub struct RdfSerializer;

impl RdfSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize one line's triple set as a standalone fragment in the
    /// requested format. N-Triples, Turtle and N3 fragments concatenate
    /// safely across lines; RDF/XML fragments are complete documents and
    /// do not.
    pub fn serialize(&self, triples: &[RdfTriple], format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::NTriples => self.serialize_ntriples(triples),
            OutputFormat::Turtle | OutputFormat::N3 => self.serialize_turtle(triples),
            OutputFormat::RdfXml => self.serialize_rdf_xml(triples),
            OutputFormat::Json => self.serialize_json(triples),
        }
    }

    fn serialize_ntriples(&self, triples: &[RdfTriple]) -> Result<String> {
        let mut output = String::new();

        for triple in triples {
            output.push_str(&triple.to_ntriple());
            output.push('\n');
        }

        Ok(output)
    }

    fn serialize_turtle(&self, triples: &[RdfTriple]) -> Result<String> {
        let mut output = String::new();

        for (prefix, namespace) in PREFIXES {
            output.push_str(&format!("@prefix {}: <{}> .\n", prefix, namespace));
        }
        output.push('\n');

        for triple in triples {
            let predicate = self.format_uri_for_turtle(&triple.predicate);
            let object = match &triple.object {
                Object::Iri(iri) => self.format_uri_for_turtle(iri),
                Object::Literal(text) => {
                    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                }
            };

            output.push_str(&format!("_:{} {} {} .\n", triple.subject, predicate, object));
        }

        Ok(output)
    }

    fn serialize_rdf_xml(&self, triples: &[RdfTriple]) -> Result<String> {
        let mut output = String::new();

        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        output.push_str("<rdf:RDF");
        for (prefix, namespace) in PREFIXES {
            output.push_str(&format!(" xmlns:{}=\"{}\"", prefix, namespace));
        }
        output.push_str(">\n");

        // Group triples by subject, preserving first-seen order so output
        // is byte-stable
        let mut subjects: Vec<(&str, Vec<&RdfTriple>)> = Vec::new();
        for triple in triples {
            match subjects.iter_mut().find(|(s, _)| *s == triple.subject) {
                Some((_, group)) => group.push(triple),
                None => subjects.push((&triple.subject, vec![triple])),
            }
        }

        for (subject, subject_triples) in subjects {
            output.push_str(&format!("  <rdf:Description rdf:nodeID=\"{}\">\n", subject));

            for triple in subject_triples {
                let predicate_name = self
                    .prefixed_name(&triple.predicate)
                    .unwrap_or_else(|| {
                        triple
                            .predicate
                            .split('#')
                            .last()
                            .unwrap_or(&triple.predicate)
                            .to_string()
                    });

                match &triple.object {
                    Object::Iri(iri) => {
                        output.push_str(&format!(
                            "    <{} rdf:resource=\"{}\"/>\n",
                            predicate_name,
                            html_escape::encode_double_quoted_attribute(iri)
                        ));
                    }
                    Object::Literal(text) => {
                        output.push_str(&format!(
                            "    <{}>{}</{}>\n",
                            predicate_name,
                            html_escape::encode_text(text),
                            predicate_name
                        ));
                    }
                }
            }

            output.push_str("  </rdf:Description>\n");
        }

        output.push_str("</rdf:RDF>\n");

        Ok(output)
    }

    fn serialize_json(&self, triples: &[RdfTriple]) -> Result<String> {
        let mut output = serde_json::to_string_pretty(triples)
            .context("Failed to serialize to JSON")?;
        output.push('\n');
        Ok(output)
    }

    fn format_uri_for_turtle(&self, uri: &str) -> String {
        self.prefixed_name(uri)
            .unwrap_or_else(|| format!("<{}>", uri))
    }

    fn prefixed_name(&self, uri: &str) -> Option<String> {
        PREFIXES.iter().find_map(|(prefix, namespace)| {
            uri.strip_prefix(namespace)
                .map(|local| format!("{}:{}", prefix, local))
        })
    }
}

impl Default for RdfSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural checks on a triple set; returns human-readable issues.
pub fn validate_triples(triples: &[RdfTriple]) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, triple) in triples.iter().enumerate() {
        if triple.subject.is_empty() {
            issues.push(format!("Triple {}: Empty subject identifier", i));
        }

        if !triple.predicate.starts_with("http://") && !triple.predicate.starts_with("https://") {
            issues.push(format!(
                "Triple {}: Predicate is not an absolute URI: {}",
                i, triple.predicate
            ));
        }

        if let Object::Iri(iri) = &triple.object {
            if !iri.starts_with("http://") && !iri.starts_with("https://") {
                issues.push(format!("Triple {}: Object is not an absolute URI: {}", i, iri));
            }
        }
    }

    issues
}
