use anyhow::{Result, Context};
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

use xyz2rdf::{
    config::{OutputFormat, Vocabulary},
    core::{LineConverter, SubjectMode},
    handlers::InputSource,
    utils::{validate_triples, RdfSerializer},
};

#[derive(Debug, Parser)]
#[command(
    name = "xyz2rdf",
    about = "Serialize whitespace-separated coordinate triples as RDF",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Emit geo:long/geo:lat/geo:alt triples for each input line
    Serialize {
        /// Input files (stdin when omitted)
        input: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "rdfxml")]
        format: OutputFormatArg,

        /// How blank-node subject identifiers are derived
        #[arg(long, value_enum, default_value = "per-line")]
        subjects: SubjectModeArg,

        /// Vocabulary override file (YAML or JSON)
        #[arg(long)]
        vocab: Option<PathBuf>,

        /// Report structural issues in the emitted triples on stderr
        #[arg(long)]
        validate: bool,
    },

    /// Like serialize, plus rdf:type and prov:wasInformedBy triples
    /// referencing a dataset URI
    Annotate {
        /// Output format
        #[arg(value_enum)]
        format: OutputFormatArg,

        /// Dataset URI recorded as the object of prov:wasInformedBy
        dataset_uri: String,

        /// Input files (stdin when omitted)
        input: Vec<PathBuf>,

        /// How blank-node subject identifiers are derived
        #[arg(long, value_enum, default_value = "per-line")]
        subjects: SubjectModeArg,

        /// Vocabulary override file (YAML or JSON)
        #[arg(long)]
        vocab: Option<PathBuf>,

        /// Report structural issues in the emitted triples on stderr
        #[arg(long)]
        validate: bool,
    },

    /// List supported output format names
    Formats,

    /// Generate an example vocabulary file
    GenerateVocab {
        /// Output path for the vocabulary file
        #[arg(short, long)]
        output: PathBuf,

        /// Vocabulary file format (yaml or json)
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: VocabFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormatArg {
    #[value(name = "ntriples")]
    NTriples,
    #[value(name = "turtle")]
    Turtle,
    #[value(name = "n3")]
    N3,
    #[value(name = "rdfxml")]
    RdfXml,
    #[value(name = "json")]
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::NTriples => Self::NTriples,
            OutputFormatArg::Turtle => Self::Turtle,
            OutputFormatArg::N3 => Self::N3,
            OutputFormatArg::RdfXml => Self::RdfXml,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SubjectModeArg {
    /// Fresh digest of the coordinate values for each line (reproducible)
    PerLine,
    /// Digest carried across the whole run, as the original tool did
    Cumulative,
}

impl From<SubjectModeArg> for SubjectMode {
    fn from(mode: SubjectModeArg) -> Self {
        match mode {
            SubjectModeArg::PerLine => Self::PerLine,
            SubjectModeArg::Cumulative => Self::Cumulative,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum VocabFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries the RDF output, diagnostics go to stderr
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Serialize {
            input,
            format,
            subjects,
            vocab,
            validate,
        } => convert_command(input, format, subjects, vocab, None, validate),
        Commands::Annotate {
            format,
            dataset_uri,
            input,
            subjects,
            vocab,
            validate,
        } => convert_command(input, format, subjects, vocab, Some(dataset_uri), validate),
        Commands::Formats => formats_command(),
        Commands::GenerateVocab { output, format } => generate_vocab_command(output, format),
    }
}

fn convert_command(
    input: Vec<PathBuf>,
    format: OutputFormatArg,
    subjects: SubjectModeArg,
    vocab_path: Option<PathBuf>,
    dataset_uri: Option<String>,
    validate: bool,
) -> Result<()> {
    let vocab = load_vocabulary(vocab_path)?;

    let mut converter = LineConverter::new(vocab, subjects.into());
    if let Some(uri) = dataset_uri {
        converter = converter.with_dataset(uri);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    convert_stream(
        InputSource::from_args(input),
        &mut converter,
        &format.into(),
        validate,
        &mut out,
    )
}

fn convert_stream<W: Write>(
    sources: Vec<InputSource>,
    converter: &mut LineConverter,
    format: &OutputFormat,
    validate: bool,
    out: &mut W,
) -> Result<()> {
    let serializer = RdfSerializer::new();

    for source in sources {
        let reader = source.open()?;

        for (number, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read from {}", source.describe()))?;

            match converter.convert(&line) {
                Ok(triples) => {
                    if validate {
                        for issue in validate_triples(&triples) {
                            warn!("{} line {}: {}", source.describe(), number + 1, issue);
                        }
                    }

                    let fragment = serializer.serialize(&triples, format)?;
                    out.write_all(fragment.as_bytes())?;
                    // One fragment per line, written immediately
                    out.flush()?;
                }
                Err(e) => {
                    warn!("Skipping {} line {}: {}", source.describe(), number + 1, e);
                }
            }
        }
    }

    Ok(())
}

fn formats_command() -> Result<()> {
    println!("{}", "Supported output formats:".bright_blue().bold());

    for format in OutputFormat::all() {
        let note = match format {
            OutputFormat::NTriples => "one triple per line, fragments concatenate safely",
            OutputFormat::Turtle => "prefixed terse triple syntax",
            OutputFormat::N3 => "Notation3 (Turtle subset)",
            OutputFormat::RdfXml => "standalone XML document per input line",
            OutputFormat::Json => "raw triple structs as JSON",
        };
        println!("  {} - {}", format.name().bright_cyan(), note);
    }

    Ok(())
}

fn generate_vocab_command(output_path: PathBuf, format: VocabFormat) -> Result<()> {
    let vocab = Vocabulary::example();

    let content = match format {
        VocabFormat::Yaml => serde_yaml::to_string(&vocab)?,
        VocabFormat::Json => serde_json::to_string_pretty(&vocab)?,
    };

    std::fs::write(&output_path, content)
        .with_context(|| format!("Failed to write vocabulary file: {}", output_path.display()))?;

    println!(
        "Example vocabulary written to: {}",
        output_path.display().to_string().bright_green()
    );
    println!("Edit the file to point the predicates at another vocabulary");

    Ok(())
}

fn load_vocabulary(path: Option<PathBuf>) -> Result<Vocabulary> {
    match path {
        Some(path) => {
            let vocab = Vocabulary::from_file(&path)?;
            vocab.validate()?;
            Ok(vocab)
        }
        None => Ok(Vocabulary::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn file_source(content: &str) -> (tempfile::NamedTempFile, Vec<InputSource>) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let sources = vec![InputSource::File(file.path().to_path_buf())];
        (file, sources)
    }

    #[test]
    fn test_empty_input_produces_no_output() {
        let (_file, sources) = file_source("");
        let mut converter = LineConverter::new(Vocabulary::default(), SubjectMode::PerLine);
        let mut out = Vec::new();

        convert_stream(
            sources,
            &mut converter,
            &OutputFormat::NTriples,
            false,
            &mut out,
        )
        .unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_line_is_skipped_and_run_continues() {
        let (_file, sources) = file_source("1 2\n4 5 6\n");
        let mut converter = LineConverter::new(Vocabulary::default(), SubjectMode::PerLine);
        let mut out = Vec::new();

        convert_stream(
            sources,
            &mut converter,
            &OutputFormat::NTriples,
            false,
            &mut out,
        )
        .unwrap();

        // The two-token line is dropped; the following line still converts
        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.lines().count(), 3);
        assert!(output.contains("\"4\""));
        assert!(output.contains("\"6\""));
    }

    #[test]
    fn test_unknown_format_rejected_at_parse_time() {
        let err = Cli::try_parse_from([
            "xyz2rdf",
            "annotate",
            "bogus",
            "http://example.org/dataset1",
        ])
        .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_validation_issues_are_not_fatal() {
        let (_file, sources) = file_source("2.5 50.3 100.3\n");
        // Relative predicate URI triggers validation issues for every triple
        let vocab = Vocabulary {
            long_predicate: "http://example.org/long".to_string(),
            lat_predicate: "geo:lat".to_string(),
            ..Vocabulary::default()
        };
        let mut converter = LineConverter::new(vocab, SubjectMode::PerLine);
        let mut out = Vec::new();

        convert_stream(
            sources,
            &mut converter,
            &OutputFormat::NTriples,
            true,
            &mut out,
        )
        .unwrap();

        // Issues go to stderr only; the fragment is still written in full
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }
}
