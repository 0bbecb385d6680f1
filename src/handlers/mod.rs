use anyhow::{Result, Context};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Where input lines come from: standard input, or files named on the
/// command line (no files means stdin, like `cat`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn from_args(paths: Vec<PathBuf>) -> Vec<InputSource> {
        if paths.is_empty() {
            vec![InputSource::Stdin]
        } else {
            paths.into_iter().map(InputSource::File).collect()
        }
    }

    /// Open a buffered line reader. An unreadable file is fatal for the
    /// whole run.
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            InputSource::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open input file: {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}
