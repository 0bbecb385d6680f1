pub mod config;
pub mod core;
pub mod handlers;
pub mod utils;

pub use config::{OutputFormat, Vocabulary};
pub use crate::core::{LineConverter, RdfTriple, SubjectMode};
pub use handlers::InputSource;
pub use utils::RdfSerializer;
