pub mod serialization;

pub use serialization::{validate_triples, RdfSerializer};
