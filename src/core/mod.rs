pub mod converter;

pub use converter::{
    ConvertError, CoordinateRecord, LineConverter, Object, RdfTriple, SubjectMode,
};
