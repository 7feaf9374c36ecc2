mod extractor;
mod policy;

pub use extractor::{deduplicate_relationships, RelationshipExtractor};
pub use policy::{
    ExtractionPolicy, PatternPolicy, PolicyKind, RelationCandidate, RelationPattern,
};
