pub mod extractor;
pub mod normalize;
pub mod similarity;

pub use extractor::{extract_order, MATCH_THRESHOLD};
pub use normalize::{normalize, tokenize};
pub use similarity::similarity;
