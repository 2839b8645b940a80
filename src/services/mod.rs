pub mod decoder;
pub mod encoder;
pub mod quantity;
pub mod scope;
pub mod specimens;
pub mod verdict;

pub use decoder::{decode, Decoded, Decoder};
pub use encoder::{encode, Encoder};
pub use quantity::QuantityHeuristic;
pub use scope::effective_scope;
pub use verdict::{evaluate, evaluate_detailed, Evaluation, Verdict};
