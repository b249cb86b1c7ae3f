pub mod engine;
pub mod evaluate;
pub mod outcome;

pub use engine::{classify, classify_record, explain};
pub use evaluate::evaluate;
pub use outcome::{AnalysisResult, ClassifiedRecord, RankedRecord};
