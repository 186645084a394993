pub mod analysis;
pub mod buffer_pool;
pub mod config;
pub mod counter;
pub mod discovery;
pub mod errors;
pub mod frequency;
pub mod metrics;
pub mod pipeline;
pub mod results;
pub mod stopwords;

pub use analysis::analyze;
pub use analysis::pool::{FileWorkerPool, PoolHandle};
pub use analysis::processor::{FileSource, FsSource};
pub use config::{AnalysisConfig, EncodingMode, Parallelism};
pub use errors::{AnalysisError, AnalysisResult};
pub use frequency::FrequencyMap;
pub use metrics::{AnalysisMetrics, AnalysisStats};
pub use results::{AnalysisReport, FileFailure, FileResult, WordCount};
pub use stopwords::Stopwords;
