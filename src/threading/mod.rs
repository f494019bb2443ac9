pub mod generation_pipeline;
pub mod thread_pool;

pub use generation_pipeline::{Completion, GenerationPipeline};
pub use thread_pool::ThreadPool;
