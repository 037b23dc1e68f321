pub mod backend;
pub mod classifier;
pub mod comparator;
pub mod error;
pub mod extractor;
pub mod fakes;
pub mod judge0;
pub mod normalizer;
pub mod orchestrator;
pub mod summary;

mod orchestrator_tests;

pub use backend::{ExecutionBackend, LanguageDescriptor, StatusDescriptor};
pub use error::{ErrorKind, RelayError, RelayResult};
pub use judge0::Judge0Client;
pub use orchestrator::Orchestrator;
