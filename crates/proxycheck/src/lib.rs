pub mod admission;
pub mod config;
pub mod schema;

pub use admission::AdmissionGate;
pub use admission::Callbacks;
pub use admission::LoggingCallbacks;
pub use admission::Rejection;
pub use admission::Report;
pub use config::LoadError;
pub use config::LogLevel;
pub use config::load_candidate;
pub use config::parse_candidate;
