pub mod builder;
pub mod config;
pub mod errors;
pub mod history;
pub mod logging;
pub mod models;
pub mod progression;
pub mod routines;
pub mod store;
pub mod timer;

pub use builder::{SessionBuilder, SetInput, SetInputs};
pub use errors::{AppError, StoreError};
pub use history::HistoryIndex;
pub use models::{DayKey, RawValue, Session, SessionType};
pub use progression::{estimate_1rm, ProgressionEngine, Suggestion, SuggestionBasis};
pub use store::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore};
