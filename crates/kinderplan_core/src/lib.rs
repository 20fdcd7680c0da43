pub mod domain;
pub mod ports;
pub mod seed;
pub mod store;
pub mod suggest;

pub use domain::{
    Activity, ActivityType, AgeGroup, DayEntry, DayTemplate, Document, DocumentType, Newsletter,
    PlanStatus, Section, Weekday, WeeklyPlan,
};
pub use ports::{
    ActivityGenerator, GeneratedActivity, PortError, PortResult, StorageBackend, SuggestionRequest,
};
pub use store::{Backup, MemoryBackend, PlannerStore};
pub use suggest::{Source, SuggestionService, Suggestions};
