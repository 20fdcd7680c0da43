pub mod kv_file;
pub mod suggest_llm;

pub use kv_file::FileBackend;
pub use suggest_llm::OpenAiSuggestionAdapter;
