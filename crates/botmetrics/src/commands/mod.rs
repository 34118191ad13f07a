pub mod errors;
pub mod export;
pub mod history;
pub mod ingest;
pub mod report;
pub mod version;
