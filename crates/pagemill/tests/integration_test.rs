#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/ingest_flow.rs"]
mod ingest_flow;

#[path = "integration/page_model.rs"]
mod page_model;

#[path = "integration/assembly.rs"]
mod assembly;

#[path = "integration/editing.rs"]
mod editing;

#[path = "integration/error_cases.rs"]
mod error_cases;
