// Batch pipelines that write into the place store.

pub mod import;
