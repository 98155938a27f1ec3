pub mod assets;
pub mod ndjson;
pub mod response;
