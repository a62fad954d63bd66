pub mod query;
pub mod resolve;
pub mod transcribe;

pub use query::ReqwestQuery;
pub use resolve::ScraperResolver;
pub use transcribe::ScraperTranscriber;
