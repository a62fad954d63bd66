pub mod crawl;
pub mod dsv;
pub mod error;
pub mod interval;
pub mod models;
pub mod scheduler;
pub mod seen;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use crawl::CrawlService;
pub use error::{CrawlError, CrawlStage};
pub use models::{CrawlOutput, FormatOptions, QueryKind, ResolvedCharacter, Transcript};
pub use scheduler::{Scheduler, SchedulerConfig, TracingSchedulerReporter};
pub use seen::{RawId, SeenIds};
pub use traits::{CharacterResolver, RecordStore, RollQuery, RollTranscriber};
