pub mod listenbrainz;
pub mod retry;
pub mod trait_def;

pub use listenbrainz::ListenBrainzClient;
pub use retry::{fetch_with_retry, RetryPolicy};
pub use trait_def::{ListenSource, SourceError, SourceResult};
