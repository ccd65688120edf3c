pub mod listen;

pub use listen::{AdditionalInfo, ListenRecord, ListensEnvelope, Page, TrackMetadata};
