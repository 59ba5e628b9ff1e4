// Match snapshots for resume
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, MatchSnapshot};
pub use manager::{SaveManager, SnapshotInfo};
pub use migration::migrate_snapshot;

pub const SNAPSHOT_VERSION: u32 = 1;
