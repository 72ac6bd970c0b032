//! A storage engine for region files: up to 1024 compressed chunks,
//! addressed by `(x, z)` in `0..32`, stored in 4KiB sectors of a single file.

pub mod macros;
pub mod ioext;
pub mod error;
pub mod region;

pub use flate2;

pub use error::RegionError;
pub use error::RegionResult;
pub use region::{
	regionfile::RegionFile,
	reader::ChunkReader,
	writer::ChunkWriter,
	options::{RegionOptions, OversizePolicy},
	coord::RegionCoord,
	sector::RegionSector,
	timestamp::Timestamp,
};
