use flate2::Compression;

/// What to do with a chunk that needs 256 sectors or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
	/// Fail the write with [crate::RegionError::ChunkTooLarge].
	#[default]
	Reject,
	/// Drop the chunk without touching the file, logging a warning.
	/// This is how older region file implementations behave.
	Discard,
}

/// Settings used when opening a [super::regionfile::RegionFile].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOptions {
	/// ZLib compression level for new chunks.
	pub compression: Compression,
	pub oversize: OversizePolicy,
}

impl Default for RegionOptions {
	fn default() -> Self {
		Self {
			compression: Compression::default(),
			oversize: OversizePolicy::default(),
		}
	}
}

impl RegionOptions {
	pub fn with_compression(mut self, compression: Compression) -> Self {
		self.compression = compression;
		self
	}

	pub fn with_oversize_policy(mut self, oversize: OversizePolicy) -> Self {
		self.oversize = oversize;
		self
	}
}
