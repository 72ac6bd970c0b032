//! Reading and writing chunks in a single region file.

pub mod coord;
pub mod sector;
pub mod timestamp;
pub mod header;
pub mod bitmap;
pub mod compressionscheme;
pub mod reader;
pub mod writer;
pub mod options;
pub mod regionfile;

pub mod prelude {
	pub use super::{
		coord::*,
		sector::*,
		timestamp::*,
		header::*,
		bitmap::*,
		compressionscheme::*,
		reader::*,
		writer::*,
		options::*,
		regionfile::*,
	};
}

/// The size of a single sector in bytes.
pub const SECTOR_BYTES: u64 = 4096;

/// The sector table and the timestamp table each take up one sector.
pub const HEADER_SECTORS: u32 = 2;

/// The size of the region file header in bytes.
pub const HEADER_BYTES: u64 = SECTOR_BYTES * HEADER_SECTORS as u64;

/// Every chunk is prefixed by a 32-bit length and an 8-bit compression scheme.
pub const CHUNK_HEADER_SIZE: usize = 5;

/// A chunk may not take up this many sectors or more.
pub const SECTOR_LIMIT: u32 = 256;

/// Tests if a value is a multiple of 4096.
pub const fn is_multiple_of_4096(n: u64) -> bool {
	(n & 4095) == 0
}

/// Counts the number of 4KiB sectors needed to store a chunk whose
/// compressed payload is `payload_length` bytes long.
/// Note that a frame landing exactly on a sector boundary is given one
/// extra sector, which keeps the layout identical to existing files.
pub const fn required_sectors(payload_length: usize) -> u32 {
	((payload_length + CHUNK_HEADER_SIZE) / SECTOR_BYTES as usize) as u32 + 1
}

/// Returns the 4KiB pad size for the given size.
/// The pad size is the number of bytes required
/// to add to the size in order to make it a
/// multiple of 4096.
pub const fn pad_size(size: u64) -> u64 {
	// Some bit-level hacking makes this really easy.
	(4096 - (size & 4095)) & 4095
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sector_math() {
		assert_eq!(required_sectors(0), 1);
		assert_eq!(required_sectors(4090), 1);
		assert_eq!(required_sectors(4091), 2);
		assert_eq!(required_sectors(255 * 4096 - 6), 255);
		assert_eq!(required_sectors(255 * 4096 - 5), 256);
		assert_eq!(pad_size(0), 0);
		assert_eq!(pad_size(1), 4095);
		assert_eq!(pad_size(4096), 0);
		assert_eq!(pad_size(8193), 4095);
		assert!(is_multiple_of_4096(8192));
		assert!(!is_multiple_of_4096(8191));
	}
}
