use std::ops::Range;
use crate::ioext::*;
use crate::RegionResult;
use std::io::{
	Read, Write,
	SeekFrom,
};

/// Offset and size are packed together, the same way they are stored
/// in the sector table of a region file.
/// |Offset:3|Size:1|
/// An offset of zero means that the slot is unused, since sector 0 is
/// always occupied by the header.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct RegionSector(u32);

impl RegionSector {
	/// The first sector offset that can no longer be stored in 24 bits.
	pub const OFFSET_LIMIT: u32 = 1 << 24;

	/// Provide offset and size in 4KiB chunks.
	/// Only the low 24 bits of `offset` are kept.
	pub const fn new(offset: u32, size: u8) -> Self {
		Self(offset << 8 | size as u32)
	}

	/// Creates a new empty RegionSector.
	pub const fn empty() -> Self {
		Self(0)
	}

	/// The packed value as it appears in the sector table.
	pub const fn raw(&self) -> u32 {
		self.0
	}

	/// The 4KiB sector offset.
	/// Multiply this by `4096` to get the seek offset.
	pub const fn sector_offset(&self) -> u64 {
		(self.0 >> 8) as u64
	}

	/// The 4KiB sector offset that marks the end of this sector and the start of
	/// the next.
	pub const fn sector_end_offset(&self) -> u64 {
		self.sector_offset() + self.sector_count()
	}

	/// The 4KiB sector count.
	/// Multiply this by `4096` to get the sector size.
	pub const fn sector_count(&self) -> u64 {
		(self.0 & 0xFF) as u64
	}

	/// The range of sector indices covered by this sector.
	pub fn sectors(&self) -> Range<usize> {
		self.sector_offset() as usize..self.sector_end_offset() as usize
	}

	/// The offset in bytes that this sector begins
	/// at in the region file.
	pub const fn offset(&self) -> u64 {
		self.sector_offset() * 4096
	}

	/// The offset in bytes that this sector ends at in the region file.
	pub const fn end_offset(&self) -> u64 {
		self.sector_end_offset() * 4096
	}

	/// The size in bytes that this sector occupies.
	pub const fn size(&self) -> u64 {
		self.sector_count() * 4096
	}

	/// Determines if this is an "empty" sector.
	pub const fn is_empty(&self) -> bool {
		self.0 == 0
	}

	/// Tests if two sectors intersect.
	pub fn intersects(self, rhs: Self) -> bool {
		!(
			self.sector_end_offset() <= rhs.sector_offset()
			|| rhs.sector_end_offset() <= self.sector_offset()
		)
	}
}

impl From<u32> for RegionSector {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

impl From<RegionSector> for u32 {
	fn from(value: RegionSector) -> Self {
		value.0
	}
}

impl From<Range<u32>> for RegionSector {
	fn from(value: Range<u32>) -> Self {
		RegionSector::new(value.start, (value.end - value.start) as u8)
	}
}

impl std::ops::BitAnd for RegionSector {
	type Output = bool;

	/// Checks if two sectors intersect.
	/// Note: If both sectors start at the same position,
	/// but one or both of them are size 0, this will
	/// return false.
	fn bitand(self, rhs: Self) -> Self::Output {
		self.intersects(rhs)
	}
}

impl std::fmt::Display for RegionSector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "(offset: {}, count: {})", self.sector_offset(), self.sector_count())
	}
}

impl Readable for RegionSector {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		Ok(Self(reader.read_value()?))
	}
}

impl Writable for RegionSector {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		writer.write_value(self.0)
	}
}

impl Seekable for RegionSector {
	/// A [SeekFrom] that points to this [RegionSector]
	fn seeker(&self) -> SeekFrom {
		SeekFrom::Start(self.offset())
	}
}
