use crate::{
	ioext::*,
	RegionResult,
};

use super::sector::*;
use super::timestamp::*;
use super::coord::*;

use std::{
	io::{
		Read, Write,
		Seek, SeekFrom,
	},
	ops::{
		Index, IndexMut,
	},
};

/// This trait defines the offset in a file where
/// a table can be found for a specific type.
/// It is meant to be implemented for [RegionSector] and [Timestamp].
pub trait RegionTableItem: Readable + Writable + Copy + Default {
	/// The offset in the file that this type's table begins.
	const OFFSET: u64;
}

impl RegionTableItem for RegionSector {
	const OFFSET: u64 = 0;
}

impl RegionTableItem for Timestamp {
	const OFFSET: u64 = 4096;
}

/// A table of 1024 elements that contain information related to
/// a chunk within a region file.
#[derive(Debug, Clone)]
pub struct RegionTable<T: RegionTableItem>(Box<[T; 1024]>);

/// A table of 1024 [RegionSector] elements for each potential chunk in
/// a 32x32 chunk region file.
pub type SectorTable = RegionTable<RegionSector>;

/// A table of 1024 [Timestamp] elements for each potential chunk in a
/// 32x32 chunk region file.
pub type TimestampTable = RegionTable<Timestamp>;

/// The header at the beginning of every region file.
/// It contains 1024 [RegionSector] elements and 1024 [Timestamp] elements.
#[derive(Debug, Clone, Default)]
pub struct RegionHeader {
	/// The sector table, containing information about where chunks exist
	/// in the file.
	pub sectors: SectorTable,
	/// The timestamp table, which tells the last modification time for the chunk.
	pub timestamps: TimestampTable,
}

impl<T: RegionTableItem> RegionTable<T> {
	pub const OFFSET: u64 = T::OFFSET;

	/// Returns a [SeekFrom] value that will seek to the
	/// beginning of the table.
	pub const fn seeker() -> SeekFrom {
		SeekFrom::Start(Self::OFFSET)
	}

	/// The location of a single entry in the file.
	pub fn entry_offset(coord: RegionCoord) -> u64 {
		Self::OFFSET + coord.index() as u64 * 4
	}

	/// Returns an iterator of the elements in the table.
	pub fn iter(&self) -> std::slice::Iter<T> {
		self.0.iter()
	}

	/// Updates a single entry in memory, then writes that entry
	/// (and only that entry) to the region file.
	pub fn write_entry<W: Write + Seek>(&mut self, writer: &mut W, coord: RegionCoord, value: T) -> RegionResult<()> {
		self.0[coord.index()] = value;
		writer.seek(SeekFrom::Start(Self::entry_offset(coord)))?;
		writer.write_value(value)?;
		Ok(())
	}
}

impl<T: RegionTableItem> Default for RegionTable<T> {
	fn default() -> Self {
		Self(Box::new([T::default(); 1024]))
	}
}

impl<T: RegionTableItem> Index<RegionCoord> for RegionTable<T> {
	type Output = T;

	fn index(&self, index: RegionCoord) -> &Self::Output {
		&self.0[index.index()]
	}
}

impl<T: RegionTableItem> IndexMut<RegionCoord> for RegionTable<T> {
	fn index_mut(&mut self, index: RegionCoord) -> &mut Self::Output {
		&mut self.0[index.index()]
	}
}

impl<T: RegionTableItem> Readable for RegionTable<T> {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		let mut table = Self::default();
		for item in table.0.iter_mut() {
			*item = T::read_from(reader)?;
		}
		Ok(table)
	}
}

impl<T: RegionTableItem> Writable for RegionTable<T> {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		let mut write_size: usize = 0;
		for item in self.0.iter() {
			write_size += item.write_to(writer)?;
		}
		Ok(write_size)
	}
}

impl Readable for RegionHeader {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		Ok(Self {
			sectors: SectorTable::read_from(reader)?,
			timestamps: TimestampTable::read_from(reader)?,
		})
	}
}

impl Writable for RegionHeader {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		Ok(
			self.sectors.write_to(writer)? + self.timestamps.write_to(writer)?
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn header_round_trip() {
		let mut header = RegionHeader::default();
		let coord = RegionCoord::try_new(5, 7).unwrap();
		header.sectors[coord] = RegionSector::new(9, 3);
		header.timestamps[coord] = Timestamp::new(1234);
		let mut buffer = Vec::new();
		assert_eq!(header.write_to(&mut buffer).unwrap(), 8192);
		let read = RegionHeader::read_from(&mut buffer.as_slice()).unwrap();
		assert_eq!(read.sectors[coord], RegionSector::new(9, 3));
		assert_eq!(read.timestamps[coord], Timestamp::new(1234));
		assert_eq!(read.sectors.iter().filter(|s| !s.is_empty()).count(), 1);
	}

	#[test]
	fn write_entry_touches_only_its_slot() {
		let mut file = Cursor::new(vec![0u8; 8192]);
		let mut header = RegionHeader::default();
		let coord = RegionCoord::try_new(1, 1).unwrap();
		header.sectors.write_entry(&mut file, coord, RegionSector::new(2, 1)).unwrap();
		header.timestamps.write_entry(&mut file, coord, Timestamp::new(0x0A0B0C0D)).unwrap();
		let bytes = file.get_ref();
		assert_eq!(&bytes[33 * 4..33 * 4 + 4], &[0, 0, 2, 1]);
		assert_eq!(&bytes[4096 + 33 * 4..4096 + 33 * 4 + 4], &[0x0A, 0x0B, 0x0C, 0x0D]);
		assert_eq!(bytes.iter().filter(|&&b| b != 0).count(), 6);
		assert_eq!(header.sectors[coord], RegionSector::new(2, 1));
	}
}
