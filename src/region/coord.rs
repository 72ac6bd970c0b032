use crate::{
	for_each_int_type,
	RegionError,
};
use std::io::SeekFrom;

/// A region file contains up to 1024 chunks, which is 32x32 chunks.
/// This struct represents a chunk coordinate within a region file.
/// Unlike a world coordinate, it is never wrapped: values outside of
/// `0..32` do not produce a [RegionCoord].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct RegionCoord(u16);

impl RegionCoord {
	/// The width (and depth) of a region in chunks.
	pub const SIZE: i32 = 32;
	/// The number of chunk slots in a region.
	pub const COUNT: usize = 1024;

	/// Create a new [RegionCoord], or `None` if either axis is outside of `0..32`.
	pub fn try_new(x: i32, z: i32) -> Option<Self> {
		if Self::in_bounds(x, z) {
			Some(Self((x | (z << 5)) as u16))
		} else {
			None
		}
	}

	/// Tests if `(x, z)` addresses a slot in a region file.
	pub fn in_bounds(x: i32, z: i32) -> bool {
		(0..Self::SIZE).contains(&x) && (0..Self::SIZE).contains(&z)
	}

	/// Create a [RegionCoord] from a slot index in `0..1024`.
	pub fn from_index(index: usize) -> Option<Self> {
		if index < Self::COUNT {
			Some(Self(index as u16))
		} else {
			None
		}
	}

	/// Iterates every coordinate in slot order.
	pub fn iter() -> impl Iterator<Item = RegionCoord> {
		(0..Self::COUNT as u16).map(RegionCoord)
	}

	/// The slot index (`x + z * 32`).
	pub fn index(&self) -> usize {
		self.0 as usize
	}

	pub fn x(&self) -> i32 {
		(self.0 & 31) as i32
	}

	pub fn z(&self) -> i32 {
		(self.0 >> 5) as i32
	}

	/// Get a [SeekFrom] value that can be used to seek to the location where
	/// this chunk's sector offset is stored in the sector offset table.
	pub fn sector_table_offset(&self) -> SeekFrom {
		SeekFrom::Start(self.0 as u64 * 4)
	}

	/// Get a [SeekFrom] value that can be used to seek to the location where
	/// this chunk's timestamp is stored in the timestamp table.
	pub fn timestamp_table_offset(&self) -> SeekFrom {
		SeekFrom::Start(self.0 as u64 * 4 + 4096)
	}
}

macro_rules! __regioncoord_impl {
	($type:ty) => {
		impl TryFrom<($type, $type)> for RegionCoord {
			type Error = RegionError;

			fn try_from(value: ($type, $type)) -> Result<Self, Self::Error> {
				RegionError::range_check(value.0, (0 as $type)..(32 as $type))?;
				RegionError::range_check(value.1, (0 as $type)..(32 as $type))?;
				RegionCoord::try_new(value.0 as i32, value.1 as i32).ok_or(RegionError::OutOfRange)
			}
		}

		impl From<RegionCoord> for ($type, $type) {
			fn from(value: RegionCoord) -> Self {
				(value.x() as $type, value.z() as $type)
			}
		}
	};
}

for_each_int_type!(__regioncoord_impl);

impl std::fmt::Display for RegionCoord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}, {})", self.x(), self.z())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn linearization() {
		let coord = RegionCoord::try_new(3, 2).unwrap();
		assert_eq!(coord.index(), 3 + 2 * 32);
		assert_eq!((coord.x(), coord.z()), (3, 2));
		assert_eq!(coord.sector_table_offset(), SeekFrom::Start(4 * 67));
		assert_eq!(coord.timestamp_table_offset(), SeekFrom::Start(4096 + 4 * 67));
		let last = RegionCoord::try_new(31, 31).unwrap();
		assert_eq!(last.index(), 1023);
	}

	#[test]
	fn out_of_bounds_is_rejected() {
		assert_eq!(RegionCoord::try_new(32, 0), None);
		assert_eq!(RegionCoord::try_new(0, -1), None);
		assert_eq!(RegionCoord::try_new(-1, 5), None);
		assert_eq!(RegionCoord::from_index(1024), None);
		assert!(RegionCoord::try_from((32u8, 0u8)).is_err());
		assert!(RegionCoord::try_from((-1i64, 0i64)).is_err());
		let coord = RegionCoord::try_from((4usize, 9usize)).unwrap();
		assert_eq!(<(i16, i16)>::from(coord), (4, 9));
	}

	#[test]
	fn iter_covers_every_slot() {
		let coords: Vec<RegionCoord> = RegionCoord::iter().collect();
		assert_eq!(coords.len(), 1024);
		for (index, coord) in coords.iter().enumerate() {
			assert_eq!(coord.index(), index);
			assert_eq!(RegionCoord::try_new(coord.x(), coord.z()), Some(*coord));
		}
	}
}
