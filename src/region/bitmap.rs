use crate::return_if;

use super::{
	sector::*,
	header::SectorTable,
	HEADER_SECTORS,
};

/// The result of a successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
	/// The sector was found in space that the file already has.
	Reused(RegionSector),
	/// There was no run large enough, so the sector was appended to
	/// the end. The caller is expected to grow the backing file by
	/// the sector's size.
	Appended(RegionSector),
}

impl Allocation {
	pub fn sector(&self) -> RegionSector {
		match self {
			Allocation::Reused(sector) | Allocation::Appended(sector) => *sector,
		}
	}
}

pub trait SectorAllocator {
	/// Frees a sector, allowing it to be reused.
	fn free(&mut self, sector: RegionSector);
	/// Allocate a sector of a specified size. Returns `None` only when
	/// the sector can't be addressed by a [RegionSector].
	#[must_use]
	fn allocate(&mut self, size: u8) -> Option<Allocation>;
}

/// Keeps track of which 4KiB sectors in a region file are free.
/// There is one entry for every sector in the file, including the two
/// header sectors, which are always occupied.
/// Allocation is first-fit, and the bitmap never shrinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorBitmap {
	/// `true` means that the sector is free.
	free: Vec<bool>,
}

impl SectorBitmap {
	/// Creates a bitmap for a file that is `sector_count` sectors long
	/// where every sector except for the header is free.
	pub fn new(sector_count: usize) -> Self {
		let mut free = vec![true; sector_count.max(HEADER_SECTORS as usize)];
		free[..HEADER_SECTORS as usize].fill(false);
		Self {
			free,
		}
	}

	/// Builds the bitmap for a file that is `sector_count` sectors long
	/// from its sector table. Sectors that don't fit inside of the file,
	/// or that overlap the header, are left out and returned so that the
	/// caller can report them.
	pub fn from_table(sector_count: usize, table: &SectorTable) -> (Self, Vec<RegionSector>) {
		let mut bitmap = Self::new(sector_count);
		let rejected = table.iter()
			.copied()
			.filter(|sector| !sector.is_empty())
			.filter(|&sector| {
				if bitmap.contains(sector) {
					bitmap.mark_occupied(sector);
					false
				} else {
					true
				}
			})
			.collect();
		(bitmap, rejected)
	}

	/// The number of sectors in the file, including the header.
	pub fn len(&self) -> usize {
		self.free.len()
	}

	pub fn is_empty(&self) -> bool {
		self.free.is_empty()
	}

	/// Counts the free sectors.
	pub fn free_count(&self) -> usize {
		self.free.iter().filter(|&&free| free).count()
	}

	pub fn is_free(&self, index: usize) -> bool {
		self.free.get(index).copied().unwrap_or(false)
	}

	/// Tests if a sector lies entirely within the file, past the header.
	pub fn contains(&self, sector: RegionSector) -> bool {
		sector.sector_offset() >= HEADER_SECTORS as u64
		&& sector.sector_end_offset() <= self.free.len() as u64
	}

	pub fn mark_occupied(&mut self, sector: RegionSector) {
		self.set(sector, false);
	}

	pub fn mark_free(&mut self, sector: RegionSector) {
		self.set(sector, true);
	}

	/// Header sectors are never changed, and anything past the end of
	/// the bitmap is ignored.
	fn set(&mut self, sector: RegionSector, free: bool) {
		let start = (sector.sector_offset() as usize).max(HEADER_SECTORS as usize);
		let end = (sector.sector_end_offset() as usize).min(self.free.len());
		if start < end {
			self.free[start..end].fill(free);
		}
	}

	/// Finds the first run of `size` free sectors.
	pub fn find_run(&self, size: u8) -> Option<u32> {
		return_if!(size == 0 => None);
		let mut run_start = 0;
		let mut run_length = 0;
		for (index, &free) in self.free.iter().enumerate() {
			if !free {
				run_length = 0;
				continue;
			}
			if run_length == 0 {
				run_start = index;
			}
			run_length += 1;
			return_if!(run_length >= size as usize => Some(run_start as u32));
		}
		None
	}
}

impl SectorAllocator for SectorBitmap {
	fn free(&mut self, sector: RegionSector) {
		return_if!(sector.is_empty());
		self.mark_free(sector);
	}

	fn allocate(&mut self, size: u8) -> Option<Allocation> {
		if let Some(start) = self.find_run(size) {
			let sector = RegionSector::new(start, size);
			self.mark_occupied(sector);
			return Some(Allocation::Reused(sector));
		}
		let start = self.free.len() as u32;
		if size == 0 || start as u64 + size as u64 > RegionSector::OFFSET_LIMIT as u64 {
			return None;
		}
		self.free.resize(self.free.len() + size as usize, false);
		Some(Allocation::Appended(RegionSector::new(start, size)))
	}
}
