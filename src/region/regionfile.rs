use std::{
	fs::File,
	io::{
		BufReader,
		Read, Write,
		Seek, SeekFrom,
	},
	path::{
		Path, PathBuf,
	},
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
	RegionResult, RegionError,
	ioext::*,
	return_if,
};

use super::{
	coord::*,
	sector::*,
	timestamp::*,
	header::*,
	bitmap::*,
	compressionscheme::*,
	reader::*,
	writer::*,
	options::*,
	SECTOR_BYTES,
	HEADER_BYTES,
	SECTOR_LIMIT,
	pad_size,
	required_sectors,
};

/// The state of an open region file: the header, the free sectors, and
/// the stream that they describe.
/// Every change to the header is written through to the stream as soon
/// as it is made.
pub struct RegionStore<S: Read + Write + Seek> {
	header: RegionHeader,
	bitmap: SectorBitmap,
	stream: S,
	/// The number of bytes that the stream has grown by since it was loaded.
	size_delta: u64,
	oversize: OversizePolicy,
}

impl<S: Read + Write + Seek> RegionStore<S> {
	/// Loads a region file from a stream, creating the header if the
	/// stream is too short to hold one.
	pub fn load(mut stream: S, oversize: OversizePolicy) -> RegionResult<Self> {
		let (header, bitmap, grown) = Self::scan(&mut stream)?;
		Ok(Self {
			header,
			bitmap,
			stream,
			size_delta: grown,
			oversize,
		})
	}

	/// Reads the header back out of the stream and rebuilds the bitmap.
	pub fn reload(&mut self) -> RegionResult<()> {
		let (header, bitmap, grown) = Self::scan(&mut self.stream)?;
		self.header = header;
		self.bitmap = bitmap;
		self.size_delta += grown;
		Ok(())
	}

	/// Makes sure the stream is at least as large as the header and a
	/// multiple of 4096 bytes, then reads the header and builds the bitmap.
	fn scan(stream: &mut S) -> RegionResult<(RegionHeader, SectorBitmap, u64)> {
		let mut length = stream.stream_end()?;
		let mut grown = 0;
		if length < HEADER_BYTES {
			grown += stream.write_zeroes(HEADER_BYTES - length)?;
			length = HEADER_BYTES;
		}
		let padding = pad_size(length);
		if padding != 0 {
			grown += stream.write_zeroes(padding)?;
			length += padding;
		}
		stream.flush()?;
		stream.seek(SeekFrom::Start(0))?;
		let header = {
			let mut reader = BufReader::new(Read::take(&mut *stream, HEADER_BYTES));
			RegionHeader::read_from(&mut reader)?
		};
		let (bitmap, rejected) = SectorBitmap::from_table((length / SECTOR_BYTES) as usize, &header.sectors);
		for sector in rejected {
			log::warn!("Ignoring chunk at sector {} that does not fit in the region file", sector);
		}
		Ok((header, bitmap, grown))
	}

	pub fn sector(&self, coord: RegionCoord) -> RegionSector {
		self.header.sectors[coord]
	}

	pub fn timestamp(&self, coord: RegionCoord) -> Timestamp {
		self.header.timestamps[coord]
	}

	pub fn header(&self) -> &RegionHeader {
		&self.header
	}

	pub fn bitmap(&self) -> &SectorBitmap {
		&self.bitmap
	}

	pub fn size_delta(&self) -> u64 {
		self.size_delta
	}

	/// Reads the chunk at `coord`. Returns `None` if there is no chunk, or
	/// if the chunk's sector or frame is invalid.
	pub fn read(&mut self, coord: RegionCoord) -> RegionResult<Option<ChunkReader>> {
		let sector = self.header.sectors[coord];
		return_if!(sector.is_empty() => Ok(None));
		if !self.bitmap.contains(sector) {
			log::warn!("Chunk {} points at sector {} which is outside of the region file", coord, sector);
			return Ok(None);
		}
		read_frame(&mut self.stream, sector)
	}

	/// Places an already compressed (ZLib) chunk into the region file.
	/// The chunk is rewritten in place if it needs the same number of
	/// sectors as before, otherwise it's moved to the first run of free
	/// sectors that is large enough, growing the file if there is none.
	pub fn write_chunk(&mut self, coord: RegionCoord, data: &[u8]) -> RegionResult<Option<RegionSector>> {
		let required = required_sectors(data.len());
		if required >= SECTOR_LIMIT {
			match self.oversize {
				OversizePolicy::Reject => return Err(RegionError::ChunkTooLarge { sectors: required }),
				OversizePolicy::Discard => {
					log::warn!("Discarding chunk {} because it needs {} sectors", coord, required);
					return Ok(None);
				}
			}
		}
		let required = required as u8;
		let current = self.header.sectors[coord];
		let owned = !current.is_empty() && self.bitmap.contains(current);
		let sector = if owned && current.sector_count() == required as u64 {
			log::trace!("Rewriting chunk {} in place at {}", coord, current);
			write_frame(&mut self.stream, current, CompressionScheme::ZLib, data)?;
			current
		} else {
			if owned {
				self.bitmap.free(current);
			}
			let allocation = match self.bitmap.allocate(required) {
				Some(allocation) => allocation,
				None => {
					if owned {
						self.bitmap.mark_occupied(current);
					}
					return Err(RegionError::RegionAllocationFailure);
				}
			};
			let sector = allocation.sector();
			if let Allocation::Appended(_) = allocation {
				log::trace!("Growing region file by {} sectors for chunk {}", required, coord);
				self.stream.seek(sector.seeker())?;
				self.size_delta += self.stream.write_zeroes(sector.size())?;
			} else {
				log::trace!("Moving chunk {} to {}", coord, sector);
			}
			write_frame(&mut self.stream, sector, CompressionScheme::ZLib, data)?;
			self.header.sectors.write_entry(&mut self.stream, coord, sector)?;
			sector
		};
		self.header.timestamps.write_entry(&mut self.stream, coord, Timestamp::utc_now())?;
		self.stream.flush()?;
		Ok(Some(sector))
	}

	pub fn flush(&mut self) -> RegionResult<()> {
		Ok(self.stream.flush()?)
	}

	/// Returns the underlying stream.
	pub fn into_inner(self) -> S {
		self.stream
	}
}

/// A region file on disk.
/// All access to the file goes through a single lock, so a [RegionFile]
/// can be shared between threads.
pub struct RegionFile {
	path: PathBuf,
	options: RegionOptions,
	last_modified: Option<DateTime<Utc>>,
	store: Mutex<Option<RegionStore<File>>>,
}

impl RegionFile {
	/// Opens or creates the region file at `path` with the default options.
	pub fn open<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
		Self::open_with(path, RegionOptions::default())
	}

	/// Opens or creates the region file at `path`.
	/// Short files are extended to fit the header, and files that aren't a
	/// multiple of 4096 bytes are padded.
	pub fn open_with<P: AsRef<Path>>(path: P, options: RegionOptions) -> RegionResult<Self> {
		let path = path.as_ref();
		let last_modified = path.metadata()
			.and_then(|metadata| metadata.modified())
			.ok()
			.map(DateTime::<Utc>::from);
		let file = File::options().read(true).write(true).create(true).open(path)?;
		let store = RegionStore::load(file, options.oversize)?;
		log::debug!(
			"Opened region file {:?} ({} sectors, {} free)",
			path,
			store.bitmap().len(),
			store.bitmap().free_count(),
		);
		Ok(Self {
			path: path.to_owned(),
			options,
			last_modified,
			store: Mutex::new(Some(store)),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn options(&self) -> &RegionOptions {
		&self.options
	}

	/// The modification time of the file when it was opened, if it existed.
	pub fn last_modified(&self) -> Option<DateTime<Utc>> {
		self.last_modified
	}

	fn with_store<T, F>(&self, f: F) -> RegionResult<T>
	where
	F: FnOnce(&mut RegionStore<File>) -> RegionResult<T> {
		let mut guard = self.store.lock();
		let store = guard.as_mut().ok_or(RegionError::Closed)?;
		f(store)
	}

	/// Opens a decompressing reader for the chunk at `(x, z)`.
	/// Returns `None` if the coordinate is outside of the region, if there
	/// is no chunk there, or if the chunk is corrupt.
	pub fn read(&self, x: i32, z: i32) -> RegionResult<Option<ChunkReader>> {
		let Some(coord) = RegionCoord::try_new(x, z) else {
			return Ok(None);
		};
		self.with_store(|store| store.read(coord))
	}

	/// Begins writing the chunk at `(x, z)`. The chunk is stored when the
	/// returned writer is committed or dropped.
	/// Returns `None` if the coordinate is outside of the region.
	pub fn begin_write(&self, x: i32, z: i32) -> Option<ChunkWriter<'_>> {
		RegionCoord::try_new(x, z)
			.map(|coord| ChunkWriter::new(self, coord, self.options.compression))
	}

	/// Compresses and stores `data` as the chunk at `(x, z)`.
	pub fn write_chunk(&self, x: i32, z: i32, data: &[u8]) -> RegionResult<Option<RegionSector>> {
		let Some(mut writer) = self.begin_write(x, z) else {
			return Ok(None);
		};
		writer.write_all(data)?;
		writer.commit()
	}

	pub(crate) fn write_compressed(&self, coord: RegionCoord, data: &[u8]) -> RegionResult<Option<RegionSector>> {
		self.with_store(|store| store.write_chunk(coord, data))
	}

	/// The sector descriptor at `(x, z)`, or `None` if the coordinate is
	/// outside of the region.
	pub fn sector(&self, x: i32, z: i32) -> RegionResult<Option<RegionSector>> {
		let Some(coord) = RegionCoord::try_new(x, z) else {
			return Ok(None);
		};
		self.with_store(|store| Ok(Some(store.sector(coord))))
	}

	/// The last time the chunk at `(x, z)` was written, or `None` if the
	/// coordinate is outside of the region.
	pub fn timestamp(&self, x: i32, z: i32) -> RegionResult<Option<Timestamp>> {
		let Some(coord) = RegionCoord::try_new(x, z) else {
			return Ok(None);
		};
		self.with_store(|store| Ok(Some(store.timestamp(coord))))
	}

	pub fn has_chunk(&self, x: i32, z: i32) -> RegionResult<bool> {
		Ok(self.sector(x, z)?.map_or(false, |sector| !sector.is_empty()))
	}

	/// The number of 4KiB sectors in the file, including the header.
	pub fn sector_count(&self) -> RegionResult<usize> {
		self.with_store(|store| Ok(store.bitmap().len()))
	}

	pub fn free_sector_count(&self) -> RegionResult<usize> {
		self.with_store(|store| Ok(store.bitmap().free_count()))
	}

	/// The number of bytes that the file has grown by since it was opened.
	pub fn size_delta(&self) -> RegionResult<u64> {
		self.with_store(|store| Ok(store.size_delta()))
	}

	/// Rebuilds the in-memory header and bitmap from the file.
	/// After an IO error the in-memory state may no longer match what's on
	/// disk; this brings them back in line.
	pub fn reload(&self) -> RegionResult<()> {
		self.with_store(|store| {
			store.reload()?;
			log::debug!("Reloaded region file {:?}", self.path);
			Ok(())
		})
	}

	pub fn is_closed(&self) -> bool {
		self.store.lock().is_none()
	}

	/// Closes the file. Calling this more than once does nothing.
	/// Any other use of the region file after it is closed results in
	/// [RegionError::Closed].
	pub fn close(&self) -> RegionResult<()> {
		if let Some(mut store) = self.store.lock().take() {
			store.flush()?;
			log::debug!("Closed region file {:?}", self.path);
		}
		Ok(())
	}
}

impl std::fmt::Debug for RegionFile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegionFile")
			.field("path", &self.path)
			.field("closed", &self.is_closed())
			.finish()
	}
}
