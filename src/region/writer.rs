use std::io::{
	self,
	Write, Seek,
};

use flate2::{
	Compression,
	write::ZlibEncoder,
};

use crate::{
	RegionResult,
	ioext::*,
};

use super::{
	coord::*,
	sector::*,
	compressionscheme::*,
	regionfile::RegionFile,
};

/// Writes a chunk frame at the start of `sector`: the 32-bit length
/// (which counts the compression byte), the compression scheme, then
/// the already compressed payload.
/// Nothing past the end of the payload is touched, so stale bytes from
/// an older, longer chunk may remain in the last sector.
pub fn write_frame<W: Write + Seek>(
	writer: &mut W,
	sector: RegionSector,
	compression: CompressionScheme,
	payload: &[u8],
) -> RegionResult<()> {
	writer.seek(sector.seeker())?;
	writer.write_value((payload.len() + 1) as i32)?;
	writer.write_value(compression)?;
	writer.write_all(payload)?;
	Ok(())
}

/// A scoped sink for a single chunk.
/// Bytes written to it are compressed into memory. When the writer is
/// committed (or dropped) the compressed chunk is placed into the region
/// file. This happens exactly once.
pub struct ChunkWriter<'a> {
	region: &'a RegionFile,
	coord: RegionCoord,
	encoder: Option<ZlibEncoder<Vec<u8>>>,
}

impl<'a> ChunkWriter<'a> {
	pub(crate) fn new(region: &'a RegionFile, coord: RegionCoord, compression: Compression) -> Self {
		Self {
			region,
			coord,
			encoder: Some(ZlibEncoder::new(Vec::with_capacity(8192), compression)),
		}
	}

	/// The coordinate that this chunk will be written to.
	pub fn coord(&self) -> RegionCoord {
		self.coord
	}

	/// Finishes compression and stores the chunk in the region file.
	/// Returns the sector that the chunk was written to, or `None` if the
	/// chunk was discarded for being too large.
	pub fn commit(mut self) -> RegionResult<Option<RegionSector>> {
		self.finish()
	}

	fn finish(&mut self) -> RegionResult<Option<RegionSector>> {
		let Some(encoder) = self.encoder.take() else {
			return Ok(None);
		};
		let data = encoder.finish()?;
		self.region.write_compressed(self.coord, &data)
	}
}

impl<'a> Write for ChunkWriter<'a> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self.encoder.as_mut() {
			Some(encoder) => encoder.write(buf),
			None => Err(io::Error::new(io::ErrorKind::Other, "chunk has already been committed")),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self.encoder.as_mut() {
			Some(encoder) => encoder.flush(),
			None => Ok(()),
		}
	}
}

impl<'a> Drop for ChunkWriter<'a> {
	fn drop(&mut self) {
		if self.encoder.is_none() {
			return;
		}
		// Don't store a half written chunk while unwinding.
		if std::thread::panicking() {
			log::warn!("Discarding chunk {} after a panic", self.coord);
			return;
		}
		if let Err(err) = self.finish() {
			log::error!("Failed to write chunk {} to {:?}: {}", self.coord, self.region.path(), err);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn frame_layout() {
		let mut file = Cursor::new(vec![0xEEu8; 4096 * 3]);
		write_frame(&mut file, RegionSector::new(2, 1), CompressionScheme::ZLib, &[9, 8, 7]).unwrap();
		let bytes = file.get_ref();
		assert_eq!(&bytes[8192..8192 + 8], &[0, 0, 0, 4, 2, 9, 8, 7]);
		assert_eq!(bytes[8192 + 8], 0xEE);
		assert_eq!(bytes[8191], 0xEE);
	}
}
