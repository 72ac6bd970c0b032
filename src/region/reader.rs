use std::io::{
	Cursor,
	Read, Seek,
};

use flate2::read::{
	GzDecoder,
	ZlibDecoder,
};

use crate::{
	RegionResult,
	ioext::*,
};

use super::{
	sector::*,
	compressionscheme::*,
};

/// A decompressing stream over the payload of a single chunk.
/// The compressed bytes are read out of the region file up front,
/// so the region file is free to be used while this is being read.
pub enum ChunkReader {
	GZip(GzDecoder<Cursor<Vec<u8>>>),
	ZLib(ZlibDecoder<Cursor<Vec<u8>>>),
}

impl ChunkReader {
	pub fn new(compression: CompressionScheme, data: Vec<u8>) -> Self {
		match compression {
			CompressionScheme::GZip => Self::GZip(GzDecoder::new(Cursor::new(data))),
			CompressionScheme::ZLib => Self::ZLib(ZlibDecoder::new(Cursor::new(data))),
		}
	}

	/// The compression scheme that the chunk was stored with.
	pub fn compression(&self) -> CompressionScheme {
		match self {
			Self::GZip(_) => CompressionScheme::GZip,
			Self::ZLib(_) => CompressionScheme::ZLib,
		}
	}

	/// Decompresses the rest of the chunk into a buffer.
	pub fn into_bytes(mut self) -> RegionResult<Vec<u8>> {
		let mut buffer = Vec::new();
		self.read_to_end(&mut buffer)?;
		Ok(buffer)
	}
}

impl Read for ChunkReader {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		match self {
			Self::GZip(gzip) => gzip.read(buf),
			Self::ZLib(zlib) => zlib.read(buf),
		}
	}
}

/// Reads the frame of a chunk that begins at `sector`.
/// A frame is a 32-bit length (counting the compression byte), an 8-bit
/// compression scheme, then the compressed payload.
/// Frames with a length that doesn't fit the sector, an unknown
/// compression scheme, or a payload cut short by the end of the stream
/// are treated as missing.
pub fn read_frame<R: Read + Seek>(reader: &mut R, sector: RegionSector) -> RegionResult<Option<ChunkReader>> {
	reader.seek(sector.seeker())?;
	let length: i32 = reader.read_value()?;
	if length <= 0 || length as u64 > sector.size() {
		log::warn!("Chunk at sector {} has an invalid length of {}", sector, length);
		return Ok(None);
	}
	let compression = match CompressionScheme::try_from(reader.read_value::<u8>()?) {
		Ok(compression) => compression,
		Err(err) => {
			log::warn!("Chunk at sector {} is unreadable: {}", sector, err);
			return Ok(None);
		}
	};
	let payload_length = (length - 1) as u64;
	let mut data = Vec::with_capacity(payload_length as usize);
	reader.by_ref().take(payload_length).read_to_end(&mut data)?;
	if (data.len() as u64) < payload_length {
		log::warn!("Chunk at sector {} is truncated ({} of {} bytes)", sector, data.len(), payload_length);
		return Ok(None);
	}
	Ok(Some(ChunkReader::new(compression, data)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::{
		Compression,
		write::{GzEncoder, ZlibEncoder},
	};
	use std::io::Write;

	fn frame(length: i32, version: u8, payload: &[u8]) -> Cursor<Vec<u8>> {
		let mut bytes = vec![0u8; 4096 * 2];
		bytes.extend_from_slice(&length.to_be_bytes());
		bytes.push(version);
		bytes.extend_from_slice(payload);
		bytes.resize(4096 * 3, 0);
		Cursor::new(bytes)
	}

	fn zlib(data: &[u8]) -> Vec<u8> {
		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(data).unwrap();
		encoder.finish().unwrap()
	}

	#[test]
	fn reads_both_schemes() {
		let data = b"the quick brown fox".repeat(20);
		let compressed = zlib(&data);
		let mut file = frame(compressed.len() as i32 + 1, 2, &compressed);
		let reader = read_frame(&mut file, RegionSector::new(2, 1)).unwrap().unwrap();
		assert_eq!(reader.compression(), CompressionScheme::ZLib);
		assert_eq!(reader.into_bytes().unwrap(), data);

		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(&data).unwrap();
		let compressed = encoder.finish().unwrap();
		let mut file = frame(compressed.len() as i32 + 1, 1, &compressed);
		let reader = read_frame(&mut file, RegionSector::new(2, 1)).unwrap().unwrap();
		assert_eq!(reader.compression(), CompressionScheme::GZip);
		assert_eq!(reader.into_bytes().unwrap(), data);
	}

	#[test]
	fn invalid_frames_are_missing() {
		let compressed = zlib(b"payload");
		let sector = RegionSector::new(2, 1);
		let length = compressed.len() as i32 + 1;
		assert!(read_frame(&mut frame(0, 2, &compressed), sector).unwrap().is_none());
		assert!(read_frame(&mut frame(-5, 2, &compressed), sector).unwrap().is_none());
		assert!(read_frame(&mut frame(4097, 2, &compressed), sector).unwrap().is_none());
		assert!(read_frame(&mut frame(length, 3, &compressed), sector).unwrap().is_none());
		assert!(read_frame(&mut frame(length, 0, &compressed), sector).unwrap().is_none());
		assert!(read_frame(&mut frame(length, 2, &compressed), sector).unwrap().is_some());
	}

	#[test]
	fn truncated_payload_is_missing() {
		let mut bytes = vec![0u8; 4096 * 2];
		bytes.extend_from_slice(&4096i32.to_be_bytes());
		bytes.push(2);
		bytes.extend_from_slice(&[0u8; 100]);
		let mut file = Cursor::new(bytes);
		assert!(read_frame(&mut file, RegionSector::new(2, 1)).unwrap().is_none());
	}
}
