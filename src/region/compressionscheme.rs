use std::io::{Read, Write};
use crate::{
	RegionResult, RegionError,
	ioext::*,
};

/// Compression scheme stored in the version byte of a chunk frame.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionScheme {
	/// GZip compression is used. Only ever read, for older files.
	GZip = 1,
	/// ZLib compression is used. All chunks are written this way.
	ZLib = 2,
}

impl CompressionScheme {
	pub const fn id(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for CompressionScheme {
	type Error = RegionError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::GZip),
			2 => Ok(Self::ZLib),
			unexpected => Err(RegionError::InvalidCompressionScheme(unexpected)),
		}
	}
}

impl Writable for CompressionScheme {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		writer.write_value(self.id())
	}
}

impl Readable for CompressionScheme {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		Self::try_from(reader.read_value::<u8>()?)
	}
}
