//! Binary read/write helpers for the big-endian values stored in region files.

use std::io::{
	self,
	Read, Write,
	Seek, SeekFrom,
};

use byteorder::{
	BigEndian,
	ReadBytesExt,
	WriteBytesExt,
};

use crate::RegionResult;

/// A value that can be read from a big-endian byte stream.
pub trait Readable: Sized {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self>;
}

/// A value that can be written to a big-endian byte stream.
/// Returns the number of bytes written.
pub trait Writable {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize>;
}

/// Anything that has a fixed location in a region file.
pub trait Seekable {
	/// A [SeekFrom] that points to this value.
	fn seeker(&self) -> SeekFrom;
}

macro_rules! __big_endian_impls {
	($type:ty, $read:ident, $write:ident) => {
		impl Readable for $type {
			fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
				Ok(reader.$read::<BigEndian>()?)
			}
		}

		impl Writable for $type {
			fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
				writer.$write::<BigEndian>(*self)?;
				Ok(std::mem::size_of::<$type>())
			}
		}
	};
}

__big_endian_impls!(u16, read_u16, write_u16);
__big_endian_impls!(i16, read_i16, write_i16);
__big_endian_impls!(u32, read_u32, write_u32);
__big_endian_impls!(i32, read_i32, write_i32);
__big_endian_impls!(u64, read_u64, write_u64);
__big_endian_impls!(i64, read_i64, write_i64);

impl Readable for u8 {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		Ok(reader.read_u8()?)
	}
}

impl Writable for u8 {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		writer.write_u8(*self)?;
		Ok(1)
	}
}

pub trait ReadExt: Read + Sized {
	fn read_value<T: Readable>(&mut self) -> RegionResult<T> {
		T::read_from(self)
	}
}

impl<R: Read> ReadExt for R {}

pub trait WriteExt: Write + Sized {
	fn write_value<T: Writable>(&mut self, value: T) -> RegionResult<usize> {
		value.write_to(self)
	}

	/// Writes zeroes to a writer.
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64> {
		const ZEROES: &'static [u8; 4096] = &[0u8; 4096];
		let mut remainder = count;
		while remainder >= ZEROES.len() as u64 {
			self.write_all(ZEROES)?;
			remainder -= ZEROES.len() as u64;
		}
		if remainder != 0 {
			self.write_all(&ZEROES[0..remainder as usize])?;
		}
		Ok(count)
	}
}

impl<W: Write> WriteExt for W {}

pub trait SeekExt: Seek {
	/// Gets a [SeekFrom] that will return to the current stream position.
	fn seek_return(&mut self) -> io::Result<SeekFrom> {
		Ok(SeekFrom::Start(self.stream_position()?))
	}

	/// Measures the stream by seeking to the end. The stream is left at the end.
	fn stream_end(&mut self) -> io::Result<u64> {
		self.seek(SeekFrom::End(0))
	}
}

impl<S: Seek> SeekExt for S {}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn values_are_big_endian() {
		let mut buffer = Cursor::new(Vec::new());
		buffer.write_value(0x0102_0304u32).unwrap();
		buffer.write_value(7u8).unwrap();
		assert_eq!(buffer.get_ref().as_slice(), &[1, 2, 3, 4, 7]);
		buffer.set_position(0);
		assert_eq!(buffer.read_value::<u32>().unwrap(), 0x0102_0304);
		assert_eq!(buffer.read_value::<u8>().unwrap(), 7);
	}

	#[test]
	fn negative_length_reads_as_negative() {
		let mut reader = Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFE]);
		assert_eq!(reader.read_value::<i32>().unwrap(), -2);
	}

	#[test]
	fn zeroes() {
		let mut buffer = Vec::new();
		assert_eq!(buffer.write_zeroes(4096 + 17).unwrap(), 4113);
		assert_eq!(buffer.len(), 4113);
		assert!(buffer.iter().all(|&b| b == 0));
	}

	#[test]
	fn seek_return_restores_position() {
		let mut cursor = Cursor::new(vec![0u8; 64]);
		cursor.seek(SeekFrom::Start(12)).unwrap();
		let ret = cursor.seek_return().unwrap();
		assert_eq!(cursor.stream_end().unwrap(), 64);
		cursor.seek(ret).unwrap();
		assert_eq!(cursor.stream_position().unwrap(), 12);
	}
}
