use std::io::{Read, Write};
use chrono::{DateTime, Utc, TimeZone};
use crate::{
	RegionResult,
	ioext::*,
};

/// A 32-bit Unix timestamp, in seconds.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct Timestamp(u32);

impl Timestamp {
	pub const fn new(seconds: u32) -> Self {
		Self(seconds)
	}

	pub const fn seconds(&self) -> u32 {
		self.0
	}

	pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
		Utc.timestamp_opt(self.0 as i64, 0).single()
	}

	/// Get a [Timestamp] for the current time (in Utc).
	pub fn utc_now() -> Timestamp {
		Timestamp::from(Utc::now())
	}
}

impl From<u32> for Timestamp {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

impl From<Timestamp> for u32 {
	fn from(value: Timestamp) -> Self {
		value.0
	}
}

impl Readable for Timestamp {
	fn read_from<R: Read>(reader: &mut R) -> RegionResult<Self> {
		Ok(Self(reader.read_value()?))
	}
}

impl Writable for Timestamp {
	fn write_to<W: Write>(&self, writer: &mut W) -> RegionResult<usize> {
		writer.write_value(self.0)
	}
}

impl From<DateTime<Utc>> for Timestamp {
	fn from(value: DateTime<Utc>) -> Self {
		Timestamp(value.timestamp() as u32)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.to_datetime() {
			Some(datetime) => write!(f, "{}", datetime),
			None => write!(f, "{}", self.0),
		}
	}
}
