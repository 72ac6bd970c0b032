use thiserror::Error;

/// The master error type.
#[derive(Debug, Error)]
pub enum RegionError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Invalid Compression value: {0}")]
	InvalidCompressionScheme(u8),
	#[error("Out of range error.")]
	OutOfRange,
	#[error("Attempted to write chunk data that takes up {sectors} 4KiB blocks (the limit is 255).")]
	ChunkTooLarge { sectors: u32 },
	#[error("Failed to allocate RegionSector.")]
	RegionAllocationFailure,
	#[error("Region file has been closed.")]
	Closed,
}

impl RegionError {
	pub fn range_check<T, R>(value: T, range: R) -> Result<(),RegionError>
	where
	T: PartialOrd + Sized,
	R: std::ops::RangeBounds<T> {
		if range.contains(&value) {
			Ok(())
		} else {
			Err(RegionError::OutOfRange)
		}
	}
}

pub type RegionResult<T> = Result<T,RegionError>;
