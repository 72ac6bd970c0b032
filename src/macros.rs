/// The purpose of this macro is to be able to generate code for each
/// primitive integer type (this means no f32 or f64).
/// You invoke the macro with the path to another macro that you would
/// like to invoke for each type.
/// Optionally you can restrict generation to either unsigned or signed
/// by typing `;unsigned` or `;signed` after the provided macro argument.
#[macro_export]
macro_rules! for_each_int_type {
	($macro:path) => {
		$crate::for_each_int_type!($macro;unsigned);
		$crate::for_each_int_type!($macro;signed);
	};
	($macro:path;unsigned) => {
		$macro!{usize}
		$macro!{u64}
		$macro!{u32}
		$macro!{u16}
		$macro!{u8}
	};
	($macro:path;signed) => {
		$macro!{isize}
		$macro!{i64}
		$macro!{i32}
		$macro!{i16}
		$macro!{i8}
	}
}

/// Return from a function if a condition is met.
/// ```rs
/// fn first_free(bits: &[bool]) -> Option<usize> {
/// 	for (index, free) in bits.iter().enumerate() {
/// 		return_if!(*free => Some(index));
/// 	}
/// 	None
/// }
/// ```
#[macro_export]
macro_rules! return_if {
	($condition:expr $(=> $result:expr)?) => {
		if $condition {
			return $($result)?;
		}
	};
}
