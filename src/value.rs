//! Host-side values and their raw form at the native boundary.
//!
//! Every bound entry takes a slice of [`Value`]s and returns one. Across the native
//! boundary each value travels as a [`RawValue`], a `#[repr(C)]` tag plus 64 payload
//! bits that mirrors `nl_value` in `include/native_link.h`.

use crate::entry::InvokeError ;



/// A dynamically typed value passed to or returned from a bound entry.
#[derive( Debug, Clone, Copy, PartialEq, Default )]
pub enum Value {
	/// No value. Returned by entries declared `void`.
	#[default] Unit,
	/// A boolean.
	Bool( bool ),
	/// A signed 64-bit integer. Narrower native integers widen into this.
	Int( i64 ),
	/// A 64-bit float. `float` widens into this.
	Float( f64 ),
}

impl Value {

	/// The integer payload, if this is an [`Int`]( Self::Int ).
	#[inline] pub fn as_int( &self ) -> Option<i64> { match self { Self::Int( value ) => Some( *value ), _ => None }}

	/// The float payload, if this is a [`Float`]( Self::Float ).
	#[inline] pub fn as_float( &self ) -> Option<f64> { match self { Self::Float( value ) => Some( *value ), _ => None }}

	/// The boolean payload, if this is a [`Bool`]( Self::Bool ).
	#[inline] pub fn as_bool( &self ) -> Option<bool> { match self { Self::Bool( value ) => Some( *value ), _ => None }}

}

impl From<()> for Value { fn from( _: () ) -> Self { Self::Unit }}
impl From<bool> for Value { fn from( value: bool ) -> Self { Self::Bool( value )}}
impl From<i32> for Value { fn from( value: i32 ) -> Self { Self::Int( i64::from( value ))}}
impl From<i64> for Value { fn from( value: i64 ) -> Self { Self::Int( value )}}
impl From<f64> for Value { fn from( value: f64 ) -> Self { Self::Float( value )}}

impl std::fmt::Display for Value {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match self {
			Self::Unit => write!( f, "()" ),
			Self::Bool( value ) => write!( f, "{}", value ),
			Self::Int( value ) => write!( f, "{}", value ),
			Self::Float( value ) => write!( f, "{}", value ),
		}
	}
}

/// The C layout of a [`Value`].
///
/// Layout must stay identical to `nl_value` in the bridge header: a `u32` tag followed
/// by a `u64` holding the payload bits.
#[repr( C )]
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct RawValue {
	pub tag: u32,
	pub bits: u64,
}

impl RawValue {

	pub const TAG_UNIT: u32 = 0 ;
	pub const TAG_BOOL: u32 = 1 ;
	pub const TAG_INT: u32 = 2 ;
	pub const TAG_FLOAT: u32 = 3 ;

	pub const UNIT: Self = Self { tag: Self::TAG_UNIT, bits: 0 };

}

impl From<Value> for RawValue {
	fn from( value: Value ) -> Self { match value {
		Value::Unit => Self::UNIT,
		Value::Bool( value ) => Self { tag: Self::TAG_BOOL, bits: u64::from( value )},
		#[allow( clippy::cast_sign_loss )]
		Value::Int( value ) => Self { tag: Self::TAG_INT, bits: value as u64 },
		Value::Float( value ) => Self { tag: Self::TAG_FLOAT, bits: value.to_bits() },
	}}
}

impl TryFrom<RawValue> for Value {
	type Error = InvokeError ;
	fn try_from( raw: RawValue ) -> Result<Self, Self::Error> { match raw.tag {
		RawValue::TAG_UNIT => Ok( Self::Unit ),
		RawValue::TAG_BOOL => Ok( Self::Bool( raw.bits != 0 )),
		#[allow( clippy::cast_possible_wrap )]
		RawValue::TAG_INT => Ok( Self::Int( raw.bits as i64 )),
		RawValue::TAG_FLOAT => Ok( Self::Float( f64::from_bits( raw.bits ))),
		tag => Err( InvokeError::InvalidReturn( tag )),
	}}
}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn negative_ints_survive_the_boundary() {
		let raw = RawValue::from( Value::Int( -42 ));
		assert_eq!( raw.tag, RawValue::TAG_INT );
		assert_eq!( Value::try_from( raw ).unwrap(), Value::Int( -42 ));
	}

	#[test]
	fn unknown_tag_is_an_invalid_return() {
		match Value::try_from( RawValue { tag: 99, bits: 0 }) {
			Err( InvokeError::InvalidReturn( 99 )) => {}
			value => panic!( "Expected InvalidReturn( 99 ), found: {:?}", value ),
		}
	}

}
