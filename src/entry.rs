//! Invocable entries.
//!
//! An [`Entry`] is anything that can be called with positional [`Value`]s. Native
//! entries forward to a function exported by a loaded artifact; tests and hosts may
//! also build entries from plain closures with [`from_fn`].

use std::sync::Arc ;
use thiserror::Error ;

use crate::loader::ArtifactHandle ;
use crate::value::{ RawValue, Value };



/// Signature every own entry of a built artifact exports.
///
/// `argv` points at `argc` values; the entry writes its result (or error detail) into
/// `ret` and returns one of the `STATUS_*` codes on [`NativeEntry`].
pub type EntryFn = unsafe extern "C" fn( argc: usize, argv: *const RawValue, ret: *mut RawValue ) -> i32 ;

/// A shared, invocable handle.
pub type Entry = Arc<dyn Invoke> ;

/// Errors raised while invoking an entry.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum InvokeError {
	/// The entry was called with the wrong number of arguments.
	#[error( "Argument Mismatch: expected {expected} argument(s), found {found}" )]
	ArgumentMismatch { expected: usize, found: usize },
	/// An argument did not have the type the entry expects.
	#[error( "Type Mismatch at argument {index}" )] TypeMismatch { index: usize },
	/// The entry reported a failure code of its own.
	#[error( "Native Failure: status {0}" )] NativeFailure( i32 ),
	/// The entry returned a value with an unknown tag.
	#[error( "Invalid Return: unknown value tag {0}" )] InvalidReturn( u32 ),
	/// No entry is registered under this name.
	#[error( "Unknown Entry: {0}" )] UnknownEntry( String ),
	/// The member exists but does not follow the entry calling convention.
	#[error( "Not Invocable: {0}" )] NotInvocable( String ),
}

/// Something that can be called with positional arguments.
pub trait Invoke: Send + Sync {

	/// Calls the entry, forwarding `args` unmodified.
	///
	/// # Errors
	/// Returns an error if the entry rejects its arguments or fails.
	fn invoke( &self, args: &[Value] ) -> Result<Value, InvokeError> ;

	/// The loaded artifact this entry keeps alive, if it forwards into one.
	fn origin( &self ) -> Option<&Arc<ArtifactHandle>> { None }

}

impl<F> Invoke for F
where
	F: Fn( &[Value] ) -> Result<Value, InvokeError> + Send + Sync,
{
	fn invoke( &self, args: &[Value] ) -> Result<Value, InvokeError> { self( args ) }
}

/// Wraps a closure into an [`Entry`].
pub fn from_fn<F>( function: F ) -> Entry
where
	F: Fn( &[Value] ) -> Result<Value, InvokeError> + Send + Sync + 'static,
{
	Arc::new( function )
}

/// An entry exported by a native artifact.
///
/// Holds a reference to the [`ArtifactHandle`] it came from, so the library stays
/// mapped for as long as the entry is reachable.
pub struct NativeEntry {
	symbol: String,
	function: EntryFn,
	artifact: Arc<ArtifactHandle>,
}

impl NativeEntry {

	pub const STATUS_OK: i32 = 0 ;
	pub const STATUS_ARITY: i32 = 1 ;
	pub const STATUS_TYPE: i32 = 2 ;

	pub(crate) fn new( symbol: String, function: EntryFn, artifact: Arc<ArtifactHandle> ) -> Self {
		Self { symbol, function, artifact }
	}

	/// The exported symbol this entry calls.
	#[inline] pub fn symbol( &self ) -> &str { &self.symbol }

	/// The artifact this entry keeps alive.
	#[inline] pub fn artifact( &self ) -> &Arc<ArtifactHandle> { &self.artifact }

}

impl Invoke for NativeEntry {
	fn invoke( &self, args: &[Value] ) -> Result<Value, InvokeError> {

		let argv = args.iter().copied().map( RawValue::from ).collect::<Vec<_>>();
		let mut ret = RawValue::UNIT ;

		// SAFETY: `function` was resolved from `artifact`, which this entry keeps loaded.
		// `argv` is valid for `argc` reads and `ret` for one write for the whole call.
		let status = unsafe { ( self.function )( argv.len(), argv.as_ptr(), &mut ret ) };

		match status {
			Self::STATUS_OK => Value::try_from( ret ),
			Self::STATUS_ARITY => Err( InvokeError::ArgumentMismatch {
				expected: usize::try_from( ret.bits ).unwrap_or( usize::MAX ),
				found: args.len(),
			}),
			Self::STATUS_TYPE => Err( InvokeError::TypeMismatch {
				index: usize::try_from( ret.bits ).unwrap_or( usize::MAX ),
			}),
			code => Err( InvokeError::NativeFailure( code )),
		}

	}

	fn origin( &self ) -> Option<&Arc<ArtifactHandle>> { Some( &self.artifact ) }

}

impl std::fmt::Debug for NativeEntry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "NativeEntry" )
			.field( "symbol", &self.symbol )
			.field( "artifact", &self.artifact.path() )
			.finish_non_exhaustive()
	}
}
