//! The host's callable namespace.

use std::collections::HashMap ;
use std::sync::Arc ;

use crate::entry::{ Entry, InvokeError };
use crate::loader::ArtifactHandle ;
use crate::value::Value ;



/// A callable registered in a [`Registry`].
///
/// Cloning is cheap and a clone stays callable after the name is rebound: it keeps the
/// artifact it forwards to loaded.
#[derive( Clone )]
pub struct BoundEntry {
	name: String,
	unit: String,
	entry: Entry,
}

impl BoundEntry {

	/// Name the entry is registered under.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Name of the unit that declared the entry.
	#[inline] pub fn unit( &self ) -> &str { &self.unit }

	/// The artifact the entry forwards into; `None` for host-provided entries.
	pub fn artifact( &self ) -> Option<&Arc<ArtifactHandle>> { self.entry.origin() }

	/// Forwards `args` to the underlying entry and returns its result unchanged.
	///
	/// # Errors
	/// Whatever the underlying entry reports.
	pub fn call( &self, args: &[Value] ) -> Result<Value, InvokeError> {
		self.entry.invoke( args )
	}

}

impl std::fmt::Debug for BoundEntry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "BoundEntry" )
			.field( "name", &self.name )
			.field( "unit", &self.unit )
			.finish_non_exhaustive()
	}
}

/// Named entries callable by the host.
///
/// Registering a name that is already bound replaces the old entry; the last writer
/// wins. Concurrent builds must share a registry behind a lock of the caller's choice.
///
/// ```
/// use native_link::{ Registry, Value, from_fn };
///
/// let mut registry = Registry::new();
/// registry.register( "twice", "host", from_fn(| args | Ok( Value::Int( 2 * args[0].as_int().unwrap_or( 0 )))));
/// assert_eq!( registry.call( "twice", &[ Value::Int( 21 )]), Ok( Value::Int( 42 )));
/// ```
#[derive( Default )]
pub struct Registry {
	entries: HashMap<String, BoundEntry>,
}

impl Registry {

	pub fn new() -> Self { Self::default() }

	/// Binds `entry` under `name`, returning the entry it replaced.
	pub fn register( &mut self, name: impl Into<String>, unit: impl Into<String>, entry: Entry ) -> Option<BoundEntry> {
		let name = name.into();
		self.entries.insert( name.clone(), BoundEntry { name, unit: unit.into(), entry })
	}

	/// Removes the entry bound under `name`.
	pub fn unregister( &mut self, name: &str ) -> Option<BoundEntry> { self.entries.remove( name ) }

	#[inline] pub fn get( &self, name: &str ) -> Option<&BoundEntry> { self.entries.get( name ) }

	#[inline] pub fn contains( &self, name: &str ) -> bool { self.entries.contains_key( name ) }

	/// Calls the entry bound under `name`.
	///
	/// # Errors
	/// [`InvokeError::UnknownEntry`] if nothing is bound under `name`, otherwise whatever
	/// the entry reports.
	pub fn call( &self, name: &str, args: &[Value] ) -> Result<Value, InvokeError> {
		self.entries.get( name )
			.ok_or_else(|| InvokeError::UnknownEntry( name.to_string() ))?
			.call( args )
	}

	/// Bound names in sorted order.
	pub fn names( &self ) -> Vec<&str> {
		let mut names = self.entries.keys().map( String::as_str ).collect::<Vec<_>>();
		names.sort_unstable();
		names
	}

	#[inline] pub fn len( &self ) -> usize { self.entries.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

}

impl std::fmt::Debug for Registry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_map()
			.entries( self.entries.iter().map(|( name, entry )| ( name, entry.unit() )))
			.finish()
	}
}
