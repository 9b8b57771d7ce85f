//! The introspection surface of a loaded unit.

use crate::entry::Entry ;



/// Name under which members contributed by the generated glue runtime are reported.
///
/// Every artifact built by the pipeline links this runtime, so its members are shared
/// by all units and are never considered the unit's own.
pub const GLUE_RUNTIME: &str = "<glue-runtime>" ;

/// A loaded unit whose function-like members can be enumerated.
pub trait LoadedUnit {
	/// Fully qualified unit name, `<build-id>.<module>`.
	fn name( &self ) -> &str ;
	/// Every function-like member, including those inherited from the glue runtime.
	fn members( &self ) -> &[Member] ;
}

/// A function-like member of a [`LoadedUnit`].
#[derive( Clone )]
pub struct Member {
	name: String,
	declared_by: String,
	entry: Entry,
}

impl Member {

	/// Creates a member declared by the unit named `declared_by`.
	pub fn new( name: impl Into<String>, declared_by: impl Into<String>, entry: Entry ) -> Self {
		Self { name: name.into(), declared_by: declared_by.into(), entry }
	}

	/// Member name as the host should see it.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Name of the unit that declares this member.
	#[inline] pub fn declared_by( &self ) -> &str { &self.declared_by }

	/// The invocable behind this member.
	#[inline] pub fn entry( &self ) -> &Entry { &self.entry }

}

impl std::fmt::Debug for Member {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Member" )
			.field( "name", &self.name )
			.field( "declared_by", &self.declared_by )
			.finish_non_exhaustive()
	}
}
