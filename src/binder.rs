//! Discovering a unit's own entries and registering them.

use crate::entry::Entry ;
use crate::registry::Registry ;
use crate::unit::LoadedUnit ;



/// A function a unit declares itself, ready to be registered.
#[derive( Clone )]
pub struct ExportedFunction {
	name: String,
	entry: Entry,
}

impl ExportedFunction {

	#[inline] pub fn name( &self ) -> &str { &self.name }

	#[inline] pub fn entry( &self ) -> &Entry { &self.entry }

}

impl std::fmt::Debug for ExportedFunction {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ExportedFunction" )
			.field( "name", &self.name )
			.finish_non_exhaustive()
	}
}

/// Members of `unit` that the unit declares directly.
///
/// Members inherited from the glue runtime, or from any other unit, are left out.
/// Order follows [`LoadedUnit::members`].
pub fn own_entries( unit: &( impl LoadedUnit + ?Sized )) -> Vec<ExportedFunction> {
	unit.members().iter()
		.filter(| member | member.declared_by() == unit.name() )
		.map(| member | ExportedFunction { name: member.name().to_string(), entry: member.entry().clone() })
		.collect()
}

/// Registers every own entry of `unit` under its name, replacing whatever was bound
/// there before.
///
/// The entries are all resolved before the first one is registered. Returns the names
/// bound, in registration order.
pub fn bind( unit: &( impl LoadedUnit + ?Sized ), registry: &mut Registry ) -> Vec<String> {
	own_entries( unit ).into_iter()
		.map(| ExportedFunction { name, entry } | {
			if let Some( previous ) = registry.register( name.clone(), unit.name(), entry ) {
				log::debug!( "`{}` from {} replaces the binding from {}", name, unit.name(), previous.unit() );
			}
			name
		})
		.collect()
}
