//! Loading built artifacts into isolated contexts.
//!
//! Each build gets its own [`LoadContext`]. The artifact is opened with local symbol
//! scope, so two builds of the same module live side by side: they are distinct files
//! and their symbols never satisfy each other's lookups. The exported symbol table is
//! read from the file itself to decide which members the build declares.
//!
//! A build's own members are its entries. The plain function behind an entry is the
//! same member, so it is folded into the entry rather than listed again; everything
//! else the artifact exports belongs to the glue runtime.

use std::collections::{ HashMap, HashSet };
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use itertools::Itertools ;
use object::{ Object, ObjectSymbol, SymbolKind };
use thiserror::Error ;

use crate::entry::{ from_fn, EntryFn, InvokeError, NativeEntry };
use crate::unit::{ LoadedUnit, Member, GLUE_RUNTIME };
use crate::workspace::BuildId ;



/// Errors that can occur while loading an artifact.
#[derive( Error, Debug )]
pub enum LoadError {
	/// The artifact does not exist.
	#[error( "Missing Artifact: {0}" )] Missing( PathBuf ),
	/// The artifact exists but could not be read.
	#[error( "IO Error reading {path}: {source}" )]
	Io { path: PathBuf, #[source] source: std::io::Error },
	/// The artifact is not an object file the host understands.
	#[error( "Introspection Error: {0}" )] Introspection( #[from] object::Error ),
	/// The platform loader rejected the artifact.
	#[error( "Library Error: {0}" )] Library( #[from] libloading::Error ),
	/// A symbol listed in the artifact could not be resolved.
	#[error( "Unresolved Symbol {symbol}: {source}" )]
	Symbol { symbol: String, #[source] source: libloading::Error },
	/// The artifact lies outside the directory this context is rooted at.
	#[error( "Artifact {artifact} is outside the load root {root}" )]
	OutsideRoot { artifact: PathBuf, root: PathBuf },
	/// A unit with this name is already loaded in this context.
	#[error( "Unit Already Loaded: {0}" )] AlreadyLoaded( String ),
}

/// A mapped native library.
///
/// Shared between the [`LoadContext`] that opened it and every [`NativeEntry`] resolved
/// from it. The library is closed when the last reference is dropped.
pub struct ArtifactHandle {
	unit_name: String,
	path: PathBuf,
	library: libloading::Library,
}

impl ArtifactHandle {

	#[inline] pub fn unit_name( &self ) -> &str { &self.unit_name }

	#[inline] pub fn path( &self ) -> &Path { &self.path }

	fn resolve( &self, symbol: &str ) -> Result<EntryFn, LoadError> {
		// SAFETY: own symbols are emitted by the bridge header's `NL_ENTRY`, which fixes
		// their signature to `EntryFn`.
		let function = unsafe { self.library.get::<EntryFn>( symbol.as_bytes() ) }
			.map_err(| source | LoadError::Symbol { symbol: symbol.to_string(), source })?;
		Ok( *function )
	}

}

impl Drop for ArtifactHandle {
	fn drop( &mut self ) {
		log::debug!( "closing {} ({})", self.unit_name, self.path.display() );
	}
}

impl std::fmt::Debug for ArtifactHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ArtifactHandle" )
			.field( "unit_name", &self.unit_name )
			.field( "path", &self.path )
			.finish_non_exhaustive()
	}
}

/// An isolated loading scope.
///
/// Only artifacts under `root` may be loaded, and each unit name at most once.
#[derive( Debug )]
pub struct LoadContext {
	root: PathBuf,
	units: HashMap<String, Arc<ArtifactHandle>>,
}

impl LoadContext {

	pub fn new( root: impl Into<PathBuf> ) -> Self {
		Self { root: root.into(), units: HashMap::new() }
	}

	#[inline] pub fn root( &self ) -> &Path { &self.root }

	/// A unit previously loaded into this context.
	pub fn unit( &self, name: &str ) -> Option<&Arc<ArtifactHandle>> { self.units.get( name ) }

	/// Loads the artifact for build `id` of module `stem` as unit `<id>.<stem>`.
	///
	/// # Errors
	/// Returns a [`LoadError`] if the artifact is outside the root, already loaded,
	/// missing, unreadable, not a recognised object file, or rejected by the platform
	/// loader.
	pub fn load( &mut self, id: &BuildId, stem: &str, artifact: &Path ) -> Result<NativeUnit, LoadError> {

		let name = format!( "{}.{}", id, stem );
		if !artifact.starts_with( &self.root ) {
			return Err( LoadError::OutsideRoot { artifact: artifact.to_path_buf(), root: self.root.clone() });
		}
		if self.units.contains_key( &name ) { return Err( LoadError::AlreadyLoaded( name )); }
		if !artifact.is_file() { return Err( LoadError::Missing( artifact.to_path_buf() )); }

		let bytes = std::fs::read( artifact )
			.map_err(| source | LoadError::Io { path: artifact.to_path_buf(), source })?;
		let symbols = exported_functions( &bytes )?;

		// SAFETY: the artifact was just built from the prepared source; its initialisers
		// are the generated glue's and the bridge header's.
		let library = unsafe { libloading::Library::new( artifact ) }?;
		let handle = Arc::new( ArtifactHandle { unit_name: name.clone(), path: artifact.to_path_buf(), library });

		let prefix = id.symbol_prefix();
		let own = symbols.iter()
			.filter_map(| symbol | symbol.strip_prefix( &prefix ))
			.map( str::to_string )
			.collect::<HashSet<_>>();

		let members = symbols.into_iter()
			.filter(| symbol | symbol.starts_with( &prefix ) || !own.contains( plain_name( symbol )))
			.map(| symbol | match symbol.strip_prefix( &prefix ).map( str::to_string ) {
				Some( member ) => handle.resolve( &symbol ).map(| function | Member::new(
					member,
					name.as_str(),
					Arc::new( NativeEntry::new( symbol, function, Arc::clone( &handle ))),
				)),
				None => Ok( inherited_member( symbol )),
			})
			.collect::<Result<Vec<_>, _>>()?;

		log::debug!( "loaded {} with {} member(s)", name, members.len() );
		self.units.insert( name.clone(), Arc::clone( &handle ));

		Ok( NativeUnit { name, artifact: handle, members })

	}

}

fn inherited_member( symbol: String ) -> Member {
	let qualified = format!( "{}::{}", GLUE_RUNTIME, symbol );
	Member::new( symbol, GLUE_RUNTIME, from_fn( move | _ | Err( InvokeError::NotInvocable( qualified.clone() ))))
}

/// The source-level name of an exported function: C names as they are, and the
/// unqualified name of an Itanium-mangled free function (`_Z3addii` is `add`).
fn plain_name( symbol: &str ) -> &str {
	let Some( mangled ) = symbol.strip_prefix( "_Z" ) else { return symbol };
	let digits = mangled.bytes().take_while( u8::is_ascii_digit ).count();
	mangled[..digits].parse::<usize>().ok()
		.and_then(| length | mangled.get( digits..digits + length ))
		.unwrap_or( symbol )
}

/// Names of the functions an object file exports, sorted and without duplicates.
///
/// Mach-O's leading underscore is stripped so names match what the platform loader
/// resolves.
fn exported_functions( bytes: &[u8] ) -> Result<Vec<String>, object::Error> {

	let file = object::File::parse( bytes )?;
	let strip_underscore = file.format() == object::BinaryFormat::MachO ;

	let mut names = file.dynamic_symbols()
		.chain( file.symbols() )
		.filter(| symbol | symbol.kind() == SymbolKind::Text && symbol.is_global() && symbol.is_definition() )
		.filter_map(| symbol | symbol.name().ok().map( str::to_string ))
		.collect::<Vec<_>>();

	if names.is_empty() {
		names = file.exports()?.into_iter()
			.map(| export | String::from_utf8_lossy( export.name() ).into_owned() )
			.collect();
	}

	Ok( names.into_iter()
		.map(| name | if strip_underscore { name.strip_prefix( '_' ).unwrap_or( &name ).to_string() } else { name })
		.filter(| name | !name.is_empty() )
		.sorted()
		.dedup()
		.collect())

}

/// A unit loaded from a native artifact.
#[derive( Debug )]
pub struct NativeUnit {
	name: String,
	artifact: Arc<ArtifactHandle>,
	members: Vec<Member>,
}

impl NativeUnit {
	#[inline] pub fn artifact( &self ) -> &Arc<ArtifactHandle> { &self.artifact }
}

impl LoadedUnit for NativeUnit {
	fn name( &self ) -> &str { &self.name }
	fn members( &self ) -> &[Member] { &self.members }
}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn artifacts_outside_the_root_are_rejected() {
		let root = tempfile::tempdir().unwrap();
		let elsewhere = tempfile::tempdir().unwrap();
		let mut context = LoadContext::new( root.path() );
		match context.load( &BuildId::generate(), "math", &elsewhere.path().join( "libmath.so" )) {
			Err( LoadError::OutsideRoot { .. }) => {}
			value => panic!( "Expected OutsideRoot, found: {:?}", value.map(| unit | unit.name().to_string() )),
		}
	}

	#[test]
	fn missing_artifacts_are_reported() {
		let root = tempfile::tempdir().unwrap();
		let mut context = LoadContext::new( root.path() );
		match context.load( &BuildId::generate(), "math", &root.path().join( "libmath.so" )) {
			Err( LoadError::Missing( path )) => assert_eq!( path, root.path().join( "libmath.so" )),
			value => panic!( "Expected Missing, found: {:?}", value.map(| unit | unit.name().to_string() )),
		}
	}

	#[test]
	fn garbage_is_not_introspectable() {
		match exported_functions( b"definitely not an object file" ) {
			Err( _ ) => {}
			Ok( names ) => panic!( "Expected an introspection error, found: {:?}", names ),
		}
	}

	#[test]
	fn mangled_names_are_reduced_to_the_function_name() {
		assert_eq!( plain_name( "add" ), "add" );
		assert_eq!( plain_name( "_Z3addii" ), "add" );
		assert_eq!( plain_name( "_Z10is_the_oneb" ), "is_the_one" );
		assert_eq!( plain_name( "_ZN6detail6hiddenEi" ), "_ZN6detail6hiddenEi" );
		assert_eq!( plain_name( "_Z99short" ), "_Z99short" );
	}

	#[test]
	fn inherited_members_refuse_invocation() {
		let member = inherited_member( "SWIG_init".to_string() );
		assert_eq!( member.declared_by(), GLUE_RUNTIME );
		match member.entry().invoke( &[] ) {
			Err( InvokeError::NotInvocable( name )) => assert!( name.ends_with( "SWIG_init" )),
			value => panic!( "Expected NotInvocable, found: {:?}", value ),
		}
	}

}
