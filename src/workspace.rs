//! Build identifiers and the per-build workspace directory.

use std::path::{ Path, PathBuf };
use rand::Rng ;

use crate::BuildError ;



/// A unique identifier for one build.
///
/// Formatted as [`BuildId::PREFIX`] followed by 128 random bits in lowercase hex, which
/// keeps it usable as a directory name, a generator module name and a C identifier
/// prefix at the same time.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct BuildId( String );

impl BuildId {

	pub const PREFIX: &'static str = "nl_" ;

	/// Leads every entry symbol, ahead of the build id. Generator wrappers are named after
	/// the module, so they start with [`BuildId::PREFIX`] and never with this.
	pub const ENTRY_PREFIX: &'static str = "entry_" ;

	/// Draws a fresh identifier from the thread-local CSPRNG.
	pub fn generate() -> Self {
		let bits: u128 = rand::rng().random();
		Self( format!( "{}{:032x}", Self::PREFIX, bits ))
	}

	#[inline] pub fn as_str( &self ) -> &str { &self.0 }

	/// Prefix `NL_ENTRY` puts in front of every entry this build declares.
	#[inline] pub fn symbol_prefix( &self ) -> String { format!( "{}{}_", Self::ENTRY_PREFIX, self.0 ) }

}

impl std::fmt::Display for BuildId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { f.write_str( &self.0 )}
}

/// A build-scoped directory, `<root>/<build-id>`.
///
/// Created exactly once and never removed.
#[derive( Debug, Clone )]
pub struct Workspace {
	id: BuildId,
	path: PathBuf,
}

impl Workspace {

	/// Where the workspace for `id` lives under `root`.
	pub fn path_for( root: &Path, id: &BuildId ) -> PathBuf { root.join( id.as_str() ) }

	/// Creates the workspace directory.
	///
	/// # Errors
	/// [`BuildError::WorkspaceCollision`] if the directory already exists, which means the
	/// identifier was not unique. Any other failure is [`BuildError::Io`].
	pub fn create( root: &Path, id: BuildId ) -> Result<Self, BuildError> {
		let path = Self::path_for( root, &id );
		match std::fs::create_dir( &path ) {
			Ok(()) => Ok( Self { id, path }),
			Err( err ) if err.kind() == std::io::ErrorKind::AlreadyExists => Err( BuildError::WorkspaceCollision( path )),
			Err( source ) => Err( BuildError::Io { path, source }),
		}
	}

	#[inline] pub fn id( &self ) -> &BuildId { &self.id }

	#[inline] pub fn path( &self ) -> &Path { &self.path }

	/// The directory holding this workspace, which is also the load context root.
	pub fn root( &self ) -> &Path { self.path.parent().unwrap_or( &self.path ) }

	/// Absolute path of a file inside the workspace.
	pub fn file( &self, name: impl AsRef<Path> ) -> PathBuf { self.path.join( name ) }

	/// Where the native artifact for module `stem` is built, using the platform's
	/// shared library naming.
	pub fn artifact_path( &self, stem: &str ) -> PathBuf {
		Self::artifact_path_in( &self.path, stem )
	}

	pub(crate) fn artifact_path_in( directory: &Path, stem: &str ) -> PathBuf {
		directory.join( format!( "{}{}{}", std::env::consts::DLL_PREFIX, stem, std::env::consts::DLL_SUFFIX ))
	}

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn build_id_is_a_c_identifier() {
		let id = BuildId::generate();
		assert!( id.as_str().starts_with( BuildId::PREFIX ));
		assert_eq!( id.as_str().len(), BuildId::PREFIX.len() + 32 );
		assert!( id.as_str().chars().all(| c | c == '_' || c.is_ascii_alphanumeric() ));
	}

	#[test]
	fn entry_symbols_never_start_like_module_wrappers() {
		let id = BuildId::generate();
		let prefix = id.symbol_prefix();
		assert_eq!( prefix, format!( "entry_{}_", id ));
		assert!( !prefix.starts_with( BuildId::PREFIX ));
	}

	#[test]
	fn artifact_uses_platform_naming() {
		let path = Workspace::artifact_path_in( Path::new( "/tmp/ws" ), "math" );
		let name = path.file_name().unwrap().to_string_lossy().into_owned();
		assert!( name.contains( "math" ));
		assert!( name.ends_with( std::env::consts::DLL_SUFFIX ));
	}

}
