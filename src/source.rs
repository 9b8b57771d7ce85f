//! Reading and augmenting the interface source.
//!
//! The raw source declares functions only. Before the generator sees it, it is wrapped
//! with a module declaration naming the build, the bridge header include, an entry for
//! each plain function it declares and a directive telling the glue where the finished
//! artifact will live. The result is written into a fresh [`Workspace`] as `<stem>.i`.

use std::path::{ Path, PathBuf };
use itertools::Itertools ;

use crate::BuildError ;
use crate::signature::{ scan, Signature };
use crate::workspace::{ BuildId, Workspace };



/// Extension the augmented source is written with, whatever the original was called.
pub const INTERFACE_EXTENSION: &str = "i" ;

/// Block opening every augmented source, ahead of the original text.
pub const BRIDGE_INCLUDE: &str = "%{\n#include \"native_link.h\"\n%}\n" ;

/// Raw interface source as read from disk.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct SourceModule {
	path: PathBuf,
	file_name: String,
	stem: String,
	text: String,
}

impl SourceModule {

	/// Reads a source file.
	///
	/// # Errors
	/// [`BuildError::Io`] if the file cannot be read or has no usable file name.
	pub fn read( path: &Path ) -> Result<Self, BuildError> {

		let io_error = | source | BuildError::Io { path: path.to_path_buf(), source };

		let file_name = path.file_name()
			.and_then(| name | name.to_str() )
			.ok_or_else(|| io_error( std::io::Error::new( std::io::ErrorKind::InvalidInput, "source path has no UTF-8 file name" )))?
			.to_string();
		let stem = path.file_stem()
			.and_then(| stem | stem.to_str() )
			.filter(| stem | !stem.is_empty() )
			.ok_or_else(|| io_error( std::io::Error::new( std::io::ErrorKind::InvalidInput, "source path has no file stem" )))?
			.to_string();
		let text = std::fs::read_to_string( path ).map_err( io_error )?;

		Ok( Self { path: path.to_path_buf(), file_name, stem, text })

	}

	/// Builds a module from text already in memory.
	pub fn from_text( path: impl Into<PathBuf>, text: impl Into<String> ) -> Self {
		let path = path.into();
		let file_name = path.file_name().map( | name | name.to_string_lossy().into_owned() ).unwrap_or_default();
		let stem = path.file_stem().map( | stem | stem.to_string_lossy().into_owned() ).unwrap_or_default();
		Self { path, file_name, stem, text: text.into() }
	}

	#[inline] pub fn path( &self ) -> &Path { &self.path }

	/// File name, e.g. `math.i`.
	#[inline] pub fn file_name( &self ) -> &str { &self.file_name }

	/// Module name derived from the file name, e.g. `math`.
	#[inline] pub fn stem( &self ) -> &str { &self.stem }

	#[inline] pub fn text( &self ) -> &str { &self.text }

	/// Name of the augmented file in the workspace, e.g. `math.i`.
	pub fn interface_file_name( &self ) -> String { format!( "{}.{}", self.stem, INTERFACE_EXTENSION ) }

	/// Plain functions the source declares, each of which gets a generated entry.
	pub fn signatures( &self ) -> Vec<Signature> { scan( &self.text ) }

	/// Produces the document handed to the generator.
	///
	/// The module declaration and the bridge include come first and the original text
	/// follows unchanged. Generated entries, if any, come next in a block of their own,
	/// and the load directive closes the file.
	pub fn augment( &self, id: &BuildId, artifact: &Path, glue_language: &str ) -> String {
		let mut document = format!( "%module {}\n{}", id, BRIDGE_INCLUDE );
		document.push_str( &self.text );
		if !self.text.ends_with( '\n' ) { document.push( '\n' ); }
		let signatures = self.signatures();
		if !signatures.is_empty() {
			document.push_str( &format!( "%{{\n{}%}}\n", signatures.iter().map( Signature::entry ).join( "" )));
		}
		document.push_str( &format!(
			"%pragma({}) loadlibrary=\"{}\"\n",
			glue_language,
			artifact.display().to_string().replace( '\\', "\\\\" ).replace( '"', "\\\"" ),
		));
		document
	}

}

/// A source that has been augmented and written into its workspace.
#[derive( Debug, Clone )]
pub struct PreparedSource {
	source: SourceModule,
	workspace: Workspace,
	source_file: PathBuf,
	artifact: PathBuf,
}

impl PreparedSource {

	#[inline] pub fn source( &self ) -> &SourceModule { &self.source }

	#[inline] pub fn workspace( &self ) -> &Workspace { &self.workspace }

	/// The augmented file inside the workspace, `<stem>.i`.
	#[inline] pub fn source_file( &self ) -> &Path { &self.source_file }

	/// Absolute path the native artifact will be built at.
	#[inline] pub fn artifact( &self ) -> &Path { &self.artifact }

}

/// Reads `source_path`, creates the workspace for `id` under `root` and writes the
/// augmented source into it.
///
/// `root` should be absolute; the artifact path baked into the load directive is
/// derived from it.
///
/// # Errors
/// - [`BuildError::Io`] if the source cannot be read or the augmented file cannot be written.
///   An unreadable source creates no workspace.
/// - [`BuildError::WorkspaceCollision`] if the workspace already exists.
pub fn prepare(
	source_path: &Path,
	id: BuildId,
	root: &Path,
	glue_language: &str,
) -> Result<PreparedSource, BuildError> {

	let source = SourceModule::read( source_path )?;
	let workspace = Workspace::create( root, id )?;
	let artifact = workspace.artifact_path( source.stem() );

	let document = source.augment( workspace.id(), &artifact, glue_language );
	let source_file = workspace.file( source.interface_file_name() );
	std::fs::write( &source_file, document ).map_err(| source | BuildError::Io { path: source_file.clone(), source })?;

	log::debug!( "prepared {} in {} as {}", source.file_name(), workspace.path().display(), source.interface_file_name() );

	Ok( PreparedSource { source, workspace, source_file, artifact })

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn augment_wraps_the_original_text() {

		let source = SourceModule::from_text( "math.i", "%{\nint twice( int x ) { return 2 * x; }\n%}" );
		let id = BuildId::generate();
		let document = source.augment( &id, Path::new( "/tmp/ws/libmath.so" ), "c" );

		assert!( document.starts_with( &format!( "%module {}\n{}", id, BRIDGE_INCLUDE )));
		assert!( document.contains( source.text() ));
		assert!( document.contains( "NL_ENTRY( twice ) {" ));
		assert_eq!( document.lines().last(), Some( "%pragma(c) loadlibrary=\"/tmp/ws/libmath.so\"" ));

	}

	#[test]
	fn handwritten_sources_get_no_entry_block() {
		let source = SourceModule::from_text( "math.i", "%{\nNL_ENTRY( noop ) { return nl_return_unit( ret ); }\n%}\n" );
		let document = source.augment( &BuildId::generate(), Path::new( "/tmp/ws/libmath.so" ), "c" );
		assert_eq!( document.matches( "%{" ).count(), 2 );
		assert!( source.signatures().is_empty() );
	}

	#[test]
	fn augmented_file_is_an_interface_whatever_the_source_was_called() {
		let root = tempfile::tempdir().unwrap();
		let source = root.path().join( "math.c" );
		std::fs::write( &source, "%{\nint twice( int x ) { return 2 * x; }\n%}\n" ).unwrap();

		let prepared = prepare( &source, BuildId::generate(), root.path(), "c" ).unwrap();
		assert_eq!( prepared.source_file(), prepared.workspace().file( "math.i" ));
		assert!( prepared.source_file().is_file() );
		assert!( !prepared.workspace().file( "math.c" ).exists() );
	}

}
