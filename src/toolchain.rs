//! Running the generator, the glue compiler and the native compiler over a prepared source.

use std::path::{ Path, PathBuf };
use itertools::Itertools ;
use nonempty_collections::NEVec ;

use crate::BuildError ;
use crate::config::BuildConfig ;
use crate::process::{ ProcessRunner, ToolchainFailure };
use crate::source::PreparedSource ;



/// Output reported for the glue compile step when the generator emitted no glue.
pub const NO_GLUE_SOURCES: &str = "no generated glue sources" ;

/// Preprocessor name the glue and native compiles define to the build id; `NL_ENTRY`
/// prefixes symbols with it.
pub const MODULE_DEFINE: &str = "NL_MODULE" ;

/// The compiled native artifact and the glue intermediates built alongside it.
#[derive( Debug, Clone )]
pub struct BuiltArtifact {
	path: PathBuf,
	glue: NEVec<PathBuf>,
}

impl BuiltArtifact {

	/// Absolute path of the shared library.
	#[inline] pub fn path( &self ) -> &Path { &self.path }

	/// Compiled glue intermediates, in the order their sources were compiled.
	#[inline] pub fn glue( &self ) -> &NEVec<PathBuf> { &self.glue }

}

/// Runs the three toolchain steps inside a workspace.
///
/// Every step runs with the workspace as its working directory and the first failure
/// stops the pipeline.
pub struct ToolchainPipeline<'a, R: ProcessRunner + ?Sized> {
	config: &'a BuildConfig,
	runner: &'a R,
}

impl<'a, R: ProcessRunner + ?Sized> ToolchainPipeline<'a, R> {

	pub fn new( config: &'a BuildConfig, runner: &'a R ) -> Self {
		Self { config, runner }
	}

	/// Generates, compiles the glue, then compiles the native artifact.
	///
	/// # Errors
	/// [`BuildError::Toolchain`] for the first step that fails, or [`BuildError::Io`] if the
	/// workspace cannot be listed.
	pub fn run( &self, prepared: &PreparedSource ) -> Result<BuiltArtifact, BuildError> {

		let result = self.generate( prepared )
			.and_then(|()| self.compile_glue( prepared ))
			.and_then(| glue | self.compile_native( prepared ).map(| path | BuiltArtifact { path, glue }));

		if let Err( BuildError::Toolchain( failure )) = &result {
			log::warn!( "toolchain step `{}` failed in {}", failure.command, prepared.workspace().path().display() );
		}
		result

	}

	fn generate( &self, prepared: &PreparedSource ) -> Result<(), BuildError> {
		let package = self.config.package_flag()
			.map(| flag | [ flag.to_string(), prepared.workspace().id().to_string() ]);
		let args = self.config.generator_flags().iter().cloned()
			.chain( package.into_iter().flatten() )
			.chain([
				format!( "-{}", self.config.glue_language() ),
				prepared.source().interface_file_name(),
			])
			.collect::<Vec<_>>();
		self.runner.run_or_fail( self.config.generator_executable(), &args, prepared.workspace().path() )?;
		log::debug!( "generated glue for {}", prepared.workspace().id() );
		Ok(())
	}

	fn compile_glue( &self, prepared: &PreparedSource ) -> Result<NEVec<PathBuf>, BuildError> {

		let workspace = prepared.workspace().path();
		let sources = glue_sources( workspace, self.config.glue_extension(), prepared.source_file() )?;

		let mut sources_iter = sources.iter();
		let Some( first ) = sources_iter.next() else {
			return Err( ToolchainFailure {
				command: self.config.glue_compiler_executable().to_string(),
				args: self.config.glue_compiler_flags().to_vec(),
				exit_code: None,
				output: NO_GLUE_SOURCES.to_string(),
			}.into());
		};

		let args = self.config.glue_compiler_flags().iter().cloned()
			.chain( std::iter::once( module_define( prepared )))
			.chain( sources.iter().cloned() )
			.collect::<Vec<_>>();
		self.runner.run_or_fail( self.config.glue_compiler_executable(), &args, workspace )?;

		let extension = self.config.glue_object_extension();
		let mut compiled = NEVec::new( object_file( workspace, first, extension ));
		sources_iter.for_each(| source | compiled.push( object_file( workspace, source, extension )));

		log::debug!( "compiled {} glue source(s) for {}", sources.len(), prepared.workspace().id() );
		Ok( compiled )

	}

	fn compile_native( &self, prepared: &PreparedSource ) -> Result<PathBuf, BuildError> {
		let artifact = prepared.artifact().to_path_buf();
		let args = self.config.compiler_flags().iter().cloned()
			.chain([
				module_define( prepared ),
				"-o".to_string(),
				artifact.display().to_string(),
				wrapper_file_name( prepared.source().stem() ),
			])
			.collect::<Vec<_>>();
		self.runner.run_or_fail( self.config.compiler_executable(), &args, prepared.workspace().path() )?;
		log::debug!( "built {}", artifact.display() );
		Ok( artifact )
	}

}

/// Name of the wrapper source the generator emits for module `stem`.
pub fn wrapper_file_name( stem: &str ) -> String { format!( "{}_wrap.cxx", stem ) }

fn module_define( prepared: &PreparedSource ) -> String {
	format!( "-D{}={}", MODULE_DEFINE, prepared.workspace().id() )
}

/// File names in `workspace` with extension `extension`, sorted, leaving out `interface`.
fn glue_sources( workspace: &Path, extension: &str, interface: &Path ) -> Result<Vec<String>, BuildError> {
	let io_error = | source | BuildError::Io { path: workspace.to_path_buf(), source };
	Ok( std::fs::read_dir( workspace ).map_err( io_error )?
		.map_ok(| entry | entry.path() )
		.filter_ok(| path | path != interface && path.is_file() && path.extension().is_some_and(| ext | ext == extension ))
		.map_ok(| path | path.file_name().map(| name | name.to_string_lossy().into_owned() ))
		.flatten_ok()
		.collect::<Result<Vec<_>, _>>().map_err( io_error )?
		.into_iter()
		.sorted()
		.collect())
}

fn object_file( workspace: &Path, source: &str, extension: &str ) -> PathBuf {
	workspace.join( source ).with_extension( extension )
}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn glue_sources_are_sorted_and_filtered_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		for name in [ "b_wrap.h", "a_wrap.h", "math_wrap.cxx", "math.i" ] {
			std::fs::write( dir.path().join( name ), "" ).unwrap();
		}
		std::fs::create_dir( dir.path().join( "nested.h" )).unwrap();
		assert_eq!( glue_sources( dir.path(), "h", &dir.path().join( "math.i" )).unwrap(), [ "a_wrap.h", "b_wrap.h" ]);
	}

	#[test]
	fn the_interface_is_never_glue() {
		let dir = tempfile::tempdir().unwrap();
		for name in [ "math.i", "runtime.i" ] {
			std::fs::write( dir.path().join( name ), "" ).unwrap();
		}
		assert_eq!( glue_sources( dir.path(), "i", &dir.path().join( "math.i" )).unwrap(), [ "runtime.i" ]);
	}

	#[test]
	fn object_file_replaces_the_extension() {
		assert_eq!( object_file( Path::new( "/ws" ), "math_wrap.h", "h.gch" ), PathBuf::from( "/ws/math_wrap.h.gch" ));
		assert_eq!( object_file( Path::new( "/ws" ), "math_glue.c", "o" ), PathBuf::from( "/ws/math_glue.o" ));
	}

}
