//! The build entry point: prepare, compile, load, bind.

use std::path::{ Path, PathBuf };
use pipe_trait::Pipe ;
use thiserror::Error ;

use crate::binder::bind ;
use crate::config::BuildConfig ;
use crate::loader::{ LoadContext, LoadError };
use crate::process::{ ProcessRunner, SystemRunner, ToolchainFailure };
use crate::registry::Registry ;
use crate::source::prepare ;
use crate::toolchain::{ BuiltArtifact, ToolchainPipeline };
use crate::workspace::{ BuildId, Workspace };



/// Errors that can occur during a build.
///
/// Every variant is raised before anything is registered, so a failed build leaves the
/// registry exactly as it found it.
#[derive( Error, Debug )]
pub enum BuildError {
	/// The source could not be read or a workspace file could not be written.
	#[error( "IO Error at {path}: {source}" )]
	Io { path: PathBuf, #[source] source: std::io::Error },
	/// The workspace for a fresh build id already exists.
	#[error( "Workspace Collision: {0} already exists" )] WorkspaceCollision( PathBuf ),
	/// An external tool failed.
	#[error( "Toolchain Failure: {0}" )] Toolchain( #[from] ToolchainFailure ),
	/// The built artifact could not be loaded.
	#[error( "Load Error: {0}" )] Load( #[from] LoadError ),
}

/// What a successful build produced.
#[derive( Debug, Clone )]
pub struct BuildOutcome {
	workspace: Workspace,
	artifact: BuiltArtifact,
	bound: Vec<String>,
}

impl BuildOutcome {

	#[inline] pub fn build_id( &self ) -> &BuildId { self.workspace.id() }

	#[inline] pub fn workspace( &self ) -> &Workspace { &self.workspace }

	/// Absolute path of the loaded artifact.
	#[inline] pub fn artifact( &self ) -> &Path { self.artifact.path() }

	/// The artifact together with its compiled glue.
	#[inline] pub fn built( &self ) -> &BuiltArtifact { &self.artifact }

	/// Names registered by this build, in registration order.
	#[inline] pub fn bound( &self ) -> &[String] { &self.bound }

}

/// Builds the interface source at `source_path` and binds its functions into `registry`.
///
/// Runs the toolchain through [`SystemRunner`]. See [`build_with`].
///
/// # Errors
/// See [`build_with`].
pub fn build( source_path: impl AsRef<Path>, config: &BuildConfig, registry: &mut Registry ) -> Result<BuildOutcome, BuildError> {
	build_with( &SystemRunner, source_path, config, registry )
}

/// Builds the interface source at `source_path` with `runner` and binds its functions
/// into `registry`.
///
/// Each call draws a fresh build id, writes into its own workspace under the configured
/// root and loads into its own context, so repeated builds of the same file coexist.
/// Functions already bound under the same names are replaced.
///
/// # Errors
/// - [`BuildError::Io`] if the source cannot be read or the workspace cannot be written.
/// - [`BuildError::WorkspaceCollision`] if the fresh workspace already exists.
/// - [`BuildError::Toolchain`] if the generator or either compiler fails.
/// - [`BuildError::Load`] if the artifact cannot be loaded.
pub fn build_with<R: ProcessRunner + ?Sized>(
	runner: &R,
	source_path: impl AsRef<Path>,
	config: &BuildConfig,
	registry: &mut Registry,
) -> Result<BuildOutcome, BuildError> {

	let source_path = source_path.as_ref();
	let root = config.workspace_root()
		.pipe(| root | std::path::absolute( &root ).map_err(| source | BuildError::Io { path: root.clone(), source }))?;

	let prepared = prepare( source_path, BuildId::generate(), &root, config.glue_language() )?;
	let artifact = ToolchainPipeline::new( config, runner ).run( &prepared )?;

	let mut context = LoadContext::new( prepared.workspace().root() );
	let unit = context.load( prepared.workspace().id(), prepared.source().stem(), artifact.path() )?;

	let bound = bind( &unit, registry );
	log::info!( "bound {:?} from {}", bound, artifact.path().display() );

	Ok( BuildOutcome { workspace: prepared.workspace().clone(), artifact, bound })

}
