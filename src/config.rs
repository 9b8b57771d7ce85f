//! Toolchain configuration for a build.

use std::path::{ Path, PathBuf };
use serde::Deserialize ;
use thiserror::Error ;



/// Directory holding `native_link.h`, the header generated glue compiles against.
pub const BRIDGE_INCLUDE_DIR: &str = concat!( env!( "CARGO_MANIFEST_DIR" ), "/include" );

/// Errors raised while loading a [`BuildConfig`] from disk.
#[derive( Error, Debug )]
pub enum ConfigError {
	#[error( "IO Error: {0}" )] Io( #[from] std::io::Error ),
	#[error( "TOML Parse Error: {0}" )] Toml( #[from] toml::de::Error ),
}

/// Which tools a build runs and how.
///
/// Every field has a default, so a config only needs to name what it changes. A build
/// only ever reads its config.
///
/// The defaults drive SWIG 4.2 or newer through its C module (`swig -c++ -c`). It writes
/// `<stem>_wrap.cxx`, which `g++` builds into the shared artifact, and the C header
/// `<stem>_wrap.h`, which is the host glue and is precompiled against the bridge header
/// into `<stem>_wrap.h.gch`. The C module takes no package option; targets that do, such
/// as SWIG's Java module, set [`BuildConfig::with_package_flag`].
///
/// ```
/// use native_link::BuildConfig ;
///
/// let config = BuildConfig::default()
/// 	.with_compiler( "clang++" )
/// 	.with_workspace_root( "/var/tmp/native-link" );
/// assert_eq!( config.generator_executable(), "swig" );
/// assert_eq!( config.compiler_executable(), "clang++" );
/// ```
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
#[serde( default, deny_unknown_fields )]
pub struct BuildConfig {
	/// Interface generator binary
	generator_executable: String,
	/// Native compiler binary
	compiler_executable: String,
	/// Arguments passed to the generator ahead of the package, glue mode and source
	generator_flags: Vec<String>,
	/// Generator option naming the package, followed by the build id; omitted when unset
	package_flag: Option<String>,
	/// Arguments passed to the native compiler ahead of the output and wrapper source
	compiler_flags: Vec<String>,
	/// Host glue mode; passed to the generator as `-<glue_language>`
	glue_language: String,
	/// Compiler for the generated host glue
	glue_compiler_executable: String,
	/// Arguments passed to the glue compiler ahead of the module define and glue sources
	glue_compiler_flags: Vec<String>,
	/// Extension of the generated host glue sources
	glue_extension: String,
	/// Extension the glue compiler gives each compiled glue source in place of its own
	glue_object_extension: String,
	/// Directory under which workspaces are created; the temp directory when unset
	workspace_root: Option<PathBuf>,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			generator_executable: "swig".to_string(),
			compiler_executable: "g++".to_string(),
			generator_flags: vec![ "-c++".to_string() ],
			package_flag: None,
			compiler_flags: default_compiler_flags(),
			glue_language: "c".to_string(),
			glue_compiler_executable: "g++".to_string(),
			glue_compiler_flags: vec![ "-x".to_string(), "c++-header".to_string(), format!( "-I{}", BRIDGE_INCLUDE_DIR ) ],
			glue_extension: "h".to_string(),
			glue_object_extension: "h.gch".to_string(),
			workspace_root: None,
		}
	}
}

#[cfg( target_os = "macos" )]
fn default_compiler_flags() -> Vec<String> {
	[ "-fPIC", "-dynamiclib", "-flat_namespace", "-undefined", "dynamic_lookup" ].into_iter()
		.map( String::from )
		.chain( std::iter::once( format!( "-I{}", BRIDGE_INCLUDE_DIR )))
		.collect()
}

#[cfg( not( target_os = "macos" ))]
fn default_compiler_flags() -> Vec<String> {
	[ "-fPIC", "-shared" ].into_iter()
		.map( String::from )
		.chain( std::iter::once( format!( "-I{}", BRIDGE_INCLUDE_DIR )))
		.collect()
}

impl BuildConfig {

	/// Parses a config from TOML. Missing keys keep their defaults.
	///
	/// # Errors
	/// Returns an error on malformed TOML or unknown keys.
	pub fn from_toml_str( text: &str ) -> Result<Self, ConfigError> {
		Ok( toml::from_str( text )? )
	}

	/// Reads and parses a TOML config file.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or parsed.
	pub fn load( path: impl AsRef<Path> ) -> Result<Self, ConfigError> {
		Self::from_toml_str( &std::fs::read_to_string( path )? )
	}

	pub fn with_generator( mut self, executable: impl Into<String> ) -> Self {
		self.generator_executable = executable.into();
		self
	}

	pub fn with_compiler( mut self, executable: impl Into<String> ) -> Self {
		self.compiler_executable = executable.into();
		self
	}

	/// Replaces the generator flags.
	pub fn with_generator_flags( mut self, flags: impl IntoIterator<Item = impl Into<String>> ) -> Self {
		self.generator_flags = flags.into_iter().map( Into::into ).collect();
		self
	}

	/// Passes `flag <build-id>` to the generator, e.g. `-package` for SWIG's Java module.
	pub fn with_package_flag( mut self, flag: impl Into<String> ) -> Self {
		self.package_flag = Some( flag.into() );
		self
	}

	/// Replaces the native compiler flags, including the bridge include path.
	pub fn with_compiler_flags( mut self, flags: impl IntoIterator<Item = impl Into<String>> ) -> Self {
		self.compiler_flags = flags.into_iter().map( Into::into ).collect();
		self
	}

	pub fn with_glue_language( mut self, language: impl Into<String> ) -> Self {
		self.glue_language = language.into();
		self
	}

	pub fn with_glue_compiler( mut self, executable: impl Into<String> ) -> Self {
		self.glue_compiler_executable = executable.into();
		self
	}

	/// Replaces the glue compiler flags.
	pub fn with_glue_compiler_flags( mut self, flags: impl IntoIterator<Item = impl Into<String>> ) -> Self {
		self.glue_compiler_flags = flags.into_iter().map( Into::into ).collect();
		self
	}

	pub fn with_glue_extension( mut self, extension: impl Into<String> ) -> Self {
		self.glue_extension = extension.into();
		self
	}

	/// Sets the extension of compiled glue, e.g. `o` for glue compiled with `-c`.
	pub fn with_glue_object_extension( mut self, extension: impl Into<String> ) -> Self {
		self.glue_object_extension = extension.into();
		self
	}

	/// Creates workspaces under `root` instead of the temp directory.
	pub fn with_workspace_root( mut self, root: impl Into<PathBuf> ) -> Self {
		self.workspace_root = Some( root.into() );
		self
	}

	#[inline] pub fn generator_executable( &self ) -> &str { &self.generator_executable }
	#[inline] pub fn compiler_executable( &self ) -> &str { &self.compiler_executable }
	#[inline] pub fn generator_flags( &self ) -> &[String] { &self.generator_flags }
	#[inline] pub fn package_flag( &self ) -> Option<&str> { self.package_flag.as_deref() }
	#[inline] pub fn compiler_flags( &self ) -> &[String] { &self.compiler_flags }
	#[inline] pub fn glue_language( &self ) -> &str { &self.glue_language }
	#[inline] pub fn glue_compiler_executable( &self ) -> &str { &self.glue_compiler_executable }
	#[inline] pub fn glue_compiler_flags( &self ) -> &[String] { &self.glue_compiler_flags }
	#[inline] pub fn glue_extension( &self ) -> &str { &self.glue_extension }
	#[inline] pub fn glue_object_extension( &self ) -> &str { &self.glue_object_extension }

	/// Directory workspaces are created under.
	pub fn workspace_root( &self ) -> PathBuf {
		self.workspace_root.clone().unwrap_or_else( std::env::temp_dir )
	}

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn partial_toml_keeps_defaults() {
		let config = BuildConfig::from_toml_str( r#"
			compiler_executable = "clang++"
			generator_flags = [ "-c++", "-Wall" ]
		"# ).unwrap();
		assert_eq!( config.compiler_executable(), "clang++" );
		assert_eq!( config.generator_flags(), [ "-c++", "-Wall" ]);
		assert_eq!( config.generator_executable(), "swig" );
		assert_eq!( config.compiler_flags(), BuildConfig::default().compiler_flags() );
	}

	#[test]
	fn unknown_keys_are_rejected() {
		match BuildConfig::from_toml_str( "linker = \"ld\"" ) {
			Err( ConfigError::Toml( _ )) => {}
			value => panic!( "Expected a TOML error, found: {:?}", value ),
		}
	}

	#[test]
	fn default_compiler_flags_build_a_shared_artifact_against_the_bridge_header() {
		let config = BuildConfig::default();
		assert!( config.compiler_flags().iter().any(| flag | flag == "-fPIC" ));
		assert!( config.compiler_flags().iter().any(| flag | flag.starts_with( "-I" ) && flag.ends_with( "include" )));
	}

	#[test]
	fn defaults_follow_the_c_module_outputs() {
		let config = BuildConfig::default();
		assert_eq!( config.generator_flags(), [ "-c++" ]);
		assert_eq!( config.glue_language(), "c" );
		assert_eq!( config.package_flag(), None );
		assert_eq!( config.glue_extension(), "h" );
		assert_eq!( config.glue_object_extension(), "h.gch" );
		assert_eq!( &config.glue_compiler_flags()[..2], [ "-x", "c++-header" ]);
	}

	#[test]
	fn package_flag_is_opt_in() {
		let config = BuildConfig::from_toml_str( r#"
			glue_language = "java"
			package_flag = "-package"
		"# ).unwrap();
		assert_eq!( config.package_flag(), Some( "-package" ));
		assert_eq!( BuildConfig::default().with_package_flag( "-package" ), config.with_glue_language( "c" ));
	}

}
