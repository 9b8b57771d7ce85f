#[allow( dead_code )]
mod scripted_runner {

	use std::path::{ Path, PathBuf };
	use std::sync::Mutex ;
	use native_link::{ BuildConfig, ProcessOutput, ProcessRunner };

	pub const GENERATOR: &str = "scripted-generator" ;
	pub const GLUE_COMPILER: &str = "scripted-glue-cc" ;
	pub const COMPILER: &str = "scripted-c++" ;

	/// Bytes the scripted compiler writes in place of a shared library.
	pub const FAKE_ARTIFACT: &[u8] = b"this is not a shared library" ;

	#[derive( Debug, Clone, PartialEq, Eq )]
	pub struct Invocation {
		pub executable: String,
		pub args: Vec<String>,
		pub working_directory: PathBuf,
	}

	/// Stands in for the toolchain, producing the files each tool would.
	///
	/// Unknown executables fail to spawn.
	#[derive( Debug )]
	pub struct ScriptedRunner {
		fail_on: Option<String>,
		glue_extension: Option<String>,
		invocations: Mutex<Vec<Invocation>>,
	}

	impl ScriptedRunner {

		pub fn new() -> Self {
			Self { fail_on: None, glue_extension: Some( "h".to_string() ), invocations: Mutex::new( Vec::new() ) }
		}

		/// `executable` exits with code 1 instead of producing output.
		pub fn failing_on( mut self, executable: &str ) -> Self {
			self.fail_on = Some( executable.to_string() );
			self
		}

		/// The generator emits a wrapper but no host glue.
		pub fn without_glue( mut self ) -> Self {
			self.glue_extension = None ;
			self
		}

		/// The generator emits its host glue as `<stem>_wrap.<extension>`.
		pub fn with_glue_extension( mut self, extension: &str ) -> Self {
			self.glue_extension = Some( extension.to_string() );
			self
		}

		pub fn invocations( &self ) -> Vec<Invocation> { self.invocations.lock().unwrap().clone() }

		pub fn executables( &self ) -> Vec<String> {
			self.invocations().into_iter().map(| invocation | invocation.executable ).collect()
		}

		fn generate( &self, args: &[String], working_directory: &Path ) -> std::io::Result<()> {
			let source = args.last().expect( "generator called without a source" );
			let stem = Path::new( source ).file_stem().unwrap().to_string_lossy().into_owned();
			let text = std::fs::read_to_string( working_directory.join( source ))?;
			std::fs::write( working_directory.join( format!( "{}_wrap.cxx", stem )), text )?;
			if let Some( extension ) = &self.glue_extension {
				std::fs::write( working_directory.join( format!( "{}_wrap.{}", stem, extension )), "/* glue */\n" )?;
			}
			Ok(())
		}

	}

	impl ProcessRunner for ScriptedRunner {
		fn run( &self, executable: &str, args: &[String], working_directory: &Path ) -> std::io::Result<ProcessOutput> {

			self.invocations.lock().unwrap().push( Invocation {
				executable: executable.to_string(),
				args: args.to_vec(),
				working_directory: working_directory.to_path_buf(),
			});

			if self.fail_on.as_deref() == Some( executable ) {
				return Ok( ProcessOutput { exit_code: Some( 1 ), output: format!( "{}: scripted failure\n", executable )});
			}

			match executable {
				GENERATOR => self.generate( args, working_directory )?,
				GLUE_COMPILER => for source in args.iter().filter(| arg | working_directory.join( arg ).is_file() ) {
					std::fs::write( working_directory.join( format!( "{}.gch", source )), "" )?;
				},
				COMPILER => {
					let output = args.iter().skip_while(| arg | *arg != "-o" ).nth( 1 ).expect( "compiler called without -o" );
					std::fs::write( output, FAKE_ARTIFACT )?;
				},
				_ => return Err( std::io::Error::new( std::io::ErrorKind::NotFound, format!( "{}: command not found", executable ))),
			}

			Ok( ProcessOutput { exit_code: Some( 0 ), output: String::new() })

		}
	}

	/// A config that drives the scripted tools and builds under `root`.
	pub fn config( root: &Path ) -> BuildConfig {
		BuildConfig::default()
			.with_generator( GENERATOR )
			.with_glue_compiler( GLUE_COMPILER )
			.with_compiler( COMPILER )
			.with_workspace_root( root )
	}

	pub fn write_source( directory: &Path, name: &str, text: &str ) -> PathBuf {
		let path = directory.join( name );
		std::fs::write( &path, text ).unwrap();
		path
	}

	/// Workspaces created under `root`, sorted.
	pub fn workspaces( root: &Path ) -> Vec<PathBuf> {
		let mut entries = std::fs::read_dir( root ).unwrap()
			.map(| entry | entry.unwrap().path() )
			.filter(| path | path.is_dir() )
			.collect::<Vec<_>>();
		entries.sort();
		entries
	}

	pub fn init_logger() {
		let _ = env_logger::builder().is_test( true ).try_init();
	}

}
