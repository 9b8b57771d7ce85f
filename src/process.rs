//! Running the external toolchain.

use std::path::Path ;
use std::process::Command ;
use thiserror::Error ;



/// Exit status and captured output of a finished process.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ProcessOutput {
	/// `None` when the process was terminated by a signal.
	pub exit_code: Option<i32>,
	/// Standard output followed by standard error.
	pub output: String,
}

impl ProcessOutput {
	#[inline] pub fn success( &self ) -> bool { self.exit_code == Some( 0 ) }
}

/// An external command that could not be run or exited unsuccessfully.
///
/// Carries the full invocation and everything the command printed.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
#[error( "`{command}` failed ({}):\n{output}", exit_description( .exit_code ))]
pub struct ToolchainFailure {
	pub command: String,
	pub args: Vec<String>,
	pub exit_code: Option<i32>,
	pub output: String,
}

#[allow( clippy::ref_option )]
fn exit_description( exit_code: &Option<i32> ) -> String {
	match exit_code {
		Some( code ) => format!( "exit code {}", code ),
		None => "no exit code".to_string(),
	}
}

/// Runs external commands synchronously.
///
/// There is no timeout: a command that never exits blocks the caller forever.
pub trait ProcessRunner {

	/// Runs `executable` with `args` in `working_directory` and waits for it to finish.
	///
	/// # Errors
	/// Returns an error if the process could not be spawned.
	fn run( &self, executable: &str, args: &[String], working_directory: &Path ) -> std::io::Result<ProcessOutput> ;

	/// Like [`run`]( Self::run ), but any outcome other than exit code 0 is a failure.
	///
	/// # Errors
	/// Returns a [`ToolchainFailure`] if the process could not be spawned or exited
	/// unsuccessfully.
	fn run_or_fail( &self, executable: &str, args: &[String], working_directory: &Path ) -> Result<ProcessOutput, ToolchainFailure> {
		let failure = | exit_code, output | ToolchainFailure {
			command: executable.to_string(),
			args: args.to_vec(),
			exit_code,
			output,
		};
		match self.run( executable, args, working_directory ) {
			Ok( output ) if output.success() => Ok( output ),
			Ok( ProcessOutput { exit_code, output }) => Err( failure( exit_code, output )),
			Err( err ) => Err( failure( None, err.to_string() )),
		}
	}

}

/// Runs commands with [`std::process::Command`].
#[derive( Debug, Clone, Copy, Default )]
pub struct SystemRunner ;

impl ProcessRunner for SystemRunner {
	fn run( &self, executable: &str, args: &[String], working_directory: &Path ) -> std::io::Result<ProcessOutput> {

		log::debug!( "running `{} {}` in {}", executable, args.join( " " ), working_directory.display() );

		let output = Command::new( executable )
			.args( args )
			.current_dir( working_directory )
			.output()?;

		let mut captured = String::from_utf8_lossy( &output.stdout ).into_owned();
		captured.push_str( &String::from_utf8_lossy( &output.stderr ));

		Ok( ProcessOutput { exit_code: output.status.code(), output: captured })

	}
}
