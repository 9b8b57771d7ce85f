//! Compile interface-annotated native source at runtime and call it from the running host.
//!
//! A build takes a small interface source file, runs it through an interface generator
//! and a C++ compiler, loads the resulting shared library into a context of its own and
//! registers every function the source declares under its original name. Rebuilding the
//! same file rebinds those names to the new code without restarting the process.
//!
//! # Pipeline
//!
//! - **Prepare**: the source is read, wrapped with a module declaration naming a fresh
//! 	[`BuildId`], the bridge header include, generated entries for its plain functions and
//! 	a directive pointing the glue at the artifact's absolute path, and written into a new
//! 	[`Workspace`] as `<stem>.i`. See [`prepare`].
//!
//! - **Compile**: [`ToolchainPipeline`] runs the generator, compiles the generated host glue,
//! 	then compiles the wrapper into the shared artifact. Every command goes through a
//! 	[`ProcessRunner`]; the first failure stops the build.
//!
//! - **Load**: a fresh [`LoadContext`] rooted at the workspace's parent loads the artifact as
//! 	unit `<build-id>.<module>` and reads its exported symbols.
//!
//! - **Bind**: [`own_entries`] picks the members the unit declares itself, leaving out those
//! 	inherited from the glue runtime ([`GLUE_RUNTIME`]), and [`bind`] registers each in the
//! 	[`Registry`], replacing what was there.
//!
//! Failure at any stage is returned as a [`BuildError`] before anything is registered.
//!
//! # Lifetime of loaded code
//!
//! A loaded library is owned by an [`ArtifactHandle`] shared by every entry resolved from it.
//! Rebinding or unregistering a name drops one reference; once no [`BoundEntry`] (or clone of
//! one) refers to the artifact it is closed. Workspaces on disk are never removed.
//!
//! # Native entries
//!
//! Plain functions need no ceremony. Every top-level function whose parameters and result
//! are `bool`, integer or floating point types gets an entry generated for it, so this
//! source binds `add`:
//!
//! ```c
//! %{
//! int add( int a, int b ) { return a + b; }
//! %}
//! ```
//!
//! Anything else is written by hand with the `NL_ENTRY` macro from `include/native_link.h`.
//! The prepared source already includes that header ahead of the original text and the
//! default compiler flags put its directory on the include path, so `%{ %}` blocks use the
//! macro and its `nl_*` helpers without an `#include` of their own:
//!
//! ```c
//! %{
//! NL_ENTRY( add ) {
//! 	NL_EXPECT_ARITY( 2 );
//! 	NL_EXPECT_INT( 0 );
//! 	NL_EXPECT_INT( 1 );
//! 	return nl_return_int( ret, nl_int( argv, 0 ) + nl_int( argv, 1 ));
//! }
//! %}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use native_link::{ build, BuildConfig, Registry, Value };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::default().with_workspace_root( "/var/tmp/native-link" );
//! let mut registry = Registry::new();
//!
//! let outcome = build( "math.i", &config, &mut registry )?;
//! println!( "{} bound {:?}", outcome.build_id(), outcome.bound() );
//!
//! assert_eq!( registry.call( "add", &[ Value::Int( 2 ), Value::Int( 3 )])?, Value::Int( 5 ));
//! # Ok(())
//! # }
//! ```
//!
//! Entries can also be registered from the host side, which is how hosts provide fallbacks
//! or tests stub out native code:
//!
//! ```
//! use native_link::{ Registry, Value, InvokeError, from_fn };
//!
//! let mut registry = Registry::new();
//! registry.register( "negate", "host", from_fn(| args | match args {
//! 	[ Value::Int( value )] => Ok( Value::Int( -value )),
//! 	[ _ ] => Err( InvokeError::TypeMismatch { index: 0 }),
//! 	_ => Err( InvokeError::ArgumentMismatch { expected: 1, found: args.len() }),
//! }));
//!
//! assert_eq!( registry.call( "negate", &[ Value::Int( 7 )]), Ok( Value::Int( -7 )));
//! assert_eq!( registry.call( "negate", &[]), Err( InvokeError::ArgumentMismatch { expected: 1, found: 0 }));
//! ```

mod binder ;
mod config ;
mod entry ;
mod loader ;
mod pipeline ;
mod process ;
mod registry ;
mod signature ;
mod source ;
mod toolchain ;
mod unit ;
mod value ;
mod workspace ;

pub use binder::{ bind, own_entries, ExportedFunction };
pub use config::{ BuildConfig, ConfigError, BRIDGE_INCLUDE_DIR };
pub use entry::{ from_fn, Entry, EntryFn, Invoke, InvokeError, NativeEntry };
pub use loader::{ ArtifactHandle, LoadContext, LoadError, NativeUnit };
pub use pipeline::{ build, build_with, BuildError, BuildOutcome };
pub use process::{ ProcessOutput, ProcessRunner, SystemRunner, ToolchainFailure };
pub use registry::{ BoundEntry, Registry };
pub use signature::{ scan, CType, Scalar, Signature };
pub use source::{ prepare, PreparedSource, SourceModule, BRIDGE_INCLUDE, INTERFACE_EXTENSION };
pub use toolchain::{ wrapper_file_name, BuiltArtifact, ToolchainPipeline, MODULE_DEFINE, NO_GLUE_SOURCES };
pub use unit::{ LoadedUnit, Member, GLUE_RUNTIME };
pub use value::{ RawValue, Value };
pub use workspace::{ BuildId, Workspace };
#[doc( no_inline )]
pub use nonempty_collections::NEVec ;
