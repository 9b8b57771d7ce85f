use native_link::{ build, BuildError, InvokeError, Registry, ToolchainFailure, Value, BRIDGE_INCLUDE_DIR };
use crate::native_toolchain::{ config, init_logger, interface, missing_compiler, ADD, HALVE };

#[test]
fn built_function_is_callable() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "math.i" );
	std::fs::write( &source, interface( ADD )).unwrap();

	let mut registry = Registry::new();
	let outcome = build( &source, &config( root.path(), scratch.path() ), &mut registry ).unwrap();

	assert_eq!( outcome.bound(), [ "add" ]);
	assert_eq!( registry.names(), [ "add" ]);
	assert!( outcome.artifact().is_file() );
	assert!( outcome.artifact().starts_with( outcome.workspace().path() ));
	assert_eq!( outcome.built().glue().first(), &outcome.workspace().file( "math_wrap.h.gch" ));
	assert!( outcome.built().glue().first().is_file() );
	assert_eq!( registry.call( "add", &[ Value::Int( 2 ), Value::Int( 3 )]), Ok( Value::Int( 5 )));
	assert_eq!( registry.call( "add", &[ Value::Int( -2 ), Value::Int( 3 )]), Ok( Value::Int( 1 )));

}

#[test]
fn native_entry_reports_argument_errors() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "math.i" );
	std::fs::write( &source, interface( ADD )).unwrap();

	let mut registry = Registry::new();
	build( &source, &config( root.path(), scratch.path() ), &mut registry ).unwrap();

	match registry.call( "add", &[ Value::Int( 1 )]) {
		Err( InvokeError::ArgumentMismatch { expected: 2, found: 1 }) => {}
		value => panic!( "Expected ArgumentMismatch {{ expected: 2, found: 1 }}, found: {:#?}", value ),
	}
	match registry.call( "add", &[ Value::Int( 1 ), Value::Float( 1.0 )]) {
		Err( InvokeError::TypeMismatch { index: 1 }) => {}
		value => panic!( "Expected TypeMismatch {{ index: 1 }}, found: {:#?}", value ),
	}

}

#[test]
fn every_own_function_is_bound() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "math.i" );
	std::fs::write( &source, interface( &format!( "{}{}", ADD, HALVE ))).unwrap();

	let mut registry = Registry::new();
	let outcome = build( &source, &config( root.path(), scratch.path() ), &mut registry ).unwrap();

	assert_eq!( registry.names(), [ "add", "halve" ]);
	assert_eq!( outcome.bound().len(), 2 );
	assert_eq!( registry.call( "halve", &[ Value::Float( 5.0 )]), Ok( Value::Float( 2.5 )));

}

#[test]
fn compile_error_leaves_the_registry_untouched() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "broken.i" );
	std::fs::write( &source, interface( "NL_ENTRY( add ) { return not_declared_anywhere; }\n" )).unwrap();

	let mut registry = Registry::new();
	match build( &source, &config( root.path(), scratch.path() ), &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, output, .. }))
			if command == "g++" && output.contains( "not_declared_anywhere" ) => {}
		value => panic!( "Expected a compiler ToolchainFailure, found: {:#?}", value ),
	}
	assert!( registry.is_empty() );

}

#[test]
fn bridge_header_compiles_without_a_module() {

	if missing_compiler() { return }
	let scratch = tempfile::tempdir().unwrap();
	let glue = scratch.path().join( "glue.h" );
	std::fs::write( &glue, "#include \"native_link.h\"\nstatic inline int64_t first( const nl_value* argv ) { return nl_int( argv, 0 ); }\n" ).unwrap();

	let output = std::process::Command::new( "g++" )
		.args([ "-fsyntax-only", "-x", "c++-header" ])
		.arg( format!( "-I{}", BRIDGE_INCLUDE_DIR ))
		.arg( &glue )
		.output().unwrap();
	assert!( output.status.success(), "{}", String::from_utf8_lossy( &output.stderr ));

}
