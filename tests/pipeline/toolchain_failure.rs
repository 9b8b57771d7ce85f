use native_link::{ build_with, from_fn, BuildError, Registry, ToolchainFailure, Value, NO_GLUE_SOURCES };
use crate::scripted_runner::{ config, init_logger, write_source, ScriptedRunner, COMPILER, GENERATOR, GLUE_COMPILER };

const SOURCE: &str = "%{\nNL_ENTRY( add ) { return nl_return_int( ret, 5 ); }\n%}\n" ;

fn registry_with_host_add() -> Registry {
	let mut registry = Registry::new();
	registry.register( "add", "host", from_fn(| _ | Ok( Value::Int( 1 ))));
	registry
}

fn assert_untouched( registry: &Registry ) {
	assert_eq!( registry.names(), [ "add" ]);
	assert_eq!( registry.get( "add" ).map(| entry | entry.unit() ), Some( "host" ));
	assert_eq!( registry.call( "add", &[] ), Ok( Value::Int( 1 )));
}

#[test]
fn generator_failure_stops_the_build() {

	init_logger();
	let sources = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = write_source( sources.path(), "math.i", SOURCE );

	let runner = ScriptedRunner::new().failing_on( GENERATOR );
	let mut registry = registry_with_host_add();

	match build_with( &runner, &source, &config( root.path() ), &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, exit_code: Some( 1 ), output, .. }))
			if command == GENERATOR && output.contains( "scripted failure" ) => {}
		value => panic!( "Expected a generator ToolchainFailure, found: {:#?}", value ),
	}
	assert_eq!( runner.executables(), [ GENERATOR ]);
	assert_untouched( &registry );

}

#[test]
fn glue_compile_failure_stops_the_build() {

	init_logger();
	let sources = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = write_source( sources.path(), "math.i", SOURCE );

	let runner = ScriptedRunner::new().failing_on( GLUE_COMPILER );
	let mut registry = registry_with_host_add();

	match build_with( &runner, &source, &config( root.path() ), &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, .. })) if command == GLUE_COMPILER => {}
		value => panic!( "Expected a glue compiler ToolchainFailure, found: {:#?}", value ),
	}
	assert_eq!( runner.executables(), [ GENERATOR, GLUE_COMPILER ]);
	assert_untouched( &registry );

}

#[test]
fn native_compile_failure_stops_the_build() {

	init_logger();
	let sources = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = write_source( sources.path(), "math.i", SOURCE );

	let runner = ScriptedRunner::new().failing_on( COMPILER );
	let mut registry = registry_with_host_add();

	match build_with( &runner, &source, &config( root.path() ), &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, args, .. }))
			if command == COMPILER && args.iter().any(| arg | arg == "-o" ) => {}
		value => panic!( "Expected a compiler ToolchainFailure, found: {:#?}", value ),
	}
	assert_eq!( runner.executables(), [ GENERATOR, GLUE_COMPILER, COMPILER ]);
	assert_untouched( &registry );

}

#[test]
fn missing_glue_is_a_glue_compiler_failure() {

	init_logger();
	let sources = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = write_source( sources.path(), "math.i", SOURCE );

	let runner = ScriptedRunner::new().without_glue();
	let mut registry = registry_with_host_add();

	match build_with( &runner, &source, &config( root.path() ), &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, output, .. }))
			if command == GLUE_COMPILER && output == NO_GLUE_SOURCES => {}
		value => panic!( "Expected a missing glue failure, found: {:#?}", value ),
	}
	assert_eq!( runner.executables(), [ GENERATOR ]);
	assert_untouched( &registry );

}

#[test]
fn unspawnable_tool_is_a_toolchain_failure() {

	init_logger();
	let sources = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = write_source( sources.path(), "math.i", SOURCE );

	let runner = ScriptedRunner::new();
	let mut registry = registry_with_host_add();
	let config = config( root.path() ).with_generator( "no-such-generator" );

	match build_with( &runner, &source, &config, &mut registry ) {
		Err( BuildError::Toolchain( ToolchainFailure { command, exit_code: None, output, .. }))
			if command == "no-such-generator" && output.contains( "command not found" ) => {}
		value => panic!( "Expected a spawn failure, found: {:#?}", value ),
	}
	assert_untouched( &registry );

}
