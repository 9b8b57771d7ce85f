use std::sync::Arc ;
use native_link::{ build, Registry, Value };
use crate::native_toolchain::{ config, init_logger, interface, missing_compiler, ADD, MUL_AS_ADD };

#[test]
fn rebuild_rebinds_while_the_old_artifact_stays_loaded() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "math.i" );
	let config = config( root.path(), scratch.path() );
	let mut registry = Registry::new();

	std::fs::write( &source, interface( ADD )).unwrap();
	let first = build( &source, &config, &mut registry ).unwrap();
	let previous = registry.get( "add" ).cloned().unwrap();

	std::fs::write( &source, interface( MUL_AS_ADD )).unwrap();
	let second = build( &source, &config, &mut registry ).unwrap();

	assert_ne!( first.build_id(), second.build_id() );
	assert_ne!( first.artifact(), second.artifact() );
	assert_eq!( registry.call( "add", &[ Value::Int( 2 ), Value::Int( 3 )]), Ok( Value::Int( 6 )));
	assert_eq!( previous.call( &[ Value::Int( 2 ), Value::Int( 3 )]), Ok( Value::Int( 5 )));
	assert_eq!( registry.get( "add" ).map(| entry | entry.unit().to_string() ), Some( format!( "{}.math", second.build_id() )));

}

#[test]
fn unbinding_releases_the_artifact() {

	if missing_compiler() { return }
	init_logger();
	let scratch = tempfile::tempdir().unwrap();
	let root = tempfile::tempdir().unwrap();
	let source = scratch.path().join( "math.i" );
	std::fs::write( &source, interface( ADD )).unwrap();

	let mut registry = Registry::new();
	build( &source, &config( root.path(), scratch.path() ), &mut registry ).unwrap();

	let entry = registry.get( "add" ).cloned().unwrap();
	let native = Arc::clone( entry.artifact().unwrap() );
	drop( entry );
	assert_eq!( Arc::strong_count( &native ), 2 );

	registry.unregister( "add" );
	assert_eq!( Arc::strong_count( &native ), 1 );
	assert!( native.path().is_file() );

}
