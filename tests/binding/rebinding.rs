use native_link::{ bind, InvokeError, Registry, Value };
use crate::stub_unit::{ constant, StubUnit };

#[test]
fn last_build_wins() {

	let mut registry = Registry::new();
	bind( &StubUnit::new( "nl_0.math" ).with_own( "add", 5 ), &mut registry );
	bind( &StubUnit::new( "nl_1.math" ).with_own( "add", 6 ), &mut registry );

	assert_eq!( registry.len(), 1 );
	assert_eq!( registry.call( "add", &[] ), Ok( Value::Int( 6 )));
	assert_eq!( registry.get( "add" ).map(| entry | entry.unit() ), Some( "nl_1.math" ));

}

#[test]
fn replaced_entries_stay_callable_through_clones() {

	let mut registry = Registry::new();
	bind( &StubUnit::new( "nl_0.math" ).with_own( "add", 5 ), &mut registry );
	let previous = registry.get( "add" ).cloned().unwrap();

	bind( &StubUnit::new( "nl_1.math" ).with_own( "add", 6 ), &mut registry );

	assert_eq!( previous.call( &[] ), Ok( Value::Int( 5 )));
	assert_eq!( registry.call( "add", &[] ), Ok( Value::Int( 6 )));

}

#[test]
fn register_returns_the_replaced_entry() {

	let mut registry = Registry::new();
	assert!( registry.register( "add", "host", constant( 1 )).is_none() );

	match registry.register( "add", "nl_0.math", constant( 2 )) {
		Some( previous ) if previous.unit() == "host" => assert_eq!( previous.call( &[] ), Ok( Value::Int( 1 ))),
		value => panic!( "Expected the host entry back, found: {:#?}", value ),
	}

}

#[test]
fn rebinding_leaves_unrelated_names_alone() {

	let mut registry = Registry::new();
	bind( &StubUnit::new( "nl_0.math" ).with_own( "add", 5 ).with_own( "mul", 6 ), &mut registry );
	bind( &StubUnit::new( "nl_1.math" ).with_own( "add", 7 ), &mut registry );

	assert_eq!( registry.names(), [ "add", "mul" ]);
	assert_eq!( registry.call( "mul", &[] ), Ok( Value::Int( 6 )));
	assert_eq!( registry.get( "mul" ).map(| entry | entry.unit() ), Some( "nl_0.math" ));

}

#[test]
fn unregistered_names_are_unknown() {

	let mut registry = Registry::new();
	bind( &StubUnit::new( "nl_0.math" ).with_own( "add", 5 ), &mut registry );

	assert!( registry.unregister( "add" ).is_some() );
	assert!( registry.is_empty() );
	match registry.call( "add", &[] ) {
		Err( InvokeError::UnknownEntry( name )) if name == "add" => {}
		value => panic!( "Expected UnknownEntry( \"add\" ), found: {:#?}", value ),
	}

}
