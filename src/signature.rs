//! Plain function declarations and the entries generated for them.
//!
//! A source may write entries against the bridge ABI by hand with `NL_ENTRY`, but it
//! does not have to: every top-level function whose parameters and result are C scalars
//! gets an entry generated for it, so `int add( int a, int b )` is callable as `add`
//! once built. Pointer, reference, aggregate and variadic signatures are left alone.

use itertools::Itertools ;



/// How a C scalar travels across the entry ABI.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Scalar { Bool, Int, Float }

impl Scalar {

	fn guard( self ) -> &'static str {
		match self {
			Self::Bool => "NL_EXPECT_BOOL",
			Self::Int => "NL_EXPECT_INT",
			Self::Float => "NL_EXPECT_FLOAT",
		}
	}

	fn reader( self ) -> &'static str {
		match self {
			Self::Bool => "nl_bool",
			Self::Int => "nl_int",
			Self::Float => "nl_float",
		}
	}

}

/// A scalar C type as spelled in the source, e.g. `unsigned long`.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct CType {
	spelling: String,
	scalar: Scalar,
}

const QUALIFIERS: [&str; 4] = [ "const", "volatile", "signed", "unsigned" ];
const STORAGE: [&str; 5] = [ "extern", "static", "inline", "__inline__", "constexpr" ];
const INTEGERS: [&str; 19] = [
	"char", "short", "int", "long",
	"int8_t", "int16_t", "int32_t", "int64_t",
	"uint8_t", "uint16_t", "uint32_t", "uint64_t",
	"size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "intmax_t", "uintmax_t",
];

impl CType {

	/// Classifies a sequence of type words. `void` and unknown words are not scalars.
	fn from_words<'a>( words: impl IntoIterator<Item = &'a str> ) -> Option<Self> {

		let words = words.into_iter().collect::<Vec<_>>();
		if words.is_empty() { return None }

		let mut scalar = None ;
		for word in &words {
			let kind = match *word {
				word if QUALIFIERS.contains( &word ) => continue,
				"bool" | "_Bool" => Scalar::Bool,
				"float" | "double" => Scalar::Float,
				word if INTEGERS.contains( &word ) => Scalar::Int,
				_ => return None,
			};
			scalar = Some( match ( scalar, kind ) {
				( None, kind ) => kind,
				( Some( Scalar::Int ), Scalar::Int ) => Scalar::Int,
				( Some( Scalar::Int ), Scalar::Float ) | ( Some( Scalar::Float ), Scalar::Int ) => Scalar::Float,
				_ => return None,
			});
		}

		Some( Self { spelling: words.join( " " ), scalar: scalar.unwrap_or( Scalar::Int ) })

	}

	#[inline] pub fn spelling( &self ) -> &str { &self.spelling }
	#[inline] pub fn scalar( &self ) -> Scalar { self.scalar }

}

fn is_type_word( word: &str ) -> bool {
	word == "void" || CType::from_words([ word ]).is_some()
}

/// A function declared at the top level of a source, with scalar parameters and a scalar
/// or `void` result.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Signature {
	name: String,
	result: Option<CType>,
	params: Vec<CType>,
}

impl Signature {

	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// The result type; `None` for `void`.
	#[inline] pub fn result( &self ) -> Option<&CType> { self.result.as_ref() }

	#[inline] pub fn params( &self ) -> &[CType] { &self.params }

	/// C source of the `NL_ENTRY` forwarding to this function.
	///
	/// The entry checks arity and argument tags before converting each argument to its
	/// declared type, so mismatches surface as the usual status codes.
	pub fn entry( &self ) -> String {

		let mut entry = format!( "NL_ENTRY( {} ) {{\n\tNL_EXPECT_ARITY( {} );\n", self.name, self.params.len() );
		if self.params.is_empty() { entry.push_str( "\t(void)argv;\n" ); }
		for ( index, param ) in self.params.iter().enumerate() {
			entry.push_str( &format!( "\t{}( {} );\n", param.scalar.guard(), index ));
		}

		let args = self.params.iter().enumerate()
			.map(|( index, param )| format!( "({}){}( argv, {} )", param.spelling, param.scalar.reader(), index ))
			.join( ", " );
		let call = if args.is_empty() { format!( "{}()", self.name ) } else { format!( "{}( {} )", self.name, args ) };

		entry.push_str( &match self.result.as_ref().map( CType::scalar ) {
			None => format!( "\t{};\n\treturn nl_return_unit( ret );\n", call ),
			Some( Scalar::Bool ) => format!( "\treturn nl_return_bool( ret, {} ? 1 : 0 );\n", call ),
			Some( Scalar::Int ) => format!( "\treturn nl_return_int( ret, (int64_t)( {} ));\n", call ),
			Some( Scalar::Float ) => format!( "\treturn nl_return_float( ret, (double)( {} ));\n", call ),
		});
		entry.push_str( "}\n" );
		entry

	}

}

/// Every function in `text` that gets a generated entry, in declaration order.
///
/// Declarations and definitions are both recognised, at the top level or inside
/// `extern "C"` blocks, whether they sit in `%{ %}` blocks or directly in the interface.
/// A name already written with `NL_ENTRY` is skipped, as is every repeat of a name.
pub fn scan( text: &str ) -> Vec<Signature> {

	let mut signatures = Vec::<Signature>::new();
	let mut handwritten = Vec::<String>::new();
	let mut blocks = Vec::<bool>::new();
	let mut statement = Vec::new();

	let mut record = | statement: &[Token] | match statement {
		[ Token::Word( entry ), Token::Punct( '(' ), Token::Word( name ), Token::Punct( ')' )] if entry == "NL_ENTRY" => {
			handwritten.push( name.clone() );
		},
		_ => if let Some( signature ) = parse( statement ) {
			if signatures.iter().all(| known | known.name != signature.name ) { signatures.push( signature ); }
		},
	};

	for token in tokenize( text ) {
		let top_level = blocks.iter().all(| transparent | *transparent );
		match token {
			Token::Punct( '{' ) if top_level => {
				let linkage = matches!( statement.as_slice(), [ Token::Word( word ), Token::Literal ] if word == "extern" );
				if !linkage { record( statement.as_slice() ); }
				statement.clear();
				blocks.push( linkage );
			},
			Token::Punct( '{' ) => blocks.push( false ),
			Token::Punct( '}' ) => {
				blocks.pop();
				statement.clear();
			},
			Token::Punct( ';' ) if top_level => {
				record( statement.as_slice() );
				statement.clear();
			},
			token if top_level => statement.push( token ),
			_ => {},
		}
	}

	signatures.retain(| signature | !handwritten.contains( &signature.name ));
	signatures

}

fn parse( statement: &[Token] ) -> Option<Signature> {

	let open = statement.iter().position(| token | *token == Token::Punct( '(' ))?;
	let ( Token::Punct( ')' ), [ head @ .., Token::Word( name )]) = ( statement.last()?, &statement[..open] ) else { return None };
	if is_type_word( name ) || STORAGE.contains( &name.as_str() ) { return None }

	let result_words = words( head.iter().filter(| token | **token != Token::Literal ))?
		.into_iter()
		.filter(| word | !STORAGE.contains( word ))
		.collect::<Vec<_>>();
	let result = match result_words.as_slice() {
		[ "void" ] => None,
		_ => Some( CType::from_words( result_words.iter().copied() )? ),
	};

	let params = match &statement[open + 1..statement.len() - 1] {
		[] => Vec::new(),
		[ Token::Word( word )] if word == "void" => Vec::new(),
		params => params.split(| token | *token == Token::Punct( ',' ))
			.map( parse_parameter )
			.collect::<Option<Vec<_>>>()?,
	};

	Some( Signature { name: name.clone(), result, params })

}

fn parse_parameter( tokens: &[Token] ) -> Option<CType> {
	let words = words( tokens.iter() )?;
	let type_words = match words.split_last() {
		Some(( last, rest )) if !rest.is_empty() && !is_type_word( last ) => rest,
		_ => &words[..],
	};
	CType::from_words( type_words.iter().copied() )
}

fn words<'a>( tokens: impl Iterator<Item = &'a Token> ) -> Option<Vec<&'a str>> {
	tokens.map(| token | match token {
		Token::Word( word ) => Some( word.as_str() ),
		_ => None,
	}).collect()
}

#[derive( Debug, Clone, PartialEq, Eq )]
enum Token {
	Word( String ),
	Literal,
	Punct( char ),
}

/// Splits C source into words, literals and punctuation.
///
/// Comments and preprocessor lines are dropped. Generator directives are dropped too,
/// except that the code inside `%{ %}` and `%inline %{ %}` blocks is kept.
fn tokenize( text: &str ) -> Vec<Token> {

	let mut tokens = Vec::new();
	let mut chars = text.chars().peekable();
	let mut line_start = true ;

	while let Some( c ) = chars.next() {
		match c {
			'\n' => { line_start = true ; continue },
			c if c.is_whitespace() => continue,
			'#' if line_start => { skip_line( &mut chars, true ); continue },
			'/' if chars.peek() == Some( &'/' ) => { skip_line( &mut chars, false ); line_start = true ; continue },
			'/' if chars.peek() == Some( &'*' ) => {
				chars.next();
				let mut previous = '\0' ;
				for c in chars.by_ref() {
					if previous == '*' && c == '/' { break }
					previous = c ;
				}
				continue
			},
			'%' if matches!( chars.peek(), Some( '{' | '}' )) => { chars.next(); },
			'%' if line_start => if take_word( &mut chars ) != "inline" { skip_line( &mut chars, false ); line_start = true ; continue },
			'"' | '\'' => {
				let mut escaped = false ;
				for next in chars.by_ref() {
					if next == c && !escaped { break }
					escaped = next == '\\' && !escaped ;
				}
				tokens.push( Token::Literal );
			},
			c if c.is_ascii_alphabetic() || c == '_' => tokens.push( Token::Word( format!( "{}{}", c, take_word( &mut chars )))),
			c if c.is_ascii_digit() => {
				take_word( &mut chars );
				tokens.push( Token::Literal );
			},
			c => tokens.push( Token::Punct( c )),
		}
		line_start = false ;
	}

	tokens

}

fn take_word( chars: &mut std::iter::Peekable<std::str::Chars<'_>> ) -> String {
	let mut word = String::new();
	while let Some( c ) = chars.next_if(| c | c.is_ascii_alphanumeric() || *c == '_' ) { word.push( c ); }
	word
}

/// Consumes the rest of the line, following `\` continuations if `continued`.
fn skip_line( chars: &mut std::iter::Peekable<std::str::Chars<'_>>, continued: bool ) {
	let mut previous = '\0' ;
	for c in chars.by_ref() {
		if c == '\n' && !( continued && previous == '\\' ) { return }
		previous = c ;
	}
}

#[cfg( test )]
mod tests {

	use super::*;

	fn names( text: &str ) -> Vec<String> {
		scan( text ).into_iter().map(| signature | signature.name ).collect()
	}

	#[test]
	fn plain_definitions_are_recognised() {
		let signatures = scan( "%{\nint add( int a, int b ) { return a + b; }\n%}\n" );
		match signatures.as_slice() {
			[ Signature { name, result: Some( result ), params }] if name == "add" && result.scalar() == Scalar::Int && params.len() == 2 => {}
			value => panic!( "Expected a single add(int, int), found: {:#?}", value ),
		}
	}

	#[test]
	fn scalar_types_are_classified() {
		let signatures = scan( "extern \"C\" {\n\tdouble scale( double x, unsigned long factor );\n\tbool is_even( int64_t n );\n\tvoid reset( void );\n}\n" );
		let kinds = signatures.iter()
			.map(| signature | ( signature.name(), signature.result().map( CType::scalar ), signature.params().iter().map( CType::scalar ).collect::<Vec<_>>() ))
			.collect::<Vec<_>>();
		assert_eq!( kinds, [
			( "scale", Some( Scalar::Float ), vec![ Scalar::Float, Scalar::Int ]),
			( "is_even", Some( Scalar::Bool ), vec![ Scalar::Int ]),
			( "reset", None, vec![]),
		]);
		assert_eq!( signatures[0].params()[1].spelling(), "unsigned long" );
	}

	#[test]
	fn unsupported_and_nested_functions_are_skipped() {
		let text = "\
#include <stdint.h>
#define TWICE( x ) ( 2 * ( x ))
// int commented( int x );
/* int also_commented( int x ); */
static const char* label( int x ) { return \"x\"; }
int sum( const int* values, int count );
struct point { int x; int y; };
namespace detail { int hidden( int x ) { return x; } }
int counter = 0;
int first( int x ) { if ( x ) { return x % 7; } return 0; }
" ;
		assert_eq!( names( text ), [ "first" ]);
	}

	#[test]
	fn handwritten_entries_and_repeats_are_not_generated_twice() {
		let text = "\
int add( int a, int b );
%inline %{ int add( int a, int b ) { return a + b; } %}
int twice( int x ) { return 2 * x; }
NL_ENTRY( twice ) { NL_EXPECT_ARITY( 1 ); return nl_return_int( ret, 2 * nl_int( argv, 0 )); }
" ;
		assert_eq!( names( text ), [ "add" ]);
	}

	#[test]
	fn generated_entry_guards_and_converts_every_argument() {
		let signatures = scan( "double scale( double x, int factor ) { return x * factor; }" );
		let entry = signatures[0].entry();
		assert!( entry.starts_with( "NL_ENTRY( scale ) {\n\tNL_EXPECT_ARITY( 2 );\n\tNL_EXPECT_FLOAT( 0 );\n\tNL_EXPECT_INT( 1 );\n" ));
		assert!( entry.contains( "return nl_return_float( ret, (double)( scale( (double)nl_float( argv, 0 ), (int)nl_int( argv, 1 ) )));" ));
	}

	#[test]
	fn void_functions_return_unit() {
		let entry = scan( "void reset() {}" )[0].entry();
		assert!( entry.contains( "(void)argv;" ));
		assert!( entry.contains( "\treset();\n\treturn nl_return_unit( ret );" ));
	}

}
