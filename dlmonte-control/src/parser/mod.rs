//! All things related to reading and writing CONTROL text

mod cursor;
mod document;
mod fed;
mod fed_flavour;
mod fed_method;
mod fed_order;
mod interaction;
mod keyword;
mod lexer;
mod main_block;
mod moves;
mod parser;
mod records;
mod sample;
mod statement;
mod use_block;

pub use cursor::*;
pub use document::*;
pub use fed::*;
pub use fed_flavour::*;
pub use fed_method::*;
pub use fed_order::*;
pub use interaction::*;
pub use lexer::*;
pub use main_block::*;
pub use moves::*;
pub(crate) use parser::*;
pub use records::*;
pub use sample::*;
pub use statement::*;
pub use use_block::*;
