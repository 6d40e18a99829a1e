//! Conversation script input.

mod parser;

pub use parser::{Script, ScriptLine, parse_script};
