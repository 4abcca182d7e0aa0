//! The bytecode expression engine (§3.5/§4.4): word format, the action
//! registry a compiled call resolves against, and the cursor-based
//! evaluator. The compiler itself (prefix-hoisting, precedence climbing,
//! scope-exit `STACK_POINTER` emission) lives in `config::parser`, since it
//! needs the parser's token stream; this module only owns what compiled
//! bytecode looks like and how it runs.

pub mod actions;
pub mod bytecode;
pub mod eval;

pub use actions::{Action, ActionId, ActionValue, ArgKind};
pub use bytecode::{Bytecode, Opcode};
pub use eval::{ActionHost, EvalError, Evaluator, Value};
