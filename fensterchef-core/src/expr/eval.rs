//! The cursor-based recursive evaluator (§4.4): walks a flat `&[u32]`
//! instruction sequence, each opcode either consuming the next word or
//! recursing into its sub-expression(s) at the same cursor. Grounded on
//! `original_source/src/expression.c`'s `run_instruction`'s "advance the
//! pointer, return it" shape; the opcodes that file's `run_instruction`
//! does not implement (`VARIABLE`, `SET`, `SET_INTEGER`, `PUSH_INTEGER`,
//! `LOAD_INTEGER`, `STACK_POINTER`, `NOT`) are built directly from their
//! stack-effect description in §3.5, since no retrieved source file
//! implements them.

use crate::geometry::Quad;
use crate::variables::{VariableSlot, Variables};

use super::actions::{Action, ActionValue, ArgKind};
use super::bytecode::{opcode_of, signed_operand, unsigned_operand, Opcode};

/// A value produced by evaluating one (sub-)expression.
///
/// §4.4 describes string literals as pointing into the bytecode buffer
/// rather than being copied during evaluation. Safely reinterpreting a
/// `&[u32]` as borrowed UTF-8 without `unsafe` isn't practical in Rust, so
/// this evaluator copies a literal's bytes out into an owned `String` at
/// the point it is first read — a deliberate deviation, noted in
/// `DESIGN.md`, from the original's zero-copy pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Str(String),
    Quad(Quad),
}

impl Value {
    /// Truthiness per §3.5: "truthy means non-zero"; non-integer values
    /// (string, quad) are always truthy, matching the original's
    /// pointer-as-condition convention.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(v) => *v != 0,
            Value::Str(_) | Value::Quad(_) => true,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> i32 {
        match self {
            Value::Integer(v) => *v,
            Value::Str(_) | Value::Quad(_) => 0,
        }
    }
}

/// Handlers for the action family the parser can compile a call into.
/// Implemented outside this crate (by whatever owns the frame tree, the
/// window registry and process spawning); the evaluator only knows how
/// to shape the argument and hand it over.
pub trait ActionHost {
    fn run_void_action(&mut self, action: Action) -> i32;
    fn run_action(&mut self, action: Action, value: ActionValue) -> i32;
}

#[derive(Debug)]
pub enum EvalError {
    UnknownOpcode(u8),
    UnknownAction(u32),
    TruncatedInstruction,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::UnknownOpcode(b) => write!(f, "unknown opcode byte {b}"),
            EvalError::UnknownAction(id) => write!(f, "unknown action id {id}"),
            EvalError::TruncatedInstruction => write!(f, "instruction sequence ended mid-expression"),
        }
    }
}

impl std::error::Error for EvalError {}

type EvalResult = Result<(Value, usize), EvalError>;

/// Evaluates one expression (recursing into sub-expressions as needed)
/// starting at `pos`, and returns its value along with the cursor
/// position immediately after it. `locals` is the evaluator's shared
/// stack for `PUSH_INTEGER`/`LOAD_INTEGER`/`STACK_POINTER`.
pub struct Evaluator<'a, H: ActionHost> {
    code: &'a [u32],
    locals: Vec<i32>,
    variables: &'a mut Variables,
    host: &'a mut H,
}

impl<'a, H: ActionHost> Evaluator<'a, H> {
    pub fn new(code: &'a [u32], variables: &'a mut Variables, host: &'a mut H) -> Self {
        Self {
            code,
            locals: Vec::new(),
            variables,
            host,
        }
    }

    /// Runs every top-level expression in `code` in sequence (the way the
    /// compiler emits one bytecode buffer per binding/association/startup
    /// expression, each a single possibly-`NEXT`-chained expression) and
    /// returns the last value produced.
    pub fn run(&mut self) -> Result<Value, EvalError> {
        let mut pos = 0;
        let mut last = Value::Integer(0);
        while pos < self.code.len() {
            let (value, next) = self.eval_at(pos)?;
            last = value;
            pos = next;
        }
        Ok(last)
    }

    fn word(&self, pos: usize) -> Result<u32, EvalError> {
        self.code.get(pos).copied().ok_or(EvalError::TruncatedInstruction)
    }

    fn eval_at(&mut self, pos: usize) -> EvalResult {
        let instruction = self.word(pos)?;
        let opcode = opcode_of(instruction).ok_or_else(|| EvalError::UnknownOpcode((instruction & 0xFF) as u8))?;

        match opcode {
            Opcode::LiteralInteger => Ok((Value::Integer(signed_operand(instruction)), pos + 1)),

            Opcode::LiteralString => {
                let word_len = unsigned_operand(instruction) as usize;
                let start = pos + 1;
                let end = start + word_len;
                if end > self.code.len() {
                    return Err(EvalError::TruncatedInstruction);
                }
                let mut bytes = bytes_of(&self.code[start..end]);
                let nul_at = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                bytes.truncate(nul_at);
                let text = String::from_utf8(bytes).unwrap_or_default();
                Ok((Value::Str(text), end))
            }

            Opcode::LiteralQuad => {
                let n = unsigned_operand(instruction) as usize;
                let mut cur = pos + 1;
                let mut values = [0i32; 4];
                for slot in values.iter_mut().take(n.min(4)) {
                    let (value, next) = self.eval_at(cur)?;
                    *slot = value.as_integer();
                    cur = next;
                }
                let quad = match n {
                    1 => Quad::uniform(values[0]),
                    2 => Quad::pair(values[0], values[1]),
                    _ => Quad {
                        top: values[0],
                        right: values[1],
                        bottom: values[2],
                        left: values[3],
                    },
                };
                Ok((Value::Quad(quad), cur))
            }

            Opcode::Variable => {
                let slot = VariableSlot(unsigned_operand(instruction));
                Ok((Value::Integer(self.variables.get(slot)), pos + 1))
            }

            Opcode::Next => {
                let (_, after_first) = self.eval_at(pos + 1)?;
                self.eval_at(after_first)
            }

            Opcode::LogicalAnd | Opcode::LogicalOr => {
                let skip = unsigned_operand(instruction) as usize;
                let (first, after_first) = self.eval_at(pos + 1)?;
                let short_circuits = match opcode {
                    Opcode::LogicalAnd => !first.is_truthy(),
                    Opcode::LogicalOr => first.is_truthy(),
                    _ => unreachable!(),
                };
                if short_circuits {
                    Ok((first, after_first + skip))
                } else {
                    self.eval_at(after_first)
                }
            }

            Opcode::Set => {
                let slot = VariableSlot(unsigned_operand(instruction));
                let (value, next) = self.eval_at(pos + 1)?;
                self.variables.set(slot, value.as_integer());
                Ok((value, next))
            }

            Opcode::PushInteger => {
                let (value, next) = self.eval_at(pos + 1)?;
                self.locals.push(value.as_integer());
                Ok((value, next))
            }

            Opcode::LoadInteger => {
                let index = unsigned_operand(instruction) as usize;
                let value = self.locals.get(index).copied().unwrap_or(0);
                Ok((Value::Integer(value), pos + 1))
            }

            Opcode::SetInteger => {
                let index = unsigned_operand(instruction) as usize;
                let (value, next) = self.eval_at(pos + 1)?;
                if let Some(cell) = self.locals.get_mut(index) {
                    *cell = value.as_integer();
                }
                Ok((value, next))
            }

            Opcode::StackPointer => {
                let target = unsigned_operand(instruction) as usize;
                self.locals.truncate(target);
                Ok((Value::Integer(0), pos + 1))
            }

            Opcode::Not => {
                let (value, next) = self.eval_at(pos + 1)?;
                Ok((Value::Integer(i32::from(!value.is_truthy())), next))
            }

            Opcode::Negate => {
                let (value, next) = self.eval_at(pos + 1)?;
                Ok((Value::Integer(value.as_integer().wrapping_neg()), next))
            }

            Opcode::Add | Opcode::Subtract | Opcode::Multiply | Opcode::Divide | Opcode::Modulo => {
                let (left, after_left) = self.eval_at(pos + 1)?;
                let (right, after_right) = self.eval_at(after_left)?;
                let (a, b) = (left.as_integer(), right.as_integer());
                let result = match opcode {
                    Opcode::Add => a.wrapping_add(b),
                    Opcode::Subtract => a.wrapping_sub(b),
                    Opcode::Multiply => a.wrapping_mul(b),
                    Opcode::Divide => if b == 0 { 0 } else { a.wrapping_div(b) },
                    Opcode::Modulo => if b == 0 { 0 } else { a.wrapping_rem(b) },
                    _ => unreachable!(),
                };
                Ok((Value::Integer(result), after_right))
            }

            Opcode::RunVoidAction => {
                let id = super::actions::ActionId(unsigned_operand(instruction));
                let action = Action::from_id(id).ok_or(EvalError::UnknownAction(id.0))?;
                Ok((Value::Integer(self.host.run_void_action(action)), pos + 1))
            }

            Opcode::RunAction => {
                let id = super::actions::ActionId(unsigned_operand(instruction));
                let action = Action::from_id(id).ok_or(EvalError::UnknownAction(id.0))?;
                let (value, next) = self.eval_at(pos + 1)?;
                let arg = match action.arg_kind() {
                    ArgKind::Integer => ActionValue::Integer(value.as_integer()),
                    ArgKind::Quad => match value {
                        Value::Quad(q) => ActionValue::Quad(q),
                        other => ActionValue::Quad(Quad::uniform(other.as_integer())),
                    },
                    ArgKind::String => match value {
                        Value::Str(s) => ActionValue::String(s.to_owned()),
                        _ => ActionValue::String(String::new()),
                    },
                    ArgKind::Void => ActionValue::Integer(value.as_integer()),
                };
                Ok((Value::Integer(self.host.run_action(action, arg)), next))
            }
        }
    }
}

fn bytes_of(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::bytecode::{word, word_signed, Bytecode};

    struct RecordingHost {
        void_calls: Vec<Action>,
        action_calls: Vec<(Action, ActionValue)>,
    }

    impl ActionHost for RecordingHost {
        fn run_void_action(&mut self, action: Action) -> i32 {
            self.void_calls.push(action);
            1
        }
        fn run_action(&mut self, action: Action, value: ActionValue) -> i32 {
            self.action_calls.push((action, value));
            1
        }
    }

    #[test]
    fn arithmetic_wraps_and_divide_by_zero_is_zero() {
        let mut code = Bytecode::new();
        code.emit(word(Opcode::Divide, 0));
        code.emit(word_signed(Opcode::LiteralInteger, 10));
        code.emit(word_signed(Opcode::LiteralInteger, 0));
        let mut vars = Variables::new();
        let mut host = RecordingHost { void_calls: vec![], action_calls: vec![] };
        let mut evaluator = Evaluator::new(code.as_slice(), &mut vars, &mut host);
        assert_eq!(evaluator.run().unwrap(), Value::Integer(0));
    }

    #[test]
    fn logical_and_short_circuits_without_evaluating_rhs() {
        let mut code = Bytecode::new();
        // 0 && RUN_VOID_ACTION(quit) — rhs must never execute.
        code.emit(word(Opcode::LogicalAnd, 1));
        code.emit(word_signed(Opcode::LiteralInteger, 0));
        code.emit(word(Opcode::RunVoidAction, Action::Quit.id().0));
        let mut vars = Variables::new();
        let mut host = RecordingHost { void_calls: vec![], action_calls: vec![] };
        let mut evaluator = Evaluator::new(code.as_slice(), &mut vars, &mut host);
        let value = evaluator.run().unwrap();
        assert_eq!(value, Value::Integer(0));
        assert!(host.void_calls.is_empty());
    }

    #[test]
    fn set_updates_the_variable_table() {
        let mut vars = Variables::new();
        let slot = vars.declare("gap");
        let mut code = Bytecode::new();
        code.emit(word(Opcode::Set, slot.0));
        code.emit(word_signed(Opcode::LiteralInteger, 7));
        let mut host = RecordingHost { void_calls: vec![], action_calls: vec![] };
        let mut evaluator = Evaluator::new(code.as_slice(), &mut vars, &mut host);
        evaluator.run().unwrap();
        assert_eq!(vars.get(slot), 7);
    }

    #[test]
    fn run_action_evaluates_its_argument_and_dispatches() {
        let mut code = Bytecode::new();
        code.emit(word(Opcode::RunAction, Action::ShowMessage.id().0));
        code.emit_string("hi");
        let mut vars = Variables::new();
        let mut host = RecordingHost { void_calls: vec![], action_calls: vec![] };
        let mut evaluator = Evaluator::new(code.as_slice(), &mut vars, &mut host);
        evaluator.run().unwrap();
        assert_eq!(host.action_calls.len(), 1);
        assert_eq!(host.action_calls[0].1, ActionValue::String("hi".to_owned()));
    }
}
