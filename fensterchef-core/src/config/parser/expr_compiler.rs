//! The expression compiler (§3.5/§4.4): precedence-climbing recursive
//! descent over a [`Cursor`], emitting [`Bytecode`] instead of evaluating
//! directly. Grounded on `original_source/include/configuration/parser.h`'s
//! `parse_expression_and_append`/`parse_quad_expression_and_append`
//! declarations and on spec.md §3.5's precedence table:
//!
//! `;` < `||` < `&&` < action-call < `=` < `+`/`-` (binary) < unary `+`/`-`
//! < `*`/`//`/`%` < `!` < literal/paren/quad/variable.
//!
//! Both `/` and `//` compile to the single `Divide` opcode (§3.5 gives
//! truncating division one runtime behaviour regardless of spelling) —
//! a deliberate simplification noted in `DESIGN.md`.

use crate::expr::bytecode::{word, word_signed, Bytecode, Opcode};
use crate::expr::actions::{Action, ArgKind};
use crate::variables::Variables;

use super::error::ErrorKind;
use super::lexer::Cursor;

/// A local variable declared with `local <name> = <expr>` inside one
/// expression's scope, resolved to a stack slot (`PushInteger`/
/// `LoadInteger`/`SetInteger`) rather than the global variable table.
struct Local {
    name: String,
    address: u32,
}

pub struct ExprCompiler<'a, 'v> {
    cursor: Cursor<'a>,
    code: Bytecode,
    variables: &'v mut Variables,
    locals: Vec<Local>,
    stack_position: u32,
}

impl<'a, 'v> ExprCompiler<'a, 'v> {
    #[must_use]
    pub fn new(text: &'a str, variables: &'v mut Variables) -> Self {
        Self {
            cursor: Cursor::new(text),
            code: Bytecode::new(),
            variables,
            locals: Vec::new(),
            stack_position: 0,
        }
    }

    #[must_use]
    pub fn remainder(&self) -> &'a str {
        self.cursor.remainder()
    }

    #[must_use]
    pub fn at_line_end(&mut self) -> bool {
        self.cursor.at_line_end()
    }

    /// Compiles one full expression (the `;`-sequence level).
    ///
    /// A trailing `STACK_POINTER` is deliberately not emitted here: each
    /// compiled buffer (one binding, one association, one startup
    /// statement) is run by a fresh [`crate::expr::Evaluator`] whose
    /// `locals` stack starts empty, so any `local` slots it pushes need no
    /// runtime cleanup — appending one as a bare trailing instruction would
    /// also make it the evaluator's last-evaluated top-level expression,
    /// clobbering the real result with the reset's own return value of
    /// `0`. `STACK_POINTER` stays available in the opcode set for a
    /// `local` declared inside a sub-expression of a larger one (e.g. one
    /// operand of `&&`) whose scope ends before its sibling runs; nothing
    /// this parser currently emits needs that case.
    pub fn compile(mut self) -> Result<Bytecode, ErrorKind> {
        self.sequence()?;
        Ok(self.code)
    }

    /// Like [`Self::compile`], but also reports how many bytes of the
    /// input were consumed — for embedding one expression inside a larger
    /// line grammar (a setting's value, a binding's trailing action) where
    /// the caller needs to keep parsing what follows.
    pub fn compile_prefix(mut self) -> Result<(Bytecode, usize), ErrorKind> {
        let total_len = self.cursor.remainder().len();
        self.sequence()?;
        let consumed = total_len - self.cursor.remainder().len();
        Ok((self.code, consumed))
    }

    /// Compiles a standalone 1/2/4-integer quad value (a `[gaps]` setting's
    /// `inner`/`outer` line), reporting bytes consumed like
    /// [`Self::compile_prefix`].
    pub fn compile_quad_prefix(mut self) -> Result<(Bytecode, usize), ErrorKind> {
        let total_len = self.cursor.remainder().len();
        self.quad_expression()?;
        let consumed = total_len - self.cursor.remainder().len();
        Ok((self.code, consumed))
    }

    fn peek_non_space(&mut self) -> Option<u8> {
        let mut probe = self.cursor.clone();
        probe.skip_space();
        probe.peek()
    }

    fn consume_if(&mut self, byte: u8) -> bool {
        let mut probe = self.cursor.clone();
        probe.skip_space();
        if probe.peek() == Some(byte) {
            self.cursor = probe;
            let _ = self.cursor_advance();
            true
        } else {
            false
        }
    }

    fn cursor_advance(&mut self) -> Option<u8> {
        self.cursor.parse_character()
    }

    /// `;`: left-associative sequencing, `NEXT a b` keeps `b`'s value.
    ///
    /// Every opcode here is prefix-encoded (the opcode word precedes its
    /// operand's instructions, per `expr::eval`'s cursor-based recursion),
    /// but the operand is necessarily compiled — and appended — before its
    /// enclosing operator's token is even seen. Each of these functions
    /// therefore records `start`, the position the left operand began at,
    /// and once an operator is recognised, hoists that operator's word
    /// into place with [`Bytecode::insert`] rather than appending it.
    /// Reusing the same `start` across a left-associative chain (`a+b+c`)
    /// nests correctly: the second hoist lands before the first operator,
    /// producing `Add(Add(a, b), c)`.
    fn sequence(&mut self) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.logical_or()?;
        while self.consume_if(b';') {
            self.logical_or()?;
            self.code.insert(start, word(Opcode::Next, 0));
        }
        Ok(())
    }

    /// `||`: short-circuiting logical or. The operand carries the word
    /// length of the right-hand side so the evaluator can skip over it
    /// when the left side already decided the result.
    fn logical_or(&mut self) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.logical_and()?;
        loop {
            let mut probe = self.cursor.clone();
            probe.skip_space();
            if probe.peek() == Some(b'|') {
                let mut lookahead = probe.clone();
                let _ = lookahead.parse_character();
                if lookahead.peek() == Some(b'|') {
                    let _ = lookahead.parse_character();
                    self.cursor = lookahead;
                    let before_rhs = self.code.len();
                    self.logical_and()?;
                    let skip = (self.code.len() - before_rhs) as u32;
                    self.code.insert(start, word(Opcode::LogicalOr, skip));
                    continue;
                }
            }
            break;
        }
        Ok(())
    }

    /// `&&`: short-circuiting logical and.
    fn logical_and(&mut self) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.additive()?;
        loop {
            let mut probe = self.cursor.clone();
            probe.skip_space();
            if probe.peek() == Some(b'&') {
                let mut lookahead = probe.clone();
                let _ = lookahead.parse_character();
                if lookahead.peek() == Some(b'&') {
                    let _ = lookahead.parse_character();
                    self.cursor = lookahead;
                    let before_rhs = self.code.len();
                    self.additive()?;
                    let skip = (self.code.len() - before_rhs) as u32;
                    self.code.insert(start, word(Opcode::LogicalAnd, skip));
                    continue;
                }
            }
            break;
        }
        Ok(())
    }

    /// `+`/`-` binary, left-associative. Assignment (`=`) and action calls
    /// bind tighter than `;`/`||`/`&&` but looser than arithmetic in this
    /// grammar's actual token shapes (a call is a bare identifier followed
    /// by its argument, an assignment is `name = expr`), so both are
    /// recognised here at the point a primary identifier is read, rather
    /// than as their own separate precedence levels.
    fn additive(&mut self) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.multiplicative()?;
        loop {
            match self.peek_non_space() {
                Some(b'+') => {
                    self.consume_if(b'+');
                    self.multiplicative()?;
                    self.code.insert(start, word(Opcode::Add, 0));
                }
                Some(b'-') => {
                    self.consume_if(b'-');
                    self.multiplicative()?;
                    self.code.insert(start, word(Opcode::Subtract, 0));
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// `*`, `//`/`/`, `%`.
    fn multiplicative(&mut self) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.unary()?;
        loop {
            match self.peek_non_space() {
                Some(b'*') => {
                    self.consume_if(b'*');
                    self.unary()?;
                    self.code.insert(start, word(Opcode::Multiply, 0));
                }
                Some(b'/') => {
                    let mut probe = self.cursor.clone();
                    probe.skip_space();
                    let _ = probe.parse_character();
                    if probe.peek() == Some(b'/') {
                        let _ = probe.parse_character();
                    }
                    self.cursor = probe;
                    self.unary()?;
                    self.code.insert(start, word(Opcode::Divide, 0));
                }
                Some(b'%') => {
                    self.consume_if(b'%');
                    self.unary()?;
                    self.code.insert(start, word(Opcode::Modulo, 0));
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Unary `+`/`-`/`!`.
    fn unary(&mut self) -> Result<(), ErrorKind> {
        match self.peek_non_space() {
            Some(b'-') => {
                self.consume_if(b'-');
                let start = self.code.len();
                self.unary()?;
                self.code.insert(start, word(Opcode::Negate, 0));
                Ok(())
            }
            Some(b'+') => {
                self.consume_if(b'+');
                self.unary()
            }
            Some(b'!') => {
                self.consume_if(b'!');
                let start = self.code.len();
                self.unary()?;
                self.code.insert(start, word(Opcode::Not, 0));
                Ok(())
            }
            _ => self.primary(),
        }
    }

    /// Literal, parenthesised expression, quad, variable reference,
    /// assignment, `local` declaration, or action call.
    fn primary(&mut self) -> Result<(), ErrorKind> {
        self.cursor.skip_space();
        match self.cursor.peek() {
            None => Err(ErrorKind::PrematureLineEnd),
            Some(b'(') => {
                let _ = self.cursor.parse_character();
                self.sequence()?;
                self.cursor.skip_space();
                if self.cursor.parse_character() != Some(b')') {
                    return Err(ErrorKind::MissingClosingParen);
                }
                Ok(())
            }
            Some(b'"') => {
                let s = self.cursor.parse_string().map_err(|_| ErrorKind::UnexpectedToken)?;
                self.code.emit_string(&s);
                Ok(())
            }
            Some(c) if c.is_ascii_digit() => {
                let value = self.cursor.parse_unsigned_integer()?;
                self.code.emit(word_signed(Opcode::LiteralInteger, value));
                Ok(())
            }
            _ => self.identifier_led(),
        }
    }

    /// Handles everything that starts with an identifier: `local`
    /// declarations, assignments (`name = expr`), action calls (`name
    /// arg?`), and bare variable reads.
    fn identifier_led(&mut self) -> Result<(), ErrorKind> {
        let mut probe = self.cursor.clone();
        let ident = probe
            .parse_identifier()
            .map_err(|_| ErrorKind::UnexpectedToken)?;
        let ident = ident.to_string();
        self.cursor = probe;

        if ident == "local" {
            return self.local_declaration();
        }

        if let Some(action) = Action::by_name(&ident) {
            return self.action_call(action);
        }

        // Assignment: `name = expr`, either to a local or a global.
        let mut after = self.cursor.clone();
        after.skip_space();
        if after.peek() == Some(b'=') {
            let mut lookahead = after.clone();
            let _ = lookahead.parse_character();
            // `==` is not a defined operator in this grammar; a single `=`
            // is assignment.
            if lookahead.peek() != Some(b'=') {
                self.cursor = lookahead;
                return self.assignment(&ident);
            }
        }

        self.variable_read(&ident)
    }

    fn local_declaration(&mut self) -> Result<(), ErrorKind> {
        let name = self
            .cursor
            .parse_identifier()
            .map_err(|_| ErrorKind::InvalidVariableName)?
            .to_string();
        self.cursor.skip_space();
        if self.cursor.peek() != Some(b'=') {
            return Err(ErrorKind::MisappliedSet);
        }
        let _ = self.cursor.parse_character();
        // The right-hand side binds at the `additive` level: `=` sits
        // looser than `+`/`-` but tighter than `;`/`&&`/`||` (§3.5's
        // precedence table), so `local x = 1 + 2; ...` assigns `3` to `x`
        // without swallowing the trailing `;`-separated statements.
        let start = self.code.len();
        self.additive()?;
        let address = self.stack_position;
        self.stack_position += 1;
        self.code.insert(start, word(Opcode::PushInteger, address));
        self.locals.push(Local { name, address });
        Ok(())
    }

    fn assignment(&mut self, name: &str) -> Result<(), ErrorKind> {
        let start = self.code.len();
        self.additive()?;
        if let Some(local) = self.locals.iter().find(|l| l.name == name) {
            self.code.insert(start, word(Opcode::SetInteger, local.address));
        } else {
            let slot = self.variables.declare(name);
            self.code.insert(start, word(Opcode::Set, slot.0));
        }
        Ok(())
    }

    fn variable_read(&mut self, name: &str) -> Result<(), ErrorKind> {
        if let Some(local) = self.locals.iter().find(|l| l.name == name) {
            self.code.emit(word(Opcode::LoadInteger, local.address));
            return Ok(());
        }
        let slot = self.variables.declare(name);
        self.code.emit(word(Opcode::Variable, slot.0));
        Ok(())
    }

    /// Compiles a call to a registered action, honouring its declared
    /// [`ArgKind`] and whether the argument is optional (§4.4).
    fn action_call(&mut self, action: Action) -> Result<(), ErrorKind> {
        let has_argument = match action.arg_kind() {
            ArgKind::Void => false,
            _ if action.is_optional() => self.argument_present(),
            _ => true,
        };
        if has_argument {
            self.code.emit(word(Opcode::RunAction, action.id().0));
            match action.arg_kind() {
                ArgKind::String => {
                    self.cursor.skip_space();
                    let s = self
                        .cursor
                        .parse_string()
                        .map_err(|_| ErrorKind::InvalidAction)?;
                    self.code.emit_string(&s);
                }
                ArgKind::Quad => self.quad_expression()?,
                _ => self.unary()?,
            }
        } else {
            self.code.emit(word(Opcode::RunVoidAction, action.id().0));
        }
        Ok(())
    }

    fn argument_present(&mut self) -> bool {
        let mut probe = self.cursor.clone();
        probe.skip_space();
        !matches!(probe.peek(), None | Some(b';' | b')' | b'&' | b'|'))
    }

    /// `parse_quad_expression_and_append`: 1, 2 or 4 integer expressions,
    /// prefixed with the `LITERAL_QUAD` opcode (§3.5, §GLOSSARY).
    fn quad_expression(&mut self) -> Result<(), ErrorKind> {
        let mut values = Vec::new();
        loop {
            let mut probe = self.cursor.clone();
            probe.skip_space();
            if matches!(probe.peek(), None | Some(b';' | b')' | b'&' | b'|')) || values.len() == 4 {
                break;
            }
            let start = self.code.len();
            self.unary()?;
            values.push(start);
        }
        match values.len() {
            1 | 2 | 4 => {
                self.code.insert(values[0], word(Opcode::LiteralQuad, values.len() as u32));
                Ok(())
            }
            _ => Err(ErrorKind::InvalidQuad),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::eval::{ActionHost, Evaluator, Value};
    use crate::expr::actions::ActionValue;

    struct NullHost;
    impl ActionHost for NullHost {
        fn run_void_action(&mut self, _action: Action) -> i32 {
            0
        }
        fn run_action(&mut self, _action: Action, _value: ActionValue) -> i32 {
            0
        }
    }

    fn compile(src: &str, variables: &mut Variables) -> Bytecode {
        ExprCompiler::new(src, variables).compile().unwrap()
    }

    fn run(src: &str) -> Value {
        let mut variables = Variables::new();
        let code = compile(src, &mut variables);
        let mut host = NullHost;
        Evaluator::new(code.as_slice(), &mut variables, &mut host)
            .run()
            .unwrap()
    }

    #[test]
    fn compiles_arithmetic_with_precedence() {
        assert_eq!(run("2 + 3 * 4"), Value::Integer(14));
    }

    #[test]
    fn compiles_parenthesised_grouping() {
        assert_eq!(run("(2 + 3) * 4"), Value::Integer(20));
    }

    #[test]
    fn compiles_global_variable_assignment_and_read() {
        assert_eq!(run("count = 5; count + 1"), Value::Integer(6));
    }

    #[test]
    fn compiles_local_declaration() {
        assert_eq!(run("local x = 10; x * 2"), Value::Integer(20));
    }

    #[test]
    fn compiles_action_call_without_argument() {
        let mut variables = Variables::new();
        let code = compile("quit", &mut variables);
        assert!(code.as_slice().len() >= 1);
    }
}
