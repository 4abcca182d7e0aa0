//! The top-level configuration parser (§4.5): line-buffered recursive
//! descent over labelled sections, dispatching each line to a
//! type-directed variable assignment, a per-label command, or (for
//! `[mouse]`/`[keyboard]`/`[assignment]`) a special binding/association
//! parser. Grounded on
//! `original_source/include/configuration/parser.h` (parser state shape,
//! error enum, `parse_line` contract) and
//! `include/bits/configuration_parser_label_information.h` (the
//! label → variable/command table).

pub mod error;
pub mod expr_compiler;
pub mod lexer;

use std::collections::HashSet;

use crate::expr::Bytecode;
use crate::variables::Variables;

use super::association::{Association, Glob};
use super::bindings::{ButtonBinding, ButtonFlags, KeyBinding, KeyFlags, Modifiers};
use super::Configuration;

pub use error::{ErrorKind, ParseError, ParseErrors, MAX_ERRORS};
use expr_compiler::ExprCompiler;
use lexer::Cursor;

/// Supplies the text of an `include "path"` target. The binary crate reads
/// real files (with `~` expansion, per §6); tests can serve an in-memory
/// map.
pub trait SourceLoader {
    fn load(&self, path: &str) -> Option<String>;
}

/// Resolves a key symbol name to its numeric keysym, or a `button<N>` /
/// bare decimal to a key code. Display-dependent (§4.5: "keysym resolution
/// uses the display's key table"), so it is injected rather than owned by
/// this crate.
pub trait KeysymResolver {
    fn resolve(&self, name: &str) -> Option<u32>;
}

/// How deep `include` may nest before `PARSER_ERROR_INCLUDE_OVERFLOW`
/// (§4.5: "bounded depth, e.g. 32").
pub const MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Label {
    General,
    Startup,
    Tiling,
    Font,
    Border,
    Gaps,
    Notification,
    Mouse,
    Keyboard,
    Assignment,
}

impl Label {
    fn by_name(name: &str) -> Option<Self> {
        Some(match name {
            "general" => Label::General,
            "startup" => Label::Startup,
            "tiling" => Label::Tiling,
            "font" => Label::Font,
            "border" => Label::Border,
            "gaps" => Label::Gaps,
            "notification" => Label::Notification,
            "mouse" => Label::Mouse,
            "keyboard" => Label::Keyboard,
            "assignment" => Label::Assignment,
            _ => return None,
        })
    }
}

/// Parses `source` as a configuration file. `loader` resolves `include`
/// directives; `keysyms` resolves key-binding trigger names. Returns the
/// built [`Configuration`] or the accumulated [`ParseErrors`] (§4.5/§7).
pub fn parse(
    source: &str,
    file_name: &str,
    loader: &dyn SourceLoader,
    keysyms: &dyn KeysymResolver,
) -> Result<Configuration, ParseErrors> {
    let mut parser = Parser {
        configuration: Configuration::default(),
        variables: Variables::new(),
        errors: ParseErrors::default(),
        label: None,
        seen_labels: HashSet::new(),
        keysyms,
    };
    parser.run(source, file_name, loader, 0);
    if parser.errors.is_empty() {
        Ok(parser.configuration)
    } else {
        Err(parser.errors)
    }
}

struct Parser<'k> {
    configuration: Configuration,
    variables: Variables,
    errors: ParseErrors,
    label: Option<Label>,
    seen_labels: HashSet<Label>,
    keysyms: &'k dyn KeysymResolver,
}

impl<'k> Parser<'k> {
    fn run(&mut self, source: &str, file_name: &str, loader: &dyn SourceLoader, depth: usize) {
        for (index, raw_line) in source.lines().enumerate() {
            if !self.errors.is_full() {
                self.parse_line(raw_line, file_name, index as u32 + 1, loader, depth);
            }
        }
    }

    fn report(&mut self, kind: ErrorKind, file: &str, line: u32, column: u32) {
        self.errors.push(ParseError {
            kind,
            file: file.to_string(),
            line,
            column,
        });
    }

    fn parse_line(
        &mut self,
        raw_line: &str,
        file: &str,
        line_number: u32,
        loader: &dyn SourceLoader,
        depth: usize,
    ) {
        let line = strip_comment(raw_line);
        let mut cursor = Cursor::new(line);
        cursor.skip_space();
        if cursor.at_line_end() {
            return;
        }

        if cursor.peek() == Some(b'[') {
            self.parse_label_header(&mut cursor, file, line_number);
            return;
        }

        let mut probe = cursor.clone();
        if probe.parse_identifier().as_deref() == Ok("include") {
            cursor = probe;
            self.parse_include(&mut cursor, file, line_number, loader, depth);
            return;
        }

        let Some(label) = self.label else {
            self.report(ErrorKind::InvalidLabel, file, line_number, cursor.column());
            return;
        };

        match label {
            Label::Startup => self.parse_startup_line(&mut cursor, file, line_number),
            Label::Mouse => self.parse_mouse_line(&mut cursor, file, line_number),
            Label::Keyboard => self.parse_keyboard_line(&mut cursor, file, line_number),
            Label::Assignment => self.parse_assignment_line(&mut cursor, file, line_number),
            _ => self.parse_setting_line(label, &mut cursor, file, line_number),
        }
    }

    fn parse_label_header(&mut self, cursor: &mut Cursor<'_>, file: &str, line_number: u32) {
        let _ = cursor.parse_character();
        let name = match cursor.parse_identifier() {
            Ok(n) => n.to_string(),
            Err(_) => {
                self.report(ErrorKind::InvalidLabel, file, line_number, cursor.column());
                return;
            }
        };
        cursor.skip_space();
        if cursor.parse_character() != Some(b']') {
            self.report(ErrorKind::MissingClosingBracket, file, line_number, cursor.column());
            return;
        }
        match Label::by_name(&name) {
            Some(label) => {
                self.seen_labels.insert(label);
                self.label = Some(label);
            }
            None => self.report(ErrorKind::InvalidLabel, file, line_number, cursor.column()),
        }
    }

    fn parse_include(
        &mut self,
        cursor: &mut Cursor<'_>,
        file: &str,
        line_number: u32,
        loader: &dyn SourceLoader,
        depth: usize,
    ) {
        if depth >= MAX_INCLUDE_DEPTH {
            self.report(ErrorKind::IncludeOverflow, file, line_number, cursor.column());
            return;
        }
        let path = match cursor.parse_string() {
            Ok(p) => p,
            Err(_) => {
                self.report(ErrorKind::InvalidInclude, file, line_number, cursor.column());
                return;
            }
        };
        let expanded = expand_tilde(&path);
        match loader.load(&expanded) {
            Some(contents) => self.run(&contents, &expanded, loader, depth + 1),
            None => self.report(ErrorKind::InvalidInclude, file, line_number, cursor.column()),
        }
    }

    /// `[startup]`: every non-empty line is a free-standing action
    /// expression (§6: "free-form expression sequence"), compiled and
    /// chained with `;` into the configuration's single startup bytecode.
    fn parse_startup_line(&mut self, cursor: &mut Cursor<'_>, file: &str, line_number: u32) {
        let column = cursor.column();
        let text = cursor.remainder().to_string();
        let compiler = ExprCompiler::new(&text, &mut self.variables);
        match compiler.compile() {
            Ok(code) => {
                if self.configuration.startup.is_empty() {
                    self.configuration.startup = code;
                } else {
                    append_sequenced(&mut self.configuration.startup, &code);
                }
            }
            Err(kind) => self.report(kind, file, line_number, column),
        }
    }

    fn parse_setting_line(
        &mut self,
        label: Label,
        cursor: &mut Cursor<'_>,
        file: &str,
        line_number: u32,
    ) {
        let column = cursor.column();
        let name = match cursor.parse_identifier() {
            Ok(n) => n.to_string(),
            Err(kind) => return self.report(kind, file, line_number, column),
        };
        if name == "merge-default" && matches!(label, Label::Mouse | Label::Keyboard) {
            self.merge_default(label);
            return;
        }
        let result = self.assign_setting(label, &name, cursor);
        if let Err(kind) = result {
            self.report(kind, file, line_number, column);
        }
    }

    fn assign_setting(
        &mut self,
        label: Label,
        name: &str,
        cursor: &mut Cursor<'_>,
    ) -> Result<(), ErrorKind> {
        macro_rules! int_expr {
            () => {{
                let value = self.eval_integer(cursor)?;
                value
            }};
        }
        match (label, name) {
            (Label::General, "overlap-percentage") => {
                self.configuration.general.overlap_percentage = int_expr!();
            }
            (Label::Tiling, "auto-split") => {
                self.configuration.tiling.auto_split = cursor.parse_boolean()?;
            }
            (Label::Tiling, "auto-equalize") => {
                self.configuration.tiling.auto_equalize = cursor.parse_boolean()?;
            }
            (Label::Tiling, "auto-fill-void") => {
                self.configuration.tiling.auto_fill_void = cursor.parse_boolean()?;
            }
            (Label::Tiling, "auto-remove") => {
                self.configuration.tiling.auto_remove = cursor.parse_boolean()?;
            }
            (Label::Tiling, "auto-remove-void") => {
                self.configuration.tiling.auto_remove_void = cursor.parse_boolean()?;
            }
            (Label::Font, "name") => {
                self.configuration.font.name = cursor.parse_string()?;
            }
            (Label::Border, "size") => self.configuration.border.size = int_expr!(),
            (Label::Border, "color") => self.configuration.border.color = cursor.parse_color()?,
            (Label::Border, "active-color") => {
                self.configuration.border.active_color = cursor.parse_color()?;
            }
            (Label::Border, "focus-color") => {
                self.configuration.border.focus_color = cursor.parse_color()?;
            }
            (Label::Gaps, "inner") => {
                self.configuration.gaps.inner = self.eval_quad(cursor)?;
            }
            (Label::Gaps, "outer") => {
                self.configuration.gaps.outer = self.eval_quad(cursor)?;
            }
            (Label::Notification, "duration") => {
                self.configuration.notification.duration = int_expr!();
            }
            (Label::Notification, "padding") => {
                self.configuration.notification.padding = int_expr!();
            }
            (Label::Notification, "border-size") => {
                self.configuration.notification.border_size = int_expr!();
            }
            (Label::Notification, "border-color") => {
                self.configuration.notification.border_color = cursor.parse_color()?;
            }
            (Label::Notification, "foreground") => {
                self.configuration.notification.foreground = cursor.parse_color()?;
            }
            (Label::Notification, "background") => {
                self.configuration.notification.background = cursor.parse_color()?;
            }
            (Label::Mouse, "resize-tolerance") => {
                self.configuration.mouse.resize_tolerance = int_expr!();
            }
            (Label::Mouse, "modifiers") => {
                self.configuration.mouse.modifiers = parse_modifier_list(cursor)?;
            }
            (Label::Mouse, "ignore-modifiers") => {
                self.configuration.mouse.ignore_modifiers = parse_modifier_list(cursor)?;
            }
            (Label::Keyboard, "modifiers") => {
                self.configuration.keyboard.modifiers = parse_modifier_list(cursor)?;
            }
            (Label::Keyboard, "ignore-modifiers") => {
                self.configuration.keyboard.ignore_modifiers = parse_modifier_list(cursor)?;
            }
            (Label::Assignment, "first-window-number") => {
                self.configuration.assignment.first_window_number = int_expr!();
            }
            _ => return Err(ErrorKind::InvalidVariableName),
        }
        Ok(())
    }

    fn eval_integer(&mut self, cursor: &mut Cursor<'_>) -> Result<i32, ErrorKind> {
        let text = cursor.remainder().to_string();
        let compiler = ExprCompiler::new(&text, &mut self.variables);
        let (code, consumed) = compiler.compile_prefix()?;
        cursor.advance_bytes(consumed);
        Ok(run_integer(&code))
    }

    fn eval_quad(&mut self, cursor: &mut Cursor<'_>) -> Result<crate::geometry::Quad, ErrorKind> {
        let text = cursor.remainder().to_string();
        let compiler = ExprCompiler::new(&text, &mut self.variables);
        let (code, consumed) = compiler.compile_quad_prefix()?;
        cursor.advance_bytes(consumed);
        Ok(run_quad(&code))
    }

    fn merge_default(&mut self, label: Label) {
        match label {
            Label::Mouse => {
                for binding in super::bindings::default_buttons() {
                    super::bindings::upsert_button(&mut self.configuration.mouse.buttons, binding);
                }
            }
            Label::Keyboard => {
                for binding in super::bindings::default_keys() {
                    super::bindings::upsert_key(&mut self.configuration.keyboard.keys, binding);
                }
            }
            _ => {}
        }
    }

    /// `(release|transparent)? (Mod+)* button<N> (--flag)* expression`
    /// (§4.5).
    fn parse_mouse_line(&mut self, cursor: &mut Cursor<'_>, file: &str, line_number: u32) {
        let column = cursor.column();
        match self.parse_button_binding(cursor) {
            Ok(binding) => super::bindings::upsert_button(&mut self.configuration.mouse.buttons, binding),
            Err(kind) => self.report(kind, file, line_number, column),
        }
    }

    fn parse_keyboard_line(&mut self, cursor: &mut Cursor<'_>, file: &str, line_number: u32) {
        let column = cursor.column();
        match self.parse_key_binding(cursor) {
            Ok(binding) => super::bindings::upsert_key(&mut self.configuration.keyboard.keys, binding),
            Err(kind) => self.report(kind, file, line_number, column),
        }
    }

    fn parse_binding_prefix(&mut self, cursor: &mut Cursor<'_>) -> Result<(bool, bool, Modifiers), ErrorKind> {
        let mut on_release = false;
        let mut transparent = false;
        loop {
            let mut probe = cursor.clone();
            let Ok(word) = probe.parse_identifier() else { break };
            match word {
                "release" => {
                    on_release = true;
                    *cursor = probe;
                }
                "transparent" => {
                    transparent = true;
                    *cursor = probe;
                }
                _ => break,
            }
        }
        let modifiers = parse_modifier_chain(cursor)?;
        Ok((on_release, transparent, modifiers))
    }

    fn parse_button_binding(&mut self, cursor: &mut Cursor<'_>) -> Result<ButtonBinding, ErrorKind> {
        let (on_release, transparent, mut modifiers) = self.parse_binding_prefix(cursor)?;
        modifiers = modifiers | self.configuration.mouse.modifiers;
        let trigger = cursor.parse_identifier().map_err(|_| ErrorKind::InvalidButton)?;
        let index = trigger
            .strip_prefix("button")
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or(ErrorKind::InvalidButton)?;
        // `configuration_button` has no release/press distinction (§6's
        // `[mouse]` grammar only lists `--transparent`); `release` is
        // accepted as a prefix keyword but only meaningful for keys.
        let (transparent, _on_release) = self.parse_trailing_flags(cursor, transparent, on_release)?;
        let action = self.compile_trailing_action(cursor)?;
        Ok(ButtonBinding {
            modifiers,
            button_index: index,
            flags: ButtonFlags { transparent },
            action,
        })
    }

    fn parse_key_binding(&mut self, cursor: &mut Cursor<'_>) -> Result<KeyBinding, ErrorKind> {
        let (on_release, transparent, mut modifiers) =
            self.parse_binding_prefix(cursor)?;
        modifiers = modifiers | self.configuration.keyboard.modifiers;
        let trigger = cursor.parse_identifier().map_err(|_| ErrorKind::InvalidKeySymbol)?;
        let key_symbol = self
            .keysyms
            .resolve(trigger)
            .ok_or(ErrorKind::InvalidKeySymbol)?;
        let (transparent, on_release) = self.parse_trailing_flags(cursor, transparent, on_release)?;
        let action = self.compile_trailing_action(cursor)?;
        Ok(KeyBinding {
            modifiers,
            key_symbol,
            flags: KeyFlags {
                on_release,
                transparent,
            },
            action,
        })
    }

    fn parse_trailing_flags(
        &mut self,
        cursor: &mut Cursor<'_>,
        mut transparent: bool,
        mut on_release: bool,
    ) -> Result<(bool, bool), ErrorKind> {
        loop {
            let mut probe = cursor.clone();
            probe.skip_space();
            if probe.peek() != Some(b'-') {
                break;
            }
            let mut lookahead = probe.clone();
            let _ = lookahead.parse_character();
            if lookahead.peek() != Some(b'-') {
                break;
            }
            let _ = lookahead.parse_character();
            let flag = lookahead.parse_identifier().map_err(|_| ErrorKind::InvalidBindingFlag)?;
            match flag {
                "release" => on_release = true,
                "transparent" => transparent = true,
                _ => return Err(ErrorKind::InvalidBindingFlag),
            }
            *cursor = lookahead;
        }
        Ok((transparent, on_release))
    }

    fn compile_trailing_action(&mut self, cursor: &mut Cursor<'_>) -> Result<Bytecode, ErrorKind> {
        let text = cursor.remainder().to_string();
        let compiler = ExprCompiler::new(&text, &mut self.variables);
        let code = compiler.compile()?;
        cursor.advance_bytes(text.len());
        Ok(code)
    }

    /// `<number> <instance-glob> ; <class-glob> (; <expression>)?` (§4.5).
    fn parse_assignment_line(&mut self, cursor: &mut Cursor<'_>, file: &str, line_number: u32) {
        let column = cursor.column();
        match self.parse_association(cursor) {
            Ok(association) => self.configuration.assignment.associations.push(association),
            Err(kind) => self.report(kind, file, line_number, column),
        }
    }

    fn parse_association(&mut self, cursor: &mut Cursor<'_>) -> Result<Association, ErrorKind> {
        let number = cursor.parse_unsigned_integer()?;
        let instance = cursor.parse_string().map_err(|_| ErrorKind::UnexpectedToken)?;
        cursor.skip_space();
        if cursor.parse_character() != Some(b';') {
            return Err(ErrorKind::ExpectedSeparator);
        }
        let class = cursor.parse_string().map_err(|_| ErrorKind::UnexpectedToken)?;
        let action = if {
            let mut probe = cursor.clone();
            probe.skip_space();
            probe.peek() == Some(b';')
        } {
            cursor.skip_space();
            let _ = cursor.parse_character();
            self.compile_trailing_action(cursor)?
        } else {
            Bytecode::new()
        };
        Ok(Association {
            number: number.max(0) as u32,
            instance: Glob::new(&instance),
            class: Some(Glob::new(&class)),
            action,
        })
    }
}

fn run_integer(code: &Bytecode) -> i32 {
    struct NoHost;
    impl crate::expr::ActionHost for NoHost {
        fn run_void_action(&mut self, _action: crate::expr::Action) -> i32 {
            0
        }
        fn run_action(&mut self, _action: crate::expr::Action, _value: crate::expr::ActionValue) -> i32 {
            0
        }
    }
    let mut vars = Variables::new();
    let mut host = NoHost;
    crate::expr::Evaluator::new(code.as_slice(), &mut vars, &mut host)
        .run()
        .map(|v| v.as_integer())
        .unwrap_or(0)
}

fn run_quad(code: &Bytecode) -> crate::geometry::Quad {
    struct NoHost;
    impl crate::expr::ActionHost for NoHost {
        fn run_void_action(&mut self, _action: crate::expr::Action) -> i32 {
            0
        }
        fn run_action(&mut self, _action: crate::expr::Action, _value: crate::expr::ActionValue) -> i32 {
            0
        }
    }
    let mut vars = Variables::new();
    let mut host = NoHost;
    match crate::expr::Evaluator::new(code.as_slice(), &mut vars, &mut host).run() {
        Ok(crate::expr::Value::Quad(q)) => q,
        Ok(v) => crate::geometry::Quad::uniform(v.as_integer()),
        Err(_) => crate::geometry::Quad::default(),
    }
}

/// Folds `code` onto the end of `into` as `NEXT into code`, word-shifting
/// `code`'s contents after it (matching how the compiler itself hoists a
/// `;`-chain's opcode ahead of its operands).
fn append_sequenced(into: &mut Bytecode, code: &Bytecode) {
    let mut combined = Bytecode::new();
    combined.emit(crate::expr::bytecode::word(crate::expr::bytecode::Opcode::Next, 0));
    for w in into.as_slice() {
        combined.emit(*w);
    }
    for w in code.as_slice() {
        combined.emit(*w);
    }
    *into = combined;
}

fn parse_modifier_chain(cursor: &mut Cursor<'_>) -> Result<Modifiers, ErrorKind> {
    let mut mask = Modifiers::NONE;
    loop {
        let mut probe = cursor.clone();
        let Ok(name) = probe.parse_identifier() else {
            break;
        };
        probe.skip_space();
        if probe.peek() != Some(b'+') {
            break;
        }
        let bit = modifier_bit(name).ok_or(ErrorKind::InvalidModifiers)?;
        mask = mask | bit;
        let _ = probe.parse_character();
        *cursor = probe;
    }
    Ok(mask)
}

fn parse_modifier_list(cursor: &mut Cursor<'_>) -> Result<Modifiers, ErrorKind> {
    let mut mask = Modifiers::NONE;
    loop {
        let mut probe = cursor.clone();
        let Ok(name) = probe.parse_identifier() else {
            break;
        };
        let bit = modifier_bit(name).ok_or(ErrorKind::InvalidModifiers)?;
        mask = mask | bit;
        *cursor = probe;
        let mut lookahead = cursor.clone();
        lookahead.skip_space();
        if lookahead.peek() == Some(b'+') {
            let _ = lookahead.parse_character();
            *cursor = lookahead;
            continue;
        }
        break;
    }
    Ok(mask)
}

fn modifier_bit(name: &str) -> Option<Modifiers> {
    Some(Modifiers(match name {
        "shift" => 1 << 0,
        "lock" => 1 << 1,
        "control" | "ctrl" => 1 << 2,
        "mod1" | "alt" => 1 << 3,
        "mod2" => 1 << 4,
        "mod3" => 1 << 5,
        "mod4" | "super" => 1 << 6,
        "mod5" => 1 << 7,
        "any" => 1 << 15,
        _ => return None,
    }))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Expands a leading `~` to `$HOME` (§6). Resolving the actual environment
/// variable is left to the caller's [`SourceLoader`] in case `$HOME` is
/// unset or the loader wants a different base; this only rewrites the
/// textual prefix the way the original parser's include handling does.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoIncludes;
    impl SourceLoader for NoIncludes {
        fn load(&self, _path: &str) -> Option<String> {
            None
        }
    }

    struct StubKeysyms;
    impl KeysymResolver for StubKeysyms {
        fn resolve(&self, name: &str) -> Option<u32> {
            match name {
                "q" => Some(0x71),
                _ => None,
            }
        }
    }

    #[test]
    fn parses_general_and_border_settings() {
        let source = "[general]\noverlap-percentage 60\n[border]\nsize 2\ncolor #112233\n";
        let config = parse(source, "test", &NoIncludes, &StubKeysyms).unwrap();
        assert_eq!(config.general.overlap_percentage, 60);
        assert_eq!(config.border.size, 2);
        assert_eq!(config.border.color, 0x112233);
    }

    #[test]
    fn parses_a_key_binding_with_modifiers() {
        let source = "[keyboard]\nMod4+Shift+q close-window\n";
        let config = parse(source, "test", &NoIncludes, &StubKeysyms).unwrap();
        assert_eq!(config.keyboard.keys.len(), 1);
        assert_eq!(config.keyboard.keys[0].key_symbol, 0x71);
    }

    #[test]
    fn parses_an_association_line() {
        let source = "[assignment]\n5 \"urxvt*\" ; \"URxvt\"\n";
        let config = parse(source, "test", &NoIncludes, &StubKeysyms).unwrap();
        assert_eq!(config.assignment.associations.len(), 1);
        assert!(config.assignment.associations[0].matches("urxvt", "URxvt"));
    }

    #[test]
    fn unknown_label_is_reported() {
        let source = "[nonsense]\nfoo 1\n";
        let errors = parse(source, "test", &NoIncludes, &StubKeysyms).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn invalid_variable_name_is_reported() {
        let source = "[general]\nnonexistent-key 1\n";
        let errors = parse(source, "test", &NoIncludes, &StubKeysyms).unwrap_err();
        assert_eq!(errors.errors[0].kind, ErrorKind::InvalidVariableName);
    }
}
