//! Window-to-settings associations (§3.6, §4.5): glob patterns matched
//! against a new window's `WM_CLASS` instance and (optionally) class,
//! first-match-in-source-order wins. Grounded on
//! `configuration_structure.h`'s `configuration_association` (`instance`,
//! `class_pattern`) and the `[class]` bracket syntax spec.md §8 scenario 5
//! demonstrates (`"urxvt*"` matching instance, `"URxvt"` matching class).

use crate::expr::Bytecode;

/// A compiled glob pattern: `?` matches one character, `*` matches any run
/// of characters, `\` escapes the following character literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob(String);

impl Glob {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Glob(pattern.to_string())
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        matches_glob(self.0.as_bytes(), text.as_bytes())
    }
}

/// Plain recursive glob matcher over bytes: `*` tries every split point,
/// `?` consumes exactly one byte, `\` escapes the following pattern byte.
fn matches_glob(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(b'*') => {
            matches_glob(&pattern[1..], text)
                || (!text.is_empty() && matches_glob(pattern, &text[1..]))
        }
        Some(b'?') => !text.is_empty() && matches_glob(&pattern[1..], &text[1..]),
        Some(b'\\') if pattern.len() > 1 => {
            !text.is_empty() && text[0] == pattern[1] && matches_glob(&pattern[2..], &text[1..])
        }
        Some(&c) => !text.is_empty() && text[0] == c && matches_glob(&pattern[1..], &text[1..]),
    }
}

/// One `[assignment]` rule: `instance` matches `WM_CLASS`'s first (instance)
/// component; `class` optionally narrows further by the second (class)
/// component, written `"instance-pattern" "[class-pattern]"` in the config
/// grammar (§8 scenario 5: `"urxvt*" ; "URxvt"`).
#[derive(Debug, Clone)]
pub struct Association {
    pub number: u32,
    pub instance: Glob,
    pub class: Option<Glob>,
    pub action: Bytecode,
}

impl Association {
    #[must_use]
    pub fn matches(&self, instance: &str, class: &str) -> bool {
        self.instance.matches(instance)
            && self.class.as_ref().map_or(true, |c| c.matches(class))
    }
}

/// Returns the first association (in declared order) matching the given
/// `WM_CLASS` pair (§4.5: "first matching association in source order
/// wins").
#[must_use]
pub fn find<'a>(
    associations: &'a [Association],
    instance: &str,
    class: &str,
) -> Option<&'a Association> {
    associations.iter().find(|a| a.matches(instance, class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        assert!(Glob::new("urxvt*").matches("urxvt-256color"));
        assert!(!Glob::new("urxvt*").matches("xterm"));
    }

    #[test]
    fn question_mark_matches_exactly_one_character() {
        assert!(Glob::new("a?c").matches("abc"));
        assert!(!Glob::new("a?c").matches("abbc"));
    }

    #[test]
    fn backslash_escapes_a_literal_wildcard() {
        assert!(Glob::new(r"foo\*bar").matches("foo*bar"));
        assert!(!Glob::new(r"foo\*bar").matches("fooXbar"));
    }

    #[test]
    fn association_without_class_pattern_only_checks_instance() {
        let assoc = Association {
            number: 1,
            instance: Glob::new("urxvt*"),
            class: None,
            action: Bytecode::new(),
        };
        assert!(assoc.matches("urxvt", "anything"));
    }

    #[test]
    fn first_matching_association_in_source_order_wins() {
        let associations = vec![
            Association {
                number: 1,
                instance: Glob::new("*"),
                class: None,
                action: Bytecode::new(),
            },
            Association {
                number: 5,
                instance: Glob::new("urxvt*"),
                class: None,
                action: Bytecode::new(),
            },
        ];
        let found = find(&associations, "urxvt", "URxvt").unwrap();
        assert_eq!(found.instance.pattern(), "*");
        assert_eq!(found.number, 1);
    }

    #[test]
    fn a_rule_can_carry_a_target_window_number() {
        let associations = vec![Association {
            number: 5,
            instance: Glob::new("urxvt*"),
            class: None,
            action: Bytecode::new(),
        }];
        let found = find(&associations, "urxvt", "anything").unwrap();
        assert_eq!(found.number, 5);
    }
}
