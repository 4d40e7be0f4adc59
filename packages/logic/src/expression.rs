//! Expression validity checking.
//!
//! Parsing and evaluating expressions is left to the survey runtime. The
//! editor only needs a yes/no answer before it commits a rule.

/// Decides whether an expression may be committed
pub trait ExpressionValidator {
    fn is_valid(&self, expression: &str) -> bool;
}

/// Structural check: non-blank, balanced `{}` `()` `[]`, closed quotes and
/// no empty `{}` field reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedExpressionChecker;

impl ExpressionValidator for BalancedExpressionChecker {
    fn is_valid(&self, expression: &str) -> bool {
        if expression.trim().is_empty() {
            return false;
        }

        let mut open: Vec<(char, usize)> = Vec::new();
        let mut quote: Option<char> = None;

        for (pos, c) in expression.char_indices() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '\'' | '"' => quote = Some(c),
                '{' | '(' | '[' => open.push((c, pos)),
                '}' | ')' | ']' => {
                    let Some((opener, start)) = open.pop() else {
                        return false;
                    };
                    let expected = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    if opener != expected {
                        return false;
                    }
                    if c == '}' && expression[start + 1..pos].trim().is_empty() {
                        return false;
                    }
                }
                _ => {}
            }
        }

        quote.is_none() && open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_expressions() {
        let checker = BalancedExpressionChecker;
        assert!(checker.is_valid("{q1} = 1"));
        assert!(checker.is_valid("({q1} > 5 and {q2} contains 'a)') or {q3} anyof ['x', 'y']"));
        assert!(checker.is_valid("age({birthdate}) >= 18"));
    }

    #[test]
    fn test_rejects_blank_and_unbalanced() {
        let checker = BalancedExpressionChecker;
        assert!(!checker.is_valid(""));
        assert!(!checker.is_valid("   "));
        assert!(!checker.is_valid("{q1 = 1"));
        assert!(!checker.is_valid("{q1} = 1)"));
        assert!(!checker.is_valid("({q1] = 1)"));
        assert!(!checker.is_valid("{q1} = 'abc"));
        assert!(!checker.is_valid("{} = 1"));
    }
}
