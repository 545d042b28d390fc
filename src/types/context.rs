use std::collections::HashMap;

use super::helper::Helper;
use super::input::InputTuple;

/// What a name resolves to inside a formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    Number(f64),
    Helper(Helper),
}

/// The name bindings visible to one formula.
///
/// Always contains `L`, `W`, `D` and the six helpers; rule results are added
/// with [`with_result`](Self::with_result) as a pass proceeds. Later bindings
/// replace earlier ones of the same name.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: Vec<(String, Binding)>,
    index: HashMap<String, usize>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The base bindings for one input: `L`, `W`, `D` and the helpers.
    #[must_use]
    pub fn for_input(input: &InputTuple) -> Self {
        let ctx = Self::new()
            .set("L", Binding::Number(input.length()))
            .set("W", Binding::Number(input.width()))
            .set("D", Binding::Number(input.enclosed_flag()));
        Helper::ALL
            .into_iter()
            .fold(ctx, |ctx, helper| ctx.set(helper.name(), Binding::Helper(helper)))
    }

    /// Bind `name`, replacing any existing binding of that name.
    #[must_use]
    pub fn set(mut self, name: &str, binding: Binding) -> Self {
        self.insert(name, binding);
        self
    }

    /// Expose a computed rule result to later formulas.
    ///
    /// Ids that are not valid identifiers are skipped: formulas could never
    /// name them, so the result stays out of the context.
    #[must_use]
    pub fn with_result(self, id: &str, value: f64) -> Self {
        if is_valid_identifier(id) {
            self.set(id, Binding::Number(value))
        } else {
            self
        }
    }

    fn insert(&mut self, name: &str, binding: Binding) {
        match self.index.get(name) {
            Some(&idx) => self.entries[idx].1 = binding,
            None => {
                self.index.insert(name.to_owned(), self.entries.len());
                self.entries.push((name.to_owned(), binding));
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Binding> {
        self.index.get(name).map(|&idx| self.entries[idx].1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// ASCII identifier rule: `[A-Za-z_$][A-Za-z0-9_$]*`.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_bindings() {
        let ctx = Context::for_input(&InputTuple::new(6.0, 4.0, true));
        assert_eq!(ctx.get("L"), Some(Binding::Number(6.0)));
        assert_eq!(ctx.get("W"), Some(Binding::Number(4.0)));
        assert_eq!(ctx.get("D"), Some(Binding::Number(1.0)));
        assert_eq!(ctx.get("MAX"), Some(Binding::Helper(Helper::Max)));
        assert_eq!(ctx.get("ROUND"), Some(Binding::Helper(Helper::Round)));
        assert_eq!(ctx.len(), 9);
    }

    #[test]
    fn with_result_adds_valid_ids() {
        let ctx = Context::for_input(&InputTuple::new(1.0, 1.0, false)).with_result("pole1", 2.0);
        assert_eq!(ctx.get("pole1"), Some(Binding::Number(2.0)));
    }

    #[test]
    fn with_result_filters_invalid_ids() {
        let ctx = Context::new()
            .with_result("M10*40", 8.0)
            .with_result("1st", 1.0)
            .with_result("", 1.0);
        assert!(ctx.is_empty());
    }

    #[test]
    fn later_binding_shadows_earlier() {
        let ctx = Context::for_input(&InputTuple::new(6.0, 4.0, true))
            .with_result("L", 100.0)
            .with_result("MAX", 3.0);
        assert_eq!(ctx.get("L"), Some(Binding::Number(100.0)));
        assert_eq!(ctx.get("MAX"), Some(Binding::Number(3.0)));
        assert_eq!(ctx.len(), 9);
    }

    #[test]
    fn rebinding_keeps_one_slot() {
        let ctx = Context::new()
            .with_result("b", 1.0)
            .with_result("a", 2.0)
            .with_result("b", 3.0);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("b"), Some(Binding::Number(3.0)));
    }

    #[test]
    fn extending_leaves_original_untouched() {
        let base = Context::for_input(&InputTuple::new(2.0, 2.0, false));
        let extended = base.clone().with_result("plate", 6.0);
        assert!(!base.contains("plate"));
        assert!(extended.contains("plate"));
    }

    #[test]
    fn identifier_validation() {
        for ok in ["L", "pole1", "_x", "$total", "bolt_40", "a$b"] {
            assert!(is_valid_identifier(ok), "{ok} should be valid");
        }
        for bad in ["", "1a", "M10*40", "a-b", "a b", "长"] {
            assert!(!is_valid_identifier(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn missing_name_is_none() {
        assert_eq!(Context::new().get("anything"), None);
    }
}
