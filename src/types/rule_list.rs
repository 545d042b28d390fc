use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::rule::Rule;
use super::ruleset::RuleSet;
use crate::Error;

/// The editable, ordered list of rules.
///
/// Order is evaluation order: a rule can only see the results of rules before
/// it. Ids are unique. Compile with [`compile()`](Self::compile) to evaluate.
///
/// # Example
///
/// ```
/// use enclosure_calc::{InputTuple, Rule, RuleList};
///
/// let mut rules = RuleList::from_json(r#"[{"id": "pole1", "label": "Poles", "formula": "D ? 4 : 2"}]"#)
///     .unwrap();
/// rules.add(Rule::new("bolt40", "Bolts", "pole1 * 8")).unwrap();
///
/// let record = rules.compile().evaluate_record(&InputTuple::new(6.0, 4.0, true));
/// assert_eq!(record.get("bolt40"), Some(32.0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl Default for RuleList {
    fn default() -> Self {
        Self::defaults()
    }
}

impl RuleList {
    /// The built-in enclosure template.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            rules: crate::defaults::default_rules(),
        }
    }

    /// Build a list from `rules`, applying the same checks as an import.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleSet`] if `rules` is empty, any id or
    /// formula is empty, or an id repeats.
    pub fn new(rules: Vec<Rule>) -> Result<Self, Error> {
        validate(&rules)?;
        Ok(Self { rules })
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.id == id)
    }

    /// Append a rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRuleId`] if the id is already used.
    pub fn add(&mut self, rule: Rule) -> Result<(), Error> {
        if self.get(&rule.id).is_some() {
            return Err(Error::DuplicateRuleId { id: rule.id });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Append a blank `field_<n>` rule with formula `0`, using the smallest
    /// free `n`.
    pub fn add_placeholder(&mut self) -> &Rule {
        let id = (1..)
            .map(|n| format!("field_{n}"))
            .find(|id| self.get(id).is_none())
            .unwrap_or_default();
        self.rules.push(Rule::new(id, "新项目", "0"));
        &self.rules[self.rules.len() - 1]
    }

    /// Replace the rule currently named `id`, keeping its position. The
    /// replacement may carry a new id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleNotFound`] if no rule has `id`, or
    /// [`Error::DuplicateRuleId`] if the new id belongs to another rule.
    pub fn update(&mut self, id: &str, rule: Rule) -> Result<(), Error> {
        let idx = self.position(id).ok_or_else(|| Error::RuleNotFound { id: id.to_owned() })?;
        if rule.id != id && self.get(&rule.id).is_some() {
            return Err(Error::DuplicateRuleId { id: rule.id });
        }
        self.rules[idx] = rule;
        Ok(())
    }

    /// Remove and return the rule named `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleNotFound`] if no rule has `id`.
    pub fn remove(&mut self, id: &str) -> Result<Rule, Error> {
        let idx = self.position(id).ok_or_else(|| Error::RuleNotFound { id: id.to_owned() })?;
        Ok(self.rules.remove(idx))
    }

    /// Discard every edit and go back to the built-in template.
    pub fn reset_to_default(&mut self) {
        *self = Self::defaults();
        info!(rules = self.rules.len(), "rule list reset to defaults");
    }

    /// Replace the whole list. Nothing changes if validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleSet`] under the same conditions as
    /// [`new()`](Self::new).
    pub fn replace(&mut self, rules: Vec<Rule>) -> Result<(), Error> {
        *self = Self::new(rules)?;
        Ok(())
    }

    /// Parse a JSON array of `{id, label, formula}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleSet`] if the text is not such an array, is
    /// empty, or fails validation.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let rules: Vec<Rule> =
            serde_json::from_str(text).map_err(|e| Error::invalid(e.to_string()))?;
        Self::new(rules)
    }

    /// Replace this list with the rules in `text`, all or nothing.
    ///
    /// # Errors
    ///
    /// See [`from_json()`](Self::from_json). On error the list is unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<(), Error> {
        *self = Self::from_json(text)?;
        info!(rules = self.rules.len(), "rule list imported");
        Ok(())
    }

    /// Read and parse a JSON rule file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json()`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }

    /// Write the pretty-printed JSON array to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] or [`Error::Io`].
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parse every formula once, producing an immutable evaluator.
    #[must_use]
    pub fn compile(&self) -> RuleSet {
        crate::compile::compile(&self.rules)
    }
}

fn validate(rules: &[Rule]) -> Result<(), Error> {
    if rules.is_empty() {
        return Err(Error::invalid("rule list is empty"));
    }
    let mut seen = HashSet::new();
    for (idx, rule) in rules.iter().enumerate() {
        if rule.id.is_empty() {
            return Err(Error::invalid(format!("rule {} has no id", idx + 1)));
        }
        if rule.formula.is_empty() {
            return Err(Error::invalid(format!("rule '{}' has no formula", rule.id)));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(Error::invalid(format!("duplicate rule id '{}'", rule.id)));
        }
    }
    Ok(())
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
