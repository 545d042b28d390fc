use std::io::Write;

use tracing::debug;

use crate::{
    aggregate, ColumnLabels, Error, InputTuple, Item, ItemId, RuleList, RuleSet, RuleWarning,
    Table, Totals,
};

/// The working collection of items evaluated against one rule list.
///
/// Every item's results always reflect the current rules: changing the rules
/// recompiles them once and re-evaluates every item in insertion order.
#[derive(Debug, Clone)]
pub struct Worksheet {
    rules: RuleList,
    compiled: RuleSet,
    items: Vec<Item>,
    next_id: u64,
}

impl Default for Worksheet {
    fn default() -> Self {
        Self::new(RuleList::defaults())
    }
}

impl Worksheet {
    #[must_use]
    pub fn new(rules: RuleList) -> Self {
        let compiled = rules.compile();
        Self {
            rules,
            compiled,
            items: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleList {
        &self.rules
    }

    #[must_use]
    pub fn compiled(&self) -> &RuleSet {
        &self.compiled
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Evaluate and append a new item.
    ///
    /// Returns `None` and leaves the sheet untouched when both raw dimensions
    /// are `0`. Otherwise the dimensions are normalized as in
    /// [`InputTuple::new()`].
    pub fn add_item(
        &mut self,
        label: impl Into<String>,
        length: f64,
        width: f64,
        is_enclosed: bool,
    ) -> Option<ItemId> {
        let label = label.into();
        if length == 0.0 && width == 0.0 {
            debug!(%label, "ignoring item with zero length and width");
            return None;
        }

        let input = InputTuple::new(length, width, is_enclosed);
        let id = ItemId(self.next_id);
        self.next_id += 1;
        let report = self.compiled.evaluate(&input);
        debug!(item = %id, %label, %report, "item added");
        self.items.push(Item::new(id, label, input, report));
        Some(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Swap in a new rule list and re-evaluate every item.
    pub fn set_rules(&mut self, rules: RuleList) {
        self.rules = rules;
        self.recompute();
    }

    /// Edit the rule list through `edit`, then re-evaluate every item.
    ///
    /// The edit runs on a copy. If it fails, the rules and all items are left
    /// exactly as they were.
    ///
    /// # Errors
    ///
    /// Whatever `edit` returns.
    pub fn edit_rules<T>(
        &mut self,
        edit: impl FnOnce(&mut RuleList) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut draft = self.rules.clone();
        let out = edit(&mut draft)?;
        self.set_rules(draft);
        Ok(out)
    }

    fn recompute(&mut self) {
        self.compiled = self.rules.compile();
        for item in &mut self.items {
            item.apply(self.compiled.evaluate(item.input()));
        }
        debug!(
            rules = self.compiled.len(),
            items = self.items.len(),
            "items re-evaluated"
        );
    }

    /// Per-rule sums over all items, in rule order.
    #[must_use]
    pub fn totals(&self) -> Totals {
        aggregate(&self.items, self.rules.rules())
    }

    #[must_use]
    pub fn table(&self, labels: &ColumnLabels) -> Table {
        Table::build(&self.items, self.rules.rules(), labels)
    }

    /// Export the sheet as CSV.
    ///
    /// # Errors
    ///
    /// See [`Table::write_csv()`].
    pub fn write_csv<W: Write>(&self, writer: W, labels: &ColumnLabels) -> Result<(), Error> {
        self.table(labels).write_csv(writer)
    }

    /// Formula failures from the latest evaluation of item `id`.
    #[must_use]
    pub fn last_warnings(&self, id: ItemId) -> Option<&[RuleWarning]> {
        self.item(id).map(Item::warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;

    fn sheet() -> Worksheet {
        Worksheet::new(
            RuleList::new(vec![
                Rule::new("pole1", "竖杆1", "D ? 4 : 2"),
                Rule::new("bolt40", "M10*40", "pole1 * 8"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn add_item_evaluates() {
        let mut sheet = sheet();
        let id = sheet.add_item("K11", 6.0, 4.0, true).unwrap();
        let item = sheet.item(id).unwrap();
        assert_eq!(item.results().get("pole1"), Some(4.0));
        assert_eq!(item.results().get("bolt40"), Some(32.0));
        assert!(sheet.last_warnings(id).unwrap().is_empty());
    }

    #[test]
    fn add_item_ignores_zero_size() {
        let mut sheet = sheet();
        assert_eq!(sheet.add_item("empty", 0.0, 0.0, true), None);
        assert!(sheet.items().is_empty());
    }

    #[test]
    fn add_item_normalizes_dimensions() {
        let mut sheet = sheet();
        let id = sheet.add_item("thin", 0.0, 3.7, false).unwrap();
        let input = sheet.item(id).unwrap().input();
        assert_eq!((input.length(), input.width()), (1.0, 3.0));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut sheet = sheet();
        let first = sheet.add_item("a", 1.0, 1.0, true).unwrap();
        sheet.remove_item(first).unwrap();
        let second = sheet.add_item("b", 1.0, 1.0, true).unwrap();
        assert_ne!(first, second);
        assert!(sheet.remove_item(first).is_none());
    }

    #[test]
    fn totals_follow_items() {
        let mut sheet = sheet();
        sheet.add_item("a", 6.0, 4.0, true).unwrap();
        let b = sheet.add_item("b", 6.0, 4.0, false).unwrap();
        assert_eq!(sheet.totals().get("bolt40"), Some(48.0));

        sheet.remove_item(b);
        assert_eq!(sheet.totals().get("bolt40"), Some(32.0));

        sheet.clear();
        assert_eq!(sheet.totals().get("bolt40"), Some(0.0));
    }

    #[test]
    fn editing_rules_re_evaluates_items() {
        let mut sheet = sheet();
        let id = sheet.add_item("a", 6.0, 4.0, true).unwrap();

        sheet
            .edit_rules(|rules| {
                rules.update("bolt40", Rule::new("bolt40", "M10*40", "pole1 * 10"))
            })
            .unwrap();
        assert_eq!(sheet.item(id).unwrap().results().get("bolt40"), Some(40.0));

        sheet
            .edit_rules(|rules| rules.add(Rule::new("nut", "螺母", "bolt40 * 2")))
            .unwrap();
        assert_eq!(sheet.item(id).unwrap().results().get("nut"), Some(80.0));
        assert_eq!(sheet.totals().ids().collect::<Vec<_>>(), ["pole1", "bolt40", "nut"]);
    }

    #[test]
    fn failed_edit_changes_nothing() {
        let mut sheet = sheet();
        let id = sheet.add_item("a", 6.0, 4.0, true).unwrap();
        let before = sheet.rules().clone();

        let err = sheet
            .edit_rules(|rules| {
                rules.remove("pole1")?;
                rules.remove("pole1")
            })
            .unwrap_err();
        assert!(matches!(err, Error::RuleNotFound { .. }));
        assert_eq!(sheet.rules(), &before);
        assert_eq!(sheet.item(id).unwrap().results().get("pole1"), Some(4.0));
    }

    #[test]
    fn broken_rule_surfaces_as_warning() {
        let mut sheet = sheet();
        let id = sheet.add_item("a", 6.0, 4.0, true).unwrap();
        sheet
            .edit_rules(|rules| rules.update("pole1", Rule::new("pole1", "竖杆1", "D ? 4 :")))
            .unwrap();

        let warnings = sheet.last_warnings(id).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule_id, "pole1");
        assert_eq!(sheet.item(id).unwrap().results().get("bolt40"), Some(0.0));
    }

    #[test]
    fn csv_export_matches_table() {
        let mut sheet = sheet();
        sheet.add_item("a", 6.0, 4.0, true).unwrap();
        let mut buf = Vec::new();
        sheet.write_csv(&mut buf, &ColumnLabels::english()).unwrap();
        let expected = sheet.table(&ColumnLabels::english()).to_csv_bytes().unwrap();
        assert_eq!(buf, expected);
    }
}
