use std::io::Write;

use crate::{aggregate, Error, Item, Rule};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Fixed column names and cell texts of the exported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabels {
    pub kind: String,
    pub length: String,
    pub width: String,
    pub enclosed: String,
    pub total: String,
    pub yes: String,
    pub no: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            kind: "工种".into(),
            length: "长".into(),
            width: "宽".into(),
            enclosed: "封闭".into(),
            total: "合计".into(),
            yes: "是".into(),
            no: "否".into(),
        }
    }
}

impl ColumnLabels {
    #[must_use]
    pub fn english() -> Self {
        Self {
            kind: "Type".into(),
            length: "Length".into(),
            width: "Width".into(),
            enclosed: "Enclosed".into(),
            total: "Total".into(),
            yes: "Yes".into(),
            no: "No".into(),
        }
    }
}

/// Items and totals flattened into rows of text cells.
///
/// Four fixed columns come first, then one column per rule in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub totals: Vec<String>,
}

impl Table {
    #[must_use]
    pub fn build<'a>(
        items: impl IntoIterator<Item = &'a Item> + Clone,
        rules: &[Rule],
        labels: &ColumnLabels,
    ) -> Self {
        let mut header = vec![
            labels.kind.clone(),
            labels.length.clone(),
            labels.width.clone(),
            labels.enclosed.clone(),
        ];
        header.extend(rules.iter().map(|r| r.label.clone()));

        let rows = items
            .clone()
            .into_iter()
            .map(|item| {
                let input = item.input();
                let enclosed = if input.is_enclosed() {
                    &labels.yes
                } else {
                    &labels.no
                };
                let mut row = vec![
                    item.label().to_owned(),
                    format_number(input.length()),
                    format_number(input.width()),
                    enclosed.clone(),
                ];
                row.extend(
                    rules
                        .iter()
                        .map(|r| format_number(item.results().value_or_zero(&r.id))),
                );
                row
            })
            .collect();

        let sums = aggregate(items, rules);
        let mut totals = vec![labels.total.clone(), String::new(), String::new(), String::new()];
        totals.extend(sums.iter().map(|(_, v)| format_number(v)));

        Self {
            header,
            rows,
            totals,
        }
    }

    /// Write the table as CSV, prefixed with a UTF-8 byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Csv`] if writing fails.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(UTF8_BOM)?;
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        csv_writer.write_record(&self.header)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.write_record(&self.totals)?;
        csv_writer.flush()?;
        Ok(())
    }

    /// The CSV output as bytes.
    ///
    /// # Errors
    ///
    /// See [`write_csv()`](Self::write_csv).
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }
}

/// Shortest text that reads back as the same number; whole numbers carry no
/// decimal point.
#[must_use]
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InputTuple, ItemId, RuleList};

    fn items(rules: &RuleList) -> Vec<Item> {
        let set = rules.compile();
        [
            ("K11", InputTuple::new(6.0, 4.0, true)),
            ("Weld, east", InputTuple::new(3.0, 2.0, false)),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (label, input))| {
            Item::new(ItemId(i as u64 + 1), label, input, set.evaluate(&input))
        })
        .collect()
    }

    fn rules() -> RuleList {
        RuleList::new(vec![
            Rule::new("pole1", "竖杆1", "D ? 4 : 2"),
            Rule::new("half", "Half", "L / 4"),
        ])
        .unwrap()
    }

    #[test]
    fn table_layout() {
        let rules = rules();
        let items = items(&rules);
        let table = Table::build(&items, rules.rules(), &ColumnLabels::default());

        assert_eq!(table.header, vec!["工种", "长", "宽", "封闭", "竖杆1", "Half"]);
        assert_eq!(table.rows[0], vec!["K11", "6", "4", "是", "4", "1.5"]);
        assert_eq!(table.rows[1], vec!["Weld, east", "3", "2", "否", "2", "0.75"]);
        assert_eq!(table.totals, vec!["合计", "", "", "", "6", "2.25"]);
    }

    #[test]
    fn csv_has_bom_and_quotes() {
        let rules = rules();
        let items = items(&rules);
        let bytes = Table::build(&items, rules.rules(), &ColumnLabels::english())
            .to_csv_bytes()
            .unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Type,Length,Width,Enclosed,竖杆1,Half\n\
             K11,6,4,Yes,4,1.5\n\
             \"Weld, east\",3,2,No,2,0.75\n\
             Total,,,,6,2.25\n"
        );
    }

    #[test]
    fn empty_table_still_has_totals_row() {
        let rules = rules();
        let items: Vec<Item> = Vec::new();
        let table = Table::build(&items, rules.rules(), &ColumnLabels::default());
        assert!(table.rows.is_empty());
        assert_eq!(table.totals, vec!["合计", "", "", "", "0", "0"]);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(32.0), "32");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1234567.0), "1234567");
    }
}
