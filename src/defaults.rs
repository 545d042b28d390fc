//! Built-in enclosure template.

use crate::Rule;

/// `(id, label, formula)` for every default rule, in dependency order.
pub const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    ("plate", "洞洞板1", "D ? (L+W)*2-2 : (L+W)*2-MAX(L,W)"),
    ("pole1", "竖杆1", "D ? 4 : 2"),
    (
        "midPole",
        "中间杆",
        "(L>3 ? INT((L-1)/2)*2 : 0) + (W>3 ? INT((W-1)/2)*2 : 0) - (D ? 0 : INT((MAX(L,W)-1)/2))",
    ),
    ("openPole", "开放立杆", "D ? 0 : 1"),
    ("doorFrame", "门框", "D ? 1 : 0"),
    ("wall", "一体墙", "1"),
    (
        "rib1",
        "加强筋",
        "D ? ((L+W-2)*2 - midPole - doorFrame) : ((L+W-2)*2 - midPole - (MAX(L,W)-1))",
    ),
    ("rib2", "加强筋2", "midPole"),
    ("ribL", "L型筋", "D ? 3 : 2"),
    ("bolt40", "M10*40", "pole1 * 8"),
    (
        "bolt60",
        "M10*60",
        "D ? ((L+W-2)*2 - midPole)*4 : ((L+W-2)*2 - MAX(L,W) + 1 - midPole)*4",
    ),
    ("bolt100", "M10*100", "midPole * 4"),
    ("nut", "螺母", "bolt40 + bolt60 + bolt100"),
    ("screw", "燕尾丝", "(rib1 + rib2 + ribL) * 6"),
];

pub(crate) fn default_rules() -> Vec<Rule> {
    DEFAULT_RULES
        .iter()
        .map(|(id, label, formula)| Rule::new(*id, *label, *formula))
        .collect()
}
