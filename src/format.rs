// 💵 Formatting helpers shared by every host

use crate::calculator::BillSummary;
use crate::ledger::DishEntry;

/// Two decimals with thousands separators: `1234.5` becomes `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.004 rounds to 0.00 and should not print a sign
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Label for picking an entry to remove
pub fn row_label(index: usize, entry: &DishEntry) -> String {
    format!("Row {} - {}", index, entry.name)
}

/// Plain-text table of the current entries
pub fn render_entries(entries: &[DishEntry]) -> String {
    if entries.is_empty() {
        return "No dishes yet.\n".to_string();
    }

    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Dish".len());

    let mut out = format!(
        "{:>3}  {:<name_width$}  {:>12}  {:>6}  {}\n",
        "#",
        "Dish",
        "Price",
        "Split",
        "Names",
        name_width = name_width
    );

    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<name_width$}  {:>12}  {:>6}  {}\n",
            i,
            entry.name,
            format_currency(entry.price),
            entry.split_count(),
            entry.participants.join(", "),
            name_width = name_width
        ));
    }

    out
}

/// Per-person shares followed by the aggregate totals
pub fn render_summary(summary: &BillSummary) -> String {
    let mut out = String::from("Amount each person owes:\n");
    for (person, amount) in &summary.shares {
        out.push_str(&format!("  {}: {}\n", person, format_currency(*amount)));
    }

    out.push('\n');
    out.push_str(&format!("Subtotal:    {}\n", format_currency(summary.subtotal)));
    out.push_str(&format!("Tax:         {}\n", format_currency(summary.tax_amount)));
    out.push_str(&format!("Tip:         {}\n", format_currency(summary.tip_amount)));
    out.push_str(&format!("Grand Total: {}\n", format_currency(summary.grand_total)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ShareCalculator;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(132.00000000000003), "$132.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.5), "-$42.50");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_row_label() {
        let entry = DishEntry::new("Dumplings", 8.0, vec!["A".to_string()]);
        assert_eq!(row_label(3, &entry), "Row 3 - Dumplings");
    }

    #[test]
    fn test_render_entries() {
        let entries = vec![
            DishEntry::new("Pizza", 24.0, vec!["Jason".to_string(), "Celia".to_string()]),
            DishEntry::new("Soda", 3.0, vec!["Jason".to_string()]),
        ];
        let table = render_entries(&entries);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Dish"));
        assert!(lines[1].contains("$24.00"));
        assert!(lines[1].ends_with("Jason, Celia"));
        assert!(lines[2].starts_with("  1  Soda"));

        assert_eq!(render_entries(&[]), "No dishes yet.\n");
    }

    #[test]
    fn test_render_summary() {
        let entries = vec![DishEntry::new("Steak", 100.0, vec!["A".to_string()])];
        let text = render_summary(&ShareCalculator::compute(&entries, 10.0, 20.0));

        assert!(text.contains("  A: $132.00\n"));
        assert!(text.contains("Subtotal:    $100.00\n"));
        assert!(text.contains("Tax:         $10.00\n"));
        assert!(text.contains("Tip:         $22.00\n"));
        assert!(text.contains("Grand Total: $132.00\n"));
    }
}
