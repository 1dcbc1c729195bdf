// format.rs
// Display formatting for monetary amounts (South-Asian digit grouping).

/// Monetary fields rendered with Indian grouping in normalized responses.
/// Fields outside this list keep their raw numeric values.
pub const MONEY_FIELDS: [&str; 12] = [
    "price",
    "buyingPrice",
    "quotingPrice",
    "sellingPrice",
    "expectedPrice",
    "saleAmount",
    "total",
    "totalAmount",
    "taxAmount",
    "grandTotal",
    "balanceDue",
    "downPayment",
];

/// Format a number with Indian digit grouping: the last three integer digits
/// form one group, the rest are grouped in pairs (1234567 -> "12,34,567").
/// Sign is preserved and any fractional part is left untouched.
pub fn format_inr(value: f64) -> String {
    let raw = value.to_string();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(tail) => ("-", tail),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rest, None),
    };
    let grouped = group_indian(int_part);
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
