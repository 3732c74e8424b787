/// `$12,345`: thousands separators, rounded to whole currency units.
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let grouped = group_thousands(&rounded);
    if amount < 0.0 && rounded.bytes().any(|digit| digit != b'0') {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// `12.3%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
