/// Format an amount with a currency symbol and thousands separators: ¥1,234.56
pub fn money(symbol: &str, val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}

/// `2024-06-01T09:30` → `06-01 09:30`; anything shorter is returned as-is.
pub fn short_date(date: &str) -> String {
    match (date.get(5..10), date.get(11..16)) {
        (Some(day), Some(time)) => format!("{day} {time}"),
        (Some(day), None) => day.to_string(),
        _ => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money("¥", 1234.56), "¥1,234.56");
        assert_eq!(money("$", -500.00), "-$500.00");
        assert_eq!(money("¥", 0.0), "¥0.00");
        assert_eq!(money("¥", 1000000.99), "¥1,000,000.99");
        assert_eq!(money("€", 42.10), "€42.10");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2024-06-01T09:30"), "06-01 09:30");
        assert_eq!(short_date("2024-06-01"), "06-01");
        assert_eq!(short_date("June"), "June");
    }
}
