/// Keys on the amount keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Dot,
    Plus,
    Minus,
    Backspace,
    Clear,
    Equals,
}

impl Key {
    pub fn from_char(c: char) -> Option<Key> {
        match c {
            '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
            '.' => Some(Key::Dot),
            '+' => Some(Key::Plus),
            '-' => Some(Key::Minus),
            '=' => Some(Key::Equals),
            _ => None,
        }
    }
}

fn is_operator(c: char) -> bool {
    c == '+' || c == '-'
}

/// Evaluate a `+`/`-` expression left to right. Runs of operators collapse to
/// the last one, malformed terms count as zero and so does a trailing operator.
pub fn evaluate(expr: &str) -> f64 {
    fn flush(term: &mut String, sign: f64, total: &mut f64) {
        if !term.is_empty() {
            *total += sign * term.parse::<f64>().unwrap_or(0.0);
            term.clear();
        }
    }

    let mut total = 0.0;
    let mut sign = 1.0;
    let mut term = String::new();

    for c in expr.chars().filter(|c| !c.is_whitespace()) {
        if is_operator(c) {
            flush(&mut term, sign, &mut total);
            sign = if c == '-' { -1.0 } else { 1.0 };
        } else {
            term.push(c);
        }
    }
    flush(&mut term, sign, &mut total);

    if total.is_finite() {
        total
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Running expression buffer behind the amount field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmountKeypad {
    buffer: String,
}

impl AmountKeypad {
    pub fn new(initial: &str) -> Self {
        let mut pad = Self::default();
        for c in initial.chars() {
            if let Some(key) = Key::from_char(c) {
                pad.press(key);
            }
        }
        pad
    }

    pub fn display(&self) -> &str {
        &self.buffer
    }

    pub fn value(&self) -> f64 {
        evaluate(&self.buffer)
    }

    fn current_term(&self) -> &str {
        match self.buffer.rfind(is_operator) {
            Some(i) => &self.buffer[i + 1..],
            None => &self.buffer,
        }
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => {
                if self.buffer == "0" {
                    self.buffer.clear();
                }
                self.buffer.push(char::from(b'0' + d.min(9)));
            }
            Key::Dot => {
                if self.current_term().contains('.') {
                    return;
                }
                if self.current_term().is_empty() {
                    self.buffer.push('0');
                }
                self.buffer.push('.');
            }
            Key::Plus | Key::Minus => {
                if self.buffer.is_empty() {
                    return;
                }
                if self.buffer.ends_with(is_operator) {
                    self.buffer.pop();
                }
                self.buffer.push(if key == Key::Plus { '+' } else { '-' });
            }
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Clear => self.buffer.clear(),
            Key::Equals => {
                self.buffer = format!("{}", round2(self.value()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> AmountKeypad {
        AmountKeypad::new(keys)
    }

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(evaluate("12+3.5-1"), 14.5);
        assert_eq!(evaluate("5--3"), 2.0);
        assert_eq!(evaluate("5-+3"), 8.0);
        assert_eq!(evaluate("7+"), 7.0);
        assert_eq!(evaluate(""), 0.0);
        assert_eq!(evaluate("1.2.3+4"), 4.0);
        assert_eq!(evaluate("abc"), 0.0);
        assert_eq!(evaluate(" 10 - 2.5 "), 7.5);
    }

    #[test]
    fn test_operators_collapse_to_last() {
        assert_eq!(typed("5-+-3").display(), "5-3");
        assert_eq!(typed("5+").display(), "5+");
    }

    #[test]
    fn test_leading_operator_ignored() {
        assert_eq!(typed("+-4").display(), "4");
    }

    #[test]
    fn test_single_decimal_point_per_term() {
        assert_eq!(typed("1.2.3").display(), "1.23");
        assert_eq!(typed("1.5+.5").display(), "1.5+0.5");
        assert_eq!(typed("1.5+.5").value(), 2.0);
    }

    #[test]
    fn test_equals_rounds_and_replaces_buffer() {
        let mut pad = typed("12+3.5-1");
        pad.press(Key::Equals);
        assert_eq!(pad.display(), "14.5");

        let mut pad = typed("0.1+0.2");
        pad.press(Key::Equals);
        assert_eq!(pad.display(), "0.3");

        let mut pad = typed("10.005+0");
        pad.press(Key::Equals);
        assert_eq!(pad.value(), round2(10.005));
    }

    #[test]
    fn test_equals_on_zero_then_typing_replaces_zero() {
        let mut pad = typed("3-3");
        pad.press(Key::Equals);
        assert_eq!(pad.display(), "0");
        pad.press(Key::Digit(7));
        assert_eq!(pad.display(), "7");
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut pad = typed("12+");
        pad.press(Key::Backspace);
        assert_eq!(pad.display(), "12");
        pad.press(Key::Clear);
        assert_eq!(pad.display(), "");
        assert_eq!(pad.value(), 0.0);
    }
}
