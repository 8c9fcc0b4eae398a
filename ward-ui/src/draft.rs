//! Chuỗi nháp của các ô nhập số: ô hiển thị đúng những gì người dùng gõ,
//! form chỉ nhận giá trị số đọc được từ chuỗi đó.

use std::collections::HashMap;

/// Đọc số từ ô nhập; chấp nhận dấu phẩy thập phân.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberDrafts {
    raw: HashMap<&'static str, String>,
}

impl NumberDrafts {
    /// Chuỗi đang hiển thị trong ô `key`.
    pub fn text(&self, key: &str) -> String {
        self.raw.get(key).cloned().unwrap_or_default()
    }

    /// Ghi chuỗi mới của ô `key`, trả về bản nháp mới và giá trị số của ô.
    pub fn edit(&self, key: &'static str, raw: String) -> (Self, Option<f64>) {
        let value = parse_number(&raw);
        let mut next = self.clone();
        next.raw.insert(key, raw);
        (next, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_decimal_stays_visible_while_typing() {
        let mut drafts = NumberDrafts::default();
        let mut values = Vec::new();
        for key in "36.6".chars() {
            let mut typed = drafts.text("temp");
            typed.push(key);
            let (next, value) = drafts.edit("temp", typed);
            drafts = next;
            values.push(value);
        }

        assert_eq!(drafts.text("temp"), "36.6");
        assert_eq!(values, [Some(3.0), Some(36.0), Some(36.0), Some(36.6)]);
    }

    #[test]
    fn cleared_field_has_no_value() {
        let (drafts, value) = NumberDrafts::default().edit("rr", "18".to_string());
        assert_eq!(value, Some(18.0));
        let (drafts, value) = drafts.edit("rr", String::new());
        assert_eq!(value, None);
        assert_eq!(drafts.text("rr"), "");
        assert_eq!(drafts.text("hr"), "");
    }

    #[test]
    fn comma_decimal_and_garbage() {
        assert_eq!(parse_number(" 7,5 "), Some(7.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
