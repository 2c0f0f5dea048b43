//! Flat per-face label files (`.seg`): integers in face traversal order.

use std::path::Path;

use crate::errors::EngineError;

/// Parse label file text.
///
/// A non-blank line is read as one integer, or failing that as
/// whitespace-separated integers. Blank lines are skipped.
pub fn parse_label_text(text: &str) -> Result<Vec<i64>, EngineError> {
    let mut labels = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = parse_label(line) {
            labels.push(label);
            continue;
        }
        for token in line.split_whitespace() {
            let label = parse_label(token).ok_or_else(|| EngineError::InvalidLabelToken {
                line: i + 1,
                token: token.to_string(),
            })?;
            labels.push(label);
        }
    }
    if labels.is_empty() {
        return Err(EngineError::EmptyResult);
    }
    Ok(labels)
}

/// An integer token. Integers beyond the `i64` range saturate, so they clamp
/// like any other out-of-range label.
fn parse_label(token: &str) -> Option<i64> {
    if let Ok(label) = token.parse::<i64>() {
        return Some(label);
    }
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

pub fn read_label_file(path: &Path) -> Result<Vec<i64>, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    parse_label_text(&text)
}

/// One label per line, newline-terminated.
pub fn format_label_text(labels: &[usize]) -> String {
    let mut out = String::with_capacity(labels.len() * 2);
    for label in labels {
        out.push_str(&label.to_string());
        out.push('\n');
    }
    out
}

pub fn write_label_file(path: &Path, labels: &[usize]) -> Result<(), EngineError> {
    std::fs::write(path, format_label_text(labels)).map_err(|e| EngineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_label_per_line() {
        assert_eq!(parse_label_text("0\n1\n2\n").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn mixed_lines_append_in_order() {
        assert_eq!(parse_label_text("0 1\n2\n").unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_label_text("  3\t4 \n\n5").unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn blank_input_is_empty_result() {
        assert!(matches!(parse_label_text(""), Err(EngineError::EmptyResult)));
        assert!(matches!(parse_label_text("\n  \n\t\n"), Err(EngineError::EmptyResult)));
    }

    #[test]
    fn bad_token_names_its_line() {
        let err = parse_label_text("0\n1 x\n").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidLabelToken { line: 2, ref token } if token == "x"
        ));
    }

    #[test]
    fn negative_labels_survive_parsing() {
        assert_eq!(parse_label_text("-1\n").unwrap(), vec![-1]);
    }

    #[test]
    fn oversized_integers_saturate() {
        let huge = "99999999999999999999999";
        let text = format!("{huge}\n-{huge} 1\n+{huge}\n");
        let raw = parse_label_text(&text).unwrap();
        assert_eq!(raw, vec![i64::MAX, i64::MIN, 1, i64::MAX]);
        let labels = crate::LabelTaxonomy::load_default().clamp_labels(&raw);
        assert_eq!(labels, vec![1, 0, 1, 1]);
    }

    #[test]
    fn sign_without_digits_is_rejected() {
        assert!(matches!(
            parse_label_text("1 -\n"),
            Err(EngineError::InvalidLabelToken { line: 1, .. })
        ));
    }

    #[test]
    fn format_is_one_per_line() {
        assert_eq!(format_label_text(&[2, 0, 1]), "2\n0\n1\n");
        assert_eq!(format_label_text(&[]), "");
    }
}
