//! Whitespace-aligned text tables, as produced by copying text out of a PDF
//! report.
//!
//! Rows start after a header line naming Name, Designation and Department.
//! Columns are separated by runs of two or more spaces (or tabs). Blank,
//! `---` and `Total` lines are skipped, as are rows with fewer than three
//! columns.

use std::sync::OnceLock;

use regex::Regex;

use crate::fields::{Field, RawRow};

fn column_gap() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\s{2,}|\t").expect("Invalid regex"))
}

fn date_like() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}|\d{2}[-/]\d{2}[-/]\d{4}").expect("Invalid regex")
  })
}

fn row_number() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"^\d+\s*").expect("Invalid regex"))
}

fn is_header(line: &str) -> bool {
  let lower = line.to_lowercase();
  ["name", "designation", "department"]
    .iter()
    .all(|word| lower.contains(word))
}

fn is_filler(line: &str) -> bool {
  line.is_empty()
    || line.chars().all(|c| c == '-')
    || line.contains("Total")
}

pub fn parse(input: &str) -> Vec<RawRow> {
  let mut started = false;
  let mut rows = Vec::new();

  for line in input.lines().map(str::trim) {
    if is_header(line) {
      started = true;
      continue;
    }
    if !started || is_filler(line) {
      continue;
    }

    let parts: Vec<&str> = column_gap().split(line).map(str::trim).collect();
    if parts.len() < 3 {
      continue;
    }
    rows.push(row_from_parts(&parts));
  }

  rows
}

fn row_from_parts(parts: &[&str]) -> RawRow {
  let mut row = RawRow::default();
  let mut assign = |name: &str, designation: &str, department: &str, valid: &str| {
    row.set(Field::Name, row_number().replace(name, "").trim());
    row.set(Field::Designation, designation);
    row.set(Field::Department, department);
    row.set(Field::ValidTill, valid);
  };

  match parts {
    &[name, designation, department] => assign(name, designation, department, ""),
    &[name, designation, department, valid] => {
      assign(name, designation, department, valid)
    }
    _ => match parts.iter().position(|p| date_like().is_match(p)) {
      Some(at) if at > 0 => assign(parts[0], parts[1], parts[at - 1], parts[at]),
      _ => assign(parts[0], parts[1], parts[2], ""),
    },
  }
  row
}

#[cfg(test)]
mod tests {
  use super::*;

  const REPORT: &str = "\
Staff Register 2024
Name            Designation     Department      Valid Till
---
1 Alice Johnson   Professor       Computer Science   2030-05-30
Bob Lee           Technician      Physics
---
Carol Diaz  Lecturer  Room 4  Maths  31-12-2029
Total: 3
";

  #[test]
  fn parses_rows_after_header() {
    let rows = parse(REPORT);
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].get(Field::Name), Some("Alice Johnson"));
    assert_eq!(rows[0].get(Field::Department), Some("Computer Science"));
    assert_eq!(rows[0].get(Field::ValidTill), Some("2030-05-30"));

    assert_eq!(rows[1].get(Field::Designation), Some("Technician"));
    assert_eq!(rows[1].get(Field::ValidTill), None);
  }

  #[test]
  fn wide_rows_anchor_on_the_date() {
    let rows = parse(REPORT);
    assert_eq!(rows[2].get(Field::Name), Some("Carol Diaz"));
    assert_eq!(rows[2].get(Field::Designation), Some("Lecturer"));
    assert_eq!(rows[2].get(Field::Department), Some("Maths"));
    assert_eq!(rows[2].get(Field::ValidTill), Some("31-12-2029"));
  }

  #[test]
  fn nothing_before_the_header() {
    assert!(parse("Alice  Prof  CS  2030-01-01\n").is_empty());
  }

  #[test]
  fn narrow_rows_are_skipped() {
    let rows = parse("Name  Designation  Department\nJust A Name\n");
    assert!(rows.is_empty());
  }
}
