//! Delimited text import (CSV and friends). The first row is a header when
//! it names the name column, or at least two distinct known fields;
//! otherwise columns are positional: name, employee number, designation,
//! department, valid till.

use crate::fields::{Field, RawRow, normalize_key};

pub fn parse(input: &str) -> Vec<RawRow> {
  let mut lines = input.lines().filter(|l| !l.trim().is_empty()).peekable();
  let Some(first) = lines.peek() else {
    return Vec::new();
  };
  let delimiter = detect_delimiter(first);

  let first_cells = split_line(first, delimiter);
  let header: Option<Vec<String>> = is_header(&first_cells)
    .then(|| first_cells.iter().map(|c| normalize_key(c)).collect());

  if header.is_some() {
    lines.next();
  }

  lines
    .map(|line| {
      let cells = split_line(line, delimiter);
      let mut row = RawRow::default();
      match &header {
        Some(keys) => {
          for field in Field::ALL {
            let value = field.pick(|alias| {
              let column = keys.iter().position(|k| k == alias)?;
              cells.get(column).cloned()
            });
            if let Some(value) = value {
              row.set(field, value);
            }
          }
        }
        None => {
          for (field, cell) in Field::ALL.into_iter().zip(&cells) {
            row.set(field, cell.as_str());
          }
        }
      }
      row
    })
    .collect()
}

/// A single generic word such as `id` or `title` can be real data, so one
/// alias hit only counts when it is the name column.
fn is_header(cells: &[String]) -> bool {
  let mut named: Vec<Field> = cells.iter().filter_map(|c| Field::from_key(c)).collect();
  named.dedup();
  named.contains(&Field::Name) || named.len() >= 2
}

/// The most frequent of `,`, `;` and tab in the first line.
fn detect_delimiter(line: &str) -> char {
  [',', ';', '\t']
    .into_iter()
    .max_by_key(|d| line.matches(*d).count())
    .unwrap_or(',')
}

/// Split one line, honouring double-quoted cells with `""` escapes.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
  let mut cells = Vec::new();
  let mut cell = String::new();
  let mut quoted = false;
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '"' if quoted && chars.peek() == Some(&'"') => {
        cell.push('"');
        chars.next();
      }
      '"' => quoted = !quoted,
      c if c == delimiter && !quoted => {
        cells.push(std::mem::take(&mut cell).trim().to_owned());
      }
      c => cell.push(c),
    }
  }
  cells.push(cell.trim().to_owned());
  cells
}
