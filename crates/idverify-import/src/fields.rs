//! Field mapping, date parsing and defaulting shared by every format.

use chrono::NaiveDate;
use idverify_core::record::NewRecord;
use rand_core::{OsRng, RngCore as _};

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_DESIGNATION: &str = "Staff";
pub const DEFAULT_DEPARTMENT: &str = "General";

/// Expiry given to rows without a usable date.
pub fn default_valid_till() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default()
}

/// `EMP` followed by four random digits.
pub fn generated_employee_number() -> String {
  format!("EMP{:04}", OsRng.next_u32() % 10_000)
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// The five core fields an import row can carry, in positional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  EmployeeNumber,
  Designation,
  Department,
  ValidTill,
}

impl Field {
  pub const ALL: [Field; 5] = [
    Field::Name,
    Field::EmployeeNumber,
    Field::Designation,
    Field::Department,
    Field::ValidTill,
  ];

  /// Normalised keys accepted for this field, most specific first.
  fn aliases(self) -> &'static [&'static str] {
    match self {
      Field::Name => &["name", "fullname"],
      Field::EmployeeNumber => {
        &["empnumber", "employeenumber", "employeeid", "studentid", "id"]
      }
      Field::Designation => &["designation", "role", "title"],
      Field::Department => &["department", "dept"],
      Field::ValidTill => &["validtill", "validuntil", "expiry"],
    }
  }

  /// The field a column header or object key maps to, if any.
  pub fn from_key(key: &str) -> Option<Field> {
    let key = normalize_key(key);
    Field::ALL
      .into_iter()
      .find(|f| f.aliases().contains(&key.as_str()))
  }

  /// First non-blank value found under any alias, in alias order.
  pub fn pick<F>(self, mut lookup: F) -> Option<String>
  where
    F: FnMut(&str) -> Option<String>,
  {
    self
      .aliases()
      .iter()
      .filter_map(|alias| lookup(alias))
      .map(|v| v.trim().to_owned())
      .find(|v| !v.is_empty())
  }
}

/// Lower-case with spaces, `_` and `-` removed: `Full Name`, `full_name` and
/// `fullName` all become `fullname`.
pub fn normalize_key(key: &str) -> String {
  key
    .chars()
    .filter(|c| !matches!(c, ' ' | '_' | '-'))
    .flat_map(char::to_lowercase)
    .collect()
}

/// `YYYY-MM-DD`, `DD-MM-YYYY` or `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"]
    .into_iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ─── RawRow ──────────────────────────────────────────────────────────────────

/// One imported row before defaulting. Blank values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
  values: [Option<String>; 5],
}

impl RawRow {
  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    let value = value.into().trim().to_owned();
    self.values[field as usize] = (!value.is_empty()).then_some(value);
  }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.values[field as usize].as_deref()
  }

  /// Fill every missing or unusable field with its default.
  ///
  /// Returns the record and how many fields were defaulted.
  pub fn finish(self) -> (NewRecord, usize) {
    let [name, number, designation, department, valid_till] = self.values;
    let mut defaulted = 0;
    let mut or_default = |value: Option<String>, default: fn() -> String| {
      value.unwrap_or_else(|| {
        defaulted += 1;
        default()
      })
    };

    let name = or_default(name, || DEFAULT_NAME.to_owned());
    let employee_number = or_default(number, generated_employee_number);
    let designation = or_default(designation, || DEFAULT_DESIGNATION.to_owned());
    let department = or_default(department, || DEFAULT_DEPARTMENT.to_owned());
    let valid_till = match valid_till.as_deref().and_then(parse_date) {
      Some(date) => date,
      None => {
        defaulted += 1;
        default_valid_till()
      }
    };

    let mut record = NewRecord::new(name, valid_till);
    record.employee_number = employee_number;
    record.designation = designation;
    record.department = department;
    (record, defaulted)
  }
}
