//! Just enough RFC 4180 for a links column in and result rows out.

use crate::table::TableError;

pub fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|value| escape(value.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a whole document into records. Quoted fields may span lines; a
/// leading UTF-8 BOM is ignored; blank lines are skipped.
pub fn parse(input: &str) -> Result<Vec<Vec<String>>, TableError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Whether the current field started with a quote, so an empty quoted
    // field still counts as a field.
    let mut quoted = false;
    let mut line = 1usize;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            '"' => {
                return Err(TableError::Malformed {
                    line,
                    reason: "stray quote inside unquoted field".to_string(),
                });
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                end_record(&mut records, &mut record, &mut field, quoted);
                quoted = false;
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError::Malformed {
            line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    end_record(&mut records, &mut record, &mut field, quoted);

    Ok(records)
}

fn end_record(
    records: &mut Vec<Vec<String>>,
    record: &mut Vec<String>,
    field: &mut String,
    quoted: bool,
) {
    if record.is_empty() && field.is_empty() && !quoted {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}
