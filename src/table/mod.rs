//! CSV input of links and output of result rows.

pub mod csv;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Header of the output file: source URL, order, kind, value.
pub const OUTPUT_HEADER: [&str; 4] = ["链接", "序号", "类型", "内容"];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("column {column:?} missing from {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("malformed csv at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Text,
    Image,
    /// Placeholder for a link that produced nothing.
    NoContent,
}

impl RowKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "文本",
            Self::Image => "图片",
            Self::NoContent => "无内容",
        }
    }
}

/// One line of the output sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub source_url: String,
    pub order: u32,
    pub kind: RowKind,
    pub value: String,
}

impl ResultRow {
    pub fn no_content(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            order: 0,
            kind: RowKind::NoContent,
            value: String::new(),
        }
    }
}

/// Every value in `column` of the CSV at `path`, in row order. Rows shorter
/// than the column index read as empty.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>, TableError> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = csv::parse(&content)?.into_iter();
    let missing = || TableError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let header = records.next().ok_or_else(missing)?;
    let index = header
        .iter()
        .position(|name| name.trim() == column)
        .ok_or_else(missing)?;

    Ok(records
        .map(|mut record| {
            if index < record.len() {
                record.swap_remove(index)
            } else {
                String::new()
            }
        })
        .collect())
}

/// Write `rows` to `path` under [`OUTPUT_HEADER`], replacing any existing file.
pub fn write_rows(path: &Path, rows: &[ResultRow]) -> Result<(), TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", csv::format_record(&OUTPUT_HEADER)).map_err(io_err)?;
    for row in rows {
        let order = row.order.to_string();
        let record = [
            row.source_url.as_str(),
            order.as_str(),
            row.kind.label(),
            row.value.as_str(),
        ];
        writeln!(writer, "{}", csv::format_record(&record)).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    info!(rows = rows.len(), path = %path.display(), "wrote results");
    Ok(())
}

/// Write a single-column links file that [`read_column`] can read back.
pub fn write_links(path: &Path, column: &str, links: &[String]) -> Result<(), TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", csv::escape(column)).map_err(io_err)?;
    for link in links {
        writeln!(writer, "{}", csv::escape(link)).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    info!(links = links.len(), path = %path.display(), "wrote links");
    Ok(())
}
