//! Delimited text guest list reader
//!
//! One record per group, cells separated by commas. Cells may be wrapped in
//! double quotes to carry commas or line breaks; a doubled quote inside a
//! quoted cell is a literal quote. Blank lines come back as empty rows and are
//! skipped later by the importer.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;

use crate::error::{PlannerError, PlannerResult};
use crate::traits::RowSource;

/// Why a guest list could not be split into rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelimitedError {
    #[error("unterminated quote starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("unexpected text after closing quote on line {line}")]
    TextAfterQuote { line: usize },
}

/// Row source reading a delimited text file
pub struct DelimitedFileSource {
    path: PathBuf,
    delimiter: char,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl RowSource for DelimitedFileSource {
    async fn read_rows(&self) -> PlannerResult<Vec<Vec<String>>> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| PlannerError::import(format!("cannot read {}: {e}", self.path.display())))?;

        parse_delimited(&content, self.delimiter)
            .map_err(|e| PlannerError::import(format!("{e} of {}", self.path.display())))
    }
}

/// Position inside the cell being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    /// Nothing but whitespace so far
    Start,
    Bare,
    Quoted,
    /// Quoted cell whose closing quote has been read
    Closed,
}

/// Split text into rows of cells
///
/// Line breaks inside a quoted cell belong to the cell. Whitespace between a
/// closing quote and the next delimiter is dropped; any other text there is
/// an error.
pub fn parse_delimited(content: &str, delimiter: char) -> Result<Vec<Vec<String>>, DelimitedError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut state = Cell::Start;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Cell::Quoted => match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => state = Cell::Closed,
                c => {
                    if c == '\n' {
                        line += 1;
                    }
                    cell.push(c);
                }
            },
            _ if c == '\r' && chars.peek() == Some(&'\n') => {}
            _ if c == '\n' => {
                end_row(&mut rows, &mut row, &mut cell, state);
                state = Cell::Start;
                line += 1;
            }
            _ if c == delimiter => {
                row.push(std::mem::take(&mut cell));
                state = Cell::Start;
            }
            Cell::Start if c == '"' => {
                cell.clear();
                state = Cell::Quoted;
                quote_line = line;
            }
            Cell::Start | Cell::Bare => {
                if !c.is_whitespace() {
                    state = Cell::Bare;
                }
                cell.push(c);
            }
            Cell::Closed if c.is_whitespace() => {}
            Cell::Closed => return Err(DelimitedError::TextAfterQuote { line }),
        }
    }

    if state == Cell::Quoted {
        return Err(DelimitedError::UnterminatedQuote { line: quote_line });
    }
    if !(row.is_empty() && cell.is_empty() && state == Cell::Start) {
        end_row(&mut rows, &mut row, &mut cell, state);
    }
    Ok(rows)
}

fn end_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, cell: &mut String, state: Cell) {
    let cell = std::mem::take(cell);
    if row.is_empty() && state != Cell::Closed && cell.trim().is_empty() {
        rows.push(Vec::new());
        return;
    }
    row.push(cell);
    rows.push(std::mem::take(row));
}
