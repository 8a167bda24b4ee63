//! In-memory working table shared by every pipeline stage.

use std::collections::HashMap;

use crate::{
    data::{Value, parse_cell},
    error::SurveyError,
};

pub type Cell = Option<Value>;

/// One row per respondent; columns addressed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyFrame {
    headers: Vec<String>,
    lookup: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl SurveyFrame {
    pub fn new(headers: Vec<String>) -> Result<Self, SurveyError> {
        let mut lookup = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            if lookup.insert(header.clone(), idx).is_some() {
                return Err(SurveyError::DuplicateColumn(header.clone()));
            }
        }
        Ok(Self {
            headers,
            lookup,
            rows: Vec::new(),
        })
    }

    /// Builds a frame from raw text records; short records are padded with missing cells.
    pub fn from_records<I>(headers: Vec<String>, records: I) -> Result<Self, SurveyError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut frame = Self::new(headers)?;
        for record in records {
            frame.push_raw_row(&record);
        }
        Ok(frame)
    }

    pub fn push_raw_row(&mut self, record: &[String]) {
        let width = self.headers.len();
        let mut row = Vec::with_capacity(width);
        for idx in 0..width {
            row.push(record.get(idx).and_then(|raw| parse_cell(raw)));
        }
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SurveyError> {
        self.column_index(name)
            .ok_or_else(|| SurveyError::UnknownColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_ref())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column_index(name).and_then(|idx| self.get(row, idx))
    }

    /// Mutable access to one column's cells, row by row.
    pub fn column_cells_mut(&mut self, column: usize) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(column))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), SurveyError> {
        if from == to {
            return Ok(());
        }
        if self.lookup.contains_key(to) {
            return Err(SurveyError::DuplicateColumn(to.to_string()));
        }
        let idx = self
            .lookup
            .remove(from)
            .ok_or_else(|| SurveyError::UnknownColumn(from.to_string()))?;
        self.headers[idx] = to.to_string();
        self.lookup.insert(to.to_string(), idx);
        Ok(())
    }

    /// Removes the named columns that exist and returns how many were dropped.
    pub fn drop_columns(&mut self, names: &[String]) -> usize {
        let mut doomed = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect::<Vec<_>>();
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return 0;
        }
        for idx in doomed.iter().rev() {
            self.headers.remove(*idx);
            for row in &mut self.rows {
                row.remove(*idx);
            }
        }
        self.rebuild_lookup();
        doomed.len()
    }

    /// Appends a derived column; `values` must hold one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) -> Result<usize, SurveyError> {
        if self.lookup.contains_key(name) {
            return Err(SurveyError::DuplicateColumn(name.to_string()));
        }
        debug_assert_eq!(values.len(), self.rows.len());
        let idx = self.headers.len();
        self.headers.push(name.to_string());
        self.lookup.insert(name.to_string(), idx);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(idx)
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), idx))
            .collect();
    }
}
