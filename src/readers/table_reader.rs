use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use csv::{ReaderBuilder, StringRecord};
use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

/// A raw source table: header names plus string cells, nothing interpreted yet
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

/// A located column of a `RawTable`
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    table: &'a RawTable,
    index: usize,
}

impl RawTable {
    /// Parse CSV text. Ragged rows are kept; their absent cells read as missing.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(data.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_column(&self, name: &str) -> Option<Column<'_>> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|index| Column { table: self, index })
    }

    /// Locate a mandatory column; absence is a schema error for `source_name`
    pub fn column(&self, source_name: &str, name: &str) -> Result<Column<'_>> {
        self.find_column(name)
            .ok_or_else(|| ProcessingError::schema(source_name, name))
    }
}

impl<'a> Column<'a> {
    /// Trimmed cell text; empty cells are missing
    pub fn text(&self, row: usize) -> Option<&'a str> {
        self.table
            .rows
            .get(row)
            .and_then(|r| r.get(self.index))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn number(&self, row: usize) -> Option<f64> {
        self.text(row).and_then(parse_number)
    }

    pub fn numbers(&self) -> Vec<Option<f64>> {
        (0..self.table.len()).map(|row| self.number(row)).collect()
    }

    pub fn texts(&self) -> Vec<Option<&'a str>> {
        (0..self.table.len()).map(|row| self.text(row)).collect()
    }
}

/// Numeric cell value. Non-numeric and NaN cells are missing; infinities
/// are passed through for the cleaning stage to discard.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Decode raw bytes as UTF-8 (BOM stripped), falling back to Windows-1252
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text;
    }

    tracing::debug!("Input is not valid UTF-8, decoding as Windows-1252");
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Reads source tables from CSV files or from zip archives holding one CSV
pub struct TableReader {
    use_mmap: bool,
}

impl TableReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read(&self, path: &Path) -> Result<RawTable> {
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        let bytes = if is_zip {
            self.read_zip_entry(path)?
        } else if self.use_mmap {
            self.read_mmap(path)?
        } else {
            self.read_buffered(path)?
        };

        let table = RawTable::from_csv_str(&decode_text(&bytes))?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers().len(),
            "Read source table"
        );
        Ok(table)
    }

    fn read_buffered(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn read_mmap(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(mmap.to_vec())
    }

    /// Read the first `.csv` entry of a zip archive
    fn read_zip_entry(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_file() && entry.name().to_lowercase().ends_with(".csv") {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                return Ok(bytes);
            }
        }

        Err(ProcessingError::InvalidFormat(format!(
            "No CSV file found in archive: {}",
            path.display()
        )))
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}
