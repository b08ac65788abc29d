//! Чтение первого листа таблицы импорта в строки `ImportRow`.
//!
//! xlsx / xls / ods читаются через calamine, текстовый файл без сигнатуры
//! офисного формата читается как CSV (`,` или `;`).

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;

use super::error::ImportError;

pub const COLUMNS: [&str; 8] = [
    "name",
    "description",
    "category",
    "price",
    "color_hex",
    "size",
    "quantity",
    "folder_name",
];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Значение ячейки
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Текстовое представление. Целые числа без ".0"
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
        }
    }

    /// Число из ячейки; NaN и бесконечности считаются нечислом
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.replace(',', ".").parse::<f64>().ok()
            }
        };
        n.filter(|n| n.is_finite())
    }

    fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Строка листа: имя колонки -> значение
pub type RawRow = HashMap<String, CellValue>;

/// Одна строка импорта (товар x цвет x размер)
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub color_hex: String,
    pub size: String,
    pub quantity: i32,
    pub folder_name: String,
}

impl ImportRow {
    /// Построить строку. `None` - строка без имени товара (пропускается).
    /// `line` - номер строки в файле для предупреждений
    pub fn from_raw(raw: &RawRow, line: usize, warnings: &mut Vec<String>) -> Option<Self> {
        let text = |key: &str| raw.get(key).map(CellValue::as_text).unwrap_or_default();

        let name = text("name");
        if name.is_empty() {
            warnings.push(format!("Row {}: empty product name, row skipped", line));
            return None;
        }

        let mut number = |key: &str| -> f64 {
            match raw.get(key) {
                None => 0.0,
                Some(cell) if cell.is_empty() => 0.0,
                Some(cell) => cell.as_number().unwrap_or_else(|| {
                    warnings.push(format!(
                        "Row {}: invalid {} '{}', using 0",
                        line,
                        key,
                        cell.as_text()
                    ));
                    0.0
                }),
            }
        };
        let price = number("price");
        let quantity = number("quantity").round() as i32;

        Some(ImportRow {
            name,
            description: text("description"),
            price,
            category: text("category"),
            color_hex: text("color_hex"),
            size: text("size"),
            quantity,
            folder_name: text("folder_name"),
        })
    }
}

/// Результат чтения листа
#[derive(Debug, Default)]
pub struct ParsedSheet {
    /// Непустые строки данных
    pub rows_read: usize,
    pub rows: Vec<ImportRow>,
    pub warnings: Vec<String>,
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Собрать строки по заголовку. Полностью пустые строки пропускаются
fn rows_from_grid(grid: Vec<Vec<CellValue>>) -> Result<Vec<(usize, RawRow)>, ImportError> {
    let mut iter = grid.into_iter();
    let header = iter
        .next()
        .ok_or_else(|| ImportError::Parse("sheet is empty".into()))?;
    let headers: Vec<String> = header.iter().map(|c| normalize_header(&c.as_text())).collect();

    if !headers.iter().any(|h| h == "name") {
        return Err(ImportError::Parse("required column 'name' is missing".into()));
    }

    let rows = iter
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
        .map(|(idx, cells)| {
            let row: RawRow = headers
                .iter()
                .zip(cells)
                .filter(|(h, _)| !h.is_empty())
                .map(|(h, c)| (h.clone(), c))
                .collect();
            // +2: заголовок и нумерация с единицы
            (idx + 2, row)
        })
        .collect();
    Ok(rows)
}

fn read_workbook_grid(bytes: Vec<u8>) -> Result<Vec<Vec<CellValue>>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Parse("workbook has no sheets".into()))?
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect())
}

fn read_csv_grid(text: &str) -> Result<Vec<Vec<CellValue>>, ImportError> {
    let first_line = text.lines().next().unwrap_or_default();
    let delimiter = if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Parse(e.to_string()))?;
        grid.push(
            record
                .iter()
                .map(|s| {
                    if s.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

/// Прочитать первый лист таблицы
pub fn read_sheet(bytes: Vec<u8>) -> Result<Vec<(usize, RawRow)>, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Parse("file is empty".into()));
    }

    let grid = if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        read_workbook_grid(bytes)?
    } else {
        let text = String::from_utf8(bytes)
            .map_err(|_| ImportError::Parse("not a valid spreadsheet".into()))?;
        let text = text.trim_start_matches('\u{feff}');
        if !text.contains(',') && !text.contains(';') {
            return Err(ImportError::Parse("not a valid spreadsheet".into()));
        }
        read_csv_grid(text)?
    };

    rows_from_grid(grid)
}

/// Прочитать таблицу в строки импорта
pub fn parse_rows(bytes: Vec<u8>) -> Result<ParsedSheet, ImportError> {
    let raw_rows = read_sheet(bytes)?;
    let mut sheet = ParsedSheet {
        rows_read: raw_rows.len(),
        ..Default::default()
    };
    for (line, raw) in &raw_rows {
        if let Some(row) = ImportRow::from_raw(raw, *line, &mut sheet.warnings) {
            sheet.rows.push(row);
        }
    }
    Ok(sheet)
}
