use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::spreadsheet::COLUMNS;

pub const TEMPLATE_FILE_NAME: &str = "plantilla_productos.xlsx";
pub const TEMPLATE_SHEET_NAME: &str = "Productos";

enum Example {
    Text(&'static str),
    Number(f64),
}

const EXAMPLE_ROW: [Example; 8] = [
    Example::Text("Camiseta Basica"),
    Example::Text("Algodón premium"),
    Example::Text("Camisetas"),
    Example::Number(59000.0),
    Example::Text("#0000FF"),
    Example::Text("S"),
    Example::Number(10.0),
    Example::Text("camiseta_basica_#0000FF"),
];

/// Шаблон таблицы импорта (xlsx в памяти)
pub fn build_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(TEMPLATE_SHEET_NAME)?;

    for (col, header) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        sheet.set_column_width(col as u16, 18)?;
    }
    for (col, value) in EXAMPLE_ROW.iter().enumerate() {
        match value {
            Example::Text(s) => sheet.write_string(1, col as u16, *s)?,
            Example::Number(n) => sheet.write_number(1, col as u16, *n)?,
        };
    }

    workbook.save_to_buffer()
}
