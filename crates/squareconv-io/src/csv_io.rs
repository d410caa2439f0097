use crate::error::{IoError, IoResult};
use squareconv_core::{Element, SquareMatrix};
use std::io;
use std::path::Path;

/// Read a header-less CSV file into a square matrix.
/// Cells are trimmed; every row must have as many cells as there are rows.
pub fn read_matrix_csv<T: Element>(path: impl AsRef<Path>) -> IoResult<SquareMatrix<T>> {
    let rdr = reader_builder().from_path(path)?;
    collect_matrix(rdr)
}

/// Same as [`read_matrix_csv`], from any reader.
pub fn read_matrix_from<T: Element, R: io::Read>(reader: R) -> IoResult<SquareMatrix<T>> {
    collect_matrix(reader_builder().from_reader(reader))
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // ragged rows are reported as a non-square matrix, not a CSV error
    builder.has_headers(false).trim(csv::Trim::All).flexible(true);
    builder
}

fn collect_matrix<T: Element, R: io::Read>(mut rdr: csv::Reader<R>) -> IoResult<SquareMatrix<T>> {
    let mut rows = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let cells = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                T::parse_str(field).ok_or_else(|| IoError::InvalidCell {
                    row,
                    col,
                    value: field.to_string(),
                })
            })
            .collect::<IoResult<Vec<T>>>()?;
        rows.push(cells);
    }
    Ok(SquareMatrix::from_rows(&rows)?)
}

/// Write a matrix as header-less CSV, one row per line.
pub fn write_matrix_csv<T: Element>(path: impl AsRef<Path>, matrix: &SquareMatrix<T>) -> IoResult<()> {
    let wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    write_rows(wtr, matrix)
}

fn write_rows<T: Element, W: io::Write>(mut wtr: csv::Writer<W>, matrix: &SquareMatrix<T>) -> IoResult<()> {
    for row in matrix.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}
