use crate::domain::model::{ParsedCsv, RawRow};
use crate::utils::error::Result;
use csv::{ReaderBuilder, StringRecord};

const UTF8_BOM: char = '\u{feff}';

fn reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.trim_start_matches(UTF8_BOM).as_bytes())
}

/// 只有單一空白欄位的紀錄才算空行; 全是分隔符的列仍交給後續處理
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

/// Split CSV text into header names and keyed rows.
///
/// The first non-blank line is the header. Header names are trimmed, cell
/// values are kept as written. Data rows whose field count differs from the
/// header are skipped and counted, never fatal. Quoted fields may contain the
/// delimiter and `""` escapes.
pub fn parse_csv(text: &str) -> Result<ParsedCsv> {
    let mut rdr = reader(text);
    let mut records = rdr.records();

    let headers: Vec<String> = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record.iter().map(|name| name.trim().to_string()).collect();
                }
            }
            None => return Ok(ParsedCsv::default()),
        }
    };

    let mut rows = Vec::new();
    let mut skipped_rows = 0;

    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }

        if record.len() != headers.len() {
            skipped_rows += 1;
            tracing::warn!(
                "⚠️ Skipping CSV line {}: expected {} fields, found {}",
                record.position().map(|p| p.line()).unwrap_or_default(),
                headers.len(),
                record.len()
            );
            continue;
        }

        let data = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(RawRow { data });
    }

    tracing::debug!(
        "Parsed CSV: {} columns, {} rows, {} skipped",
        headers.len(),
        rows.len(),
        skipped_rows
    );

    Ok(ParsedCsv {
        headers,
        rows,
        skipped_rows,
    })
}
