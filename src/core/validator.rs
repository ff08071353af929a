use crate::config::toml_config::ImportConfig;
use crate::core::csv_reader;
use crate::domain::model::{TableType, ValidationReport};
use std::collections::HashSet;

/// True iff every required column for `table` appears in `headers`.
/// Extra columns and ordering are ignored; an empty header list never passes.
pub fn validate_structure(headers: &[String], table: TableType, config: &ImportConfig) -> bool {
    missing_columns(headers, table, config).is_empty() && !headers.is_empty()
}

fn missing_columns(headers: &[String], table: TableType, config: &ImportConfig) -> Vec<String> {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    config
        .required_columns(table)
        .into_iter()
        .filter(|column| !present.contains(column))
        .map(str::to_string)
        .collect()
}

/// Human-readable reason the headers fail the check, `None` when they pass.
pub fn failure_reason(
    headers: &[String],
    table: TableType,
    config: &ImportConfig,
) -> Option<String> {
    if headers.is_empty() {
        return Some("file is empty or has no header row".to_string());
    }

    let missing = missing_columns(headers, table, config);
    if missing.is_empty() {
        None
    } else {
        Some(format!(
            "missing required {} column(s): {}",
            table,
            missing.join(", ")
        ))
    }
}

/// Structural check of a whole CSV text. Failures are reported, never raised.
pub fn check_structure(text: &str, table: TableType, config: &ImportConfig) -> ValidationReport {
    let parsed = match csv_reader::parse_csv(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return ValidationReport {
                table,
                valid: false,
                headers: Vec::new(),
                missing_columns: Vec::new(),
                data_rows: 0,
                reason: Some(format!("file is not readable CSV: {}", e)),
            }
        }
    };

    let missing = missing_columns(&parsed.headers, table, config);
    let reason = failure_reason(&parsed.headers, table, config);

    if let Some(reason) = &reason {
        tracing::info!("❌ {} validation failed: {}", table, reason);
    } else {
        tracing::info!(
            "✅ {} header valid ({} columns, {} data rows)",
            table,
            parsed.headers.len(),
            parsed.rows.len()
        );
    }

    ValidationReport {
        table,
        valid: reason.is_none(),
        headers: parsed.headers,
        missing_columns: missing,
        data_rows: parsed.rows.len(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_required_set_in_any_order_with_extras() {
        let config = ImportConfig::default();

        assert!(validate_structure(
            &headers(&["SA2_CODE", "Tot_P", "M_15_19", "F_15_19"]),
            TableType::G01,
            &config
        ));
        assert!(validate_structure(
            &headers(&["F_15_19", "Extra", "Tot_P", "M_0_4", "SA2_CODE", "M_15_19"]),
            TableType::G01,
            &config
        ));
    }

    #[test]
    fn test_missing_any_required_column_fails() {
        let config = ImportConfig::default();
        let full = ["SA2_CODE", "Tot_P", "M_15_19", "F_15_19"];

        for skip in 0..full.len() {
            let partial: Vec<&str> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, c)| *c)
                .collect();
            assert!(
                !validate_structure(&headers(&partial), TableType::G01, &config),
                "should fail without {}",
                full[skip]
            );
        }
    }

    #[test]
    fn test_empty_headers_fail() {
        let config = ImportConfig::default();
        assert!(!validate_structure(&[], TableType::G01, &config));
        assert!(!validate_structure(&[], TableType::G02, &config));
    }

    #[test]
    fn test_g02_schema_differs_from_g01() {
        let config = ImportConfig::default();
        let g02 = headers(&[
            "SA2_CODE",
            "Median_age_persons",
            "Median_tot_hhd_inc_weekly",
            "Median_rent_weekly",
        ]);

        assert!(validate_structure(&g02, TableType::G02, &config));
        assert!(!validate_structure(&g02, TableType::G01, &config));
    }

    #[test]
    fn test_check_structure_reports_missing_columns() {
        let config = ImportConfig::default();
        let report = check_structure("SA2_CODE,Tot_P\n1,2\n", TableType::G01, &config);

        assert!(!report.valid);
        assert_eq!(report.missing_columns, vec!["M_15_19", "F_15_19"]);
        assert_eq!(report.data_rows, 1);
        assert!(report.reason.unwrap().contains("M_15_19, F_15_19"));
    }

    #[test]
    fn test_check_structure_empty_file() {
        let config = ImportConfig::default();
        let report = check_structure("", TableType::G02, &config);

        assert!(!report.valid);
        assert_eq!(report.reason.as_deref(), Some("file is empty or has no header row"));
    }

    #[test]
    fn test_check_structure_valid() {
        let config = ImportConfig::default();
        let report = check_structure(
            "SA2_CODE,Tot_P,M_15_19,F_15_19\n123456789,500,40,35\n",
            TableType::G01,
            &config,
        );

        assert!(report.valid);
        assert!(report.reason.is_none());
        assert!(report.missing_columns.is_empty());
        assert_eq!(report.data_rows, 1);
    }
}
