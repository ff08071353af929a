use crate::utils::error::{CensusError, Result};
use regex::Regex;
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> CensusError {
    CensusError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// 年齡/性別欄位的正規表達式必須包含三個捕獲組: 性別、下限、上限 (可用具名群組 sex/lower/upper)
pub fn validate_age_sex_pattern(field_name: &str, pattern: &str) -> Result<()> {
    let re = Regex::new(pattern)
        .map_err(|e| invalid(field_name, pattern, format!("Invalid regex: {}", e)))?;

    // captures_len 包含整體匹配
    if re.captures_len() < 4 {
        return Err(invalid(
            field_name,
            pattern,
            "Pattern needs three capture groups (sex, lower bound, upper bound)",
        ));
    }
    Ok(())
}

pub fn validate_file_extension(
    field_name: &str,
    file: &str,
    allowed_extensions: &[&str],
) -> Result<()> {
    let extension = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed_extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            file,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        )),
        None => Err(invalid(
            field_name,
            file,
            "File has no extension or invalid filename",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("ratings.endpoint", "https://example.com").is_ok());
        assert!(validate_url("ratings.endpoint", "http://example.com").is_ok());
        assert!(validate_url("ratings.endpoint", "").is_err());
        assert!(validate_url("ratings.endpoint", "invalid-url").is_err());
        assert!(validate_url("ratings.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("import.sample_size", 5, 1).is_ok());
        assert!(validate_positive_number("import.sample_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_age_sex_pattern() {
        assert!(validate_age_sex_pattern("g01.age_sex_pattern", r"^(M|F)_(\d+)_(\d+)$").is_ok());
        assert!(validate_age_sex_pattern("g01.age_sex_pattern", r"^(M|F)_\d+$").is_err());
        assert!(validate_age_sex_pattern("g01.age_sex_pattern", r"^(M|F").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("g01", "2021Census_G01_WA_SA2.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("g01", "DATA.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("g01", "data.txt", &["csv"]).is_err());
        assert!(validate_file_extension("g01", "data", &["csv"]).is_err());
    }
}
