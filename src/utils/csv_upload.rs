//! CSV 上传的读取与表头解析，供用户与学生导入共用

use std::collections::HashMap;
use std::io::Cursor;

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::errors::{Result, SchoolSystemError};

/// 从 multipart 请求中读取名为 `file` 的字段
pub async fn read_file_field(payload: &mut Multipart, max_bytes: usize) -> Result<Vec<u8>> {
    let mut file_bytes = Vec::new();
    let mut found = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            SchoolSystemError::csv_format(format!("Failed to read multipart field: {e}"))
        })?;

        if field.name() != Some("file") {
            continue;
        }
        found = true;

        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| {
                SchoolSystemError::csv_format(format!("Failed to read upload data: {e}"))
            })?;
            if file_bytes.len() + data.len() > max_bytes {
                return Err(SchoolSystemError::csv_format(format!(
                    "Uploaded file exceeds {max_bytes} bytes"
                )));
            }
            file_bytes.extend_from_slice(&data);
        }
    }

    if !found {
        return Err(SchoolSystemError::csv_format("Missing multipart field 'file'"));
    }
    Ok(file_bytes)
}

/// 一行 CSV 数据，按小写表头取值
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 文件中的行号（表头为第 1 行）
    pub line: usize,
    values: HashMap<String, String>,
}

impl CsvRow {
    /// 取值并去掉首尾空白；缺失或空串返回 None
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_or_empty(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
}

/// 解析带表头的 CSV，并检查必需列
pub fn parse_rows(data: &[u8], required: &[&str]) -> Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(SchoolSystemError::csv_format(format!(
                "Missing required column: {column}"
            )));
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let values = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(CsvRow {
            line: index + 2,
            values,
        });
    }

    Ok(rows)
}

/// 把若干行写成 CSV 字节
pub fn write_csv<I, R>(header: &[&str], rows: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SchoolSystemError::csv_format(format!("Failed to flush CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_with_bom_and_blank_lines() {
        let data = "\u{feff}Username,Email,Password\nalice1,a@x.io, Secret123 \n,,\nbob_22,b@x.io,Pw123456\n";
        let rows = parse_rows(data.as_bytes(), &["username", "email"]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].get("password"), Some("Secret123"));
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].get("full_name"), None);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = parse_rows(b"username,email\na,b\n", &["password"]).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_write_csv_quotes_commas() {
        let bytes = write_csv(
            &["name", "note"],
            vec![vec!["Ana".to_string(), "a, b".to_string()]],
        )
        .unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name,note\nAna,\"a, b\"\n");
    }
}
