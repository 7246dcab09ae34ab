//! Wire types for the Sheets v4 REST API

use crate::process::CellValue;
use serde::{Deserialize, Serialize};

/// `GET spreadsheets/{id}?fields=sheets.properties(sheetId,title)`
#[derive(Debug, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Returned by `values.get`; `values` is absent for an empty range.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Formatted values as strings; numbers and bools are stringified.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(json_to_string).collect())
            .collect()
    }
}

fn json_to_string(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body for `values.update` and `values.append`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeBody<'a> {
    pub range: &'a str,
    pub major_dimension: &'static str,
    pub values: &'a [Vec<CellValue>],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u64>,
}

/// `spreadsheets.batchUpdate` with a single `repeatCell` request.
#[derive(Debug, Serialize)]
pub struct BatchUpdateBody {
    pub requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    RepeatCell(RepeatCellRequest),
}

#[derive(Debug, Serialize)]
pub struct RepeatCellRequest {
    pub range: GridRangeBody,
    pub cell: CellData,
    pub fields: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRangeBody {
    pub sheet_id: i64,
    pub start_row_index: usize,
    pub end_row_index: usize,
    pub start_column_index: usize,
    pub end_column_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_format: CellFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    pub background_color: Color,
}

#[derive(Debug, Serialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// `{"error": {"code": 403, "message": "...", "status": "PERMISSION_DENIED"}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_range_without_values_is_empty() {
        let vr: ValueRange = serde_json::from_value(json!({
            "range": "'dest'!A2:A1000",
            "majorDimension": "ROWS"
        }))
        .unwrap();
        assert!(vr.into_rows().is_empty());
    }

    #[test]
    fn value_range_stringifies_cells() {
        let vr: ValueRange = serde_json::from_value(json!({
            "values": [["a", 1, true], [], [null, "b"]]
        }))
        .unwrap();
        assert_eq!(
            vr.into_rows(),
            vec![
                vec!["a".to_string(), "1".into(), "true".into()],
                vec![],
                vec!["".into(), "b".into()],
            ]
        );
    }

    #[test]
    fn repeat_cell_serialises_like_the_api_expects() {
        let body = BatchUpdateBody {
            requests: vec![Request::RepeatCell(RepeatCellRequest {
                range: GridRangeBody {
                    sheet_id: 7,
                    start_row_index: 10,
                    end_row_index: 12,
                    start_column_index: 0,
                    end_column_index: 17,
                },
                cell: CellData {
                    user_entered_format: CellFormat {
                        background_color: Color {
                            red: 1.0,
                            green: 0.5,
                            blue: 0.0,
                        },
                    },
                },
                fields: "userEnteredFormat.backgroundColor",
            })],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["requests"][0]["repeatCell"]["range"]["endColumnIndex"], 17);
        assert_eq!(
            v["requests"][0]["repeatCell"]["cell"]["userEnteredFormat"]["backgroundColor"]["green"],
            0.5
        );
    }

    #[test]
    fn cell_values_serialise_untagged() {
        let rows = vec![vec![CellValue::text("a"), CellValue::Number(2.5)]];
        let body = ValueRangeBody {
            range: "'d'!A1",
            major_dimension: "ROWS",
            values: &rows,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"range": "'d'!A1", "majorDimension": "ROWS", "values": [["a", 2.5]]})
        );
    }
}
