//! Sheets v4 REST connector

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::{Result, SheetsError};
use super::types::{
    ApiErrorBody, AppendValuesResponse, BatchUpdateBody, CellData, CellFormat, Color,
    GridRangeBody, RepeatCellRequest, Request, SpreadsheetMeta, ValueRange, ValueRangeBody,
};
use super::{SpreadsheetGateway, Worksheet};
use crate::a1::{self, GridRange};
use crate::auth::{AccessToken, CredentialProvider};
use crate::config::{Rgb, SheetRef};
use crate::process::CellValue;

/// Sheets API base URL
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Values are parsed as if typed by a user, so ISO dates become dates.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Blocking Sheets API client holding one access token for the whole run.
pub struct SheetsClient {
    http: Client,
    base: Url,
    token: AccessToken,
}

impl SheetsClient {
    /// Authenticate once and return a ready client.
    pub fn connect(http: Client, credentials: &dyn CredentialProvider) -> Result<Self> {
        let token = credentials.access_token()?;
        Ok(Self {
            http,
            base: Url::parse(SHEETS_API_BASE)?,
            token,
        })
    }

    /// Default HTTP client with the request timeout applied.
    pub fn http_client() -> Result<Client> {
        Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
    }

    /// `spreadsheets/{id}` followed by `segments`, each percent-encoded.
    fn url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.join("spreadsheets/")?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Malformed("base URL cannot take a path".into()))?
            .pop_if_empty()
            .push(spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, ws: &Worksheet, range: &str, action: Option<&str>) -> Result<Url> {
        let mut segment = a1::quote_tab(&ws.title) + "!" + range;
        if let Some(action) = action {
            segment.push(':');
            segment.push_str(action);
        }
        self.url(&ws.spreadsheet_id, &["values", segment.as_str()])
    }

    fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req
            .header(reqwest::header::AUTHORIZATION, self.token.header_value())
            .send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| match b.error.status {
                Some(s) => format!("{} ({})", b.error.message, s),
                None => b.error.message,
            })
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "Sheets API request failed");
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.send(req)?;
        resp.json::<T>()
            .map_err(|e| SheetsError::Malformed(e.to_string()))
    }
}

impl SpreadsheetGateway for SheetsClient {
    #[instrument(skip_all, fields(spreadsheet = %sheet.spreadsheet_id, tab = %sheet.tab))]
    fn open(&self, sheet: &SheetRef) -> Result<Worksheet> {
        let mut url = self.url(&sheet.spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = self.send_json(self.http.get(url))?;

        let props = meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == sheet.tab)
            .ok_or_else(|| SheetsError::TabNotFound {
                spreadsheet_id: sheet.spreadsheet_id.clone(),
                tab: sheet.tab.clone(),
            })?;
        debug!(sheet_id = props.sheet_id, "opened tab");
        Ok(Worksheet {
            spreadsheet_id: sheet.spreadsheet_id.clone(),
            title: props.title,
            sheet_id: props.sheet_id,
        })
    }

    #[instrument(skip_all, fields(tab = %ws.title, range = %range))]
    fn read_rows(&self, ws: &Worksheet, range: GridRange) -> Result<Vec<Vec<String>>> {
        let mut url = self.values_url(ws, &range.to_a1(), None)?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        let vr: ValueRange = self.send_json(self.http.get(url))?;
        let rows = vr.into_rows();
        debug!(rows = rows.len(), "read rows");
        Ok(rows)
    }

    #[instrument(skip_all, fields(tab = %ws.title, range = %range))]
    fn clear_range(&self, ws: &Worksheet, range: GridRange) -> Result<()> {
        let url = self.values_url(ws, &range.to_a1(), Some("clear"))?;
        self.send(self.http.post(url).json(&serde_json::json!({})))?;
        Ok(())
    }

    #[instrument(skip_all, fields(tab = %ws.title, at = %at, rows = rows.len()))]
    fn write_rows(&self, ws: &Worksheet, at: GridRange, rows: &[Vec<CellValue>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let range = at.on_tab(&ws.title);
        let mut url = self.values_url(ws, &at.to_a1(), None)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        let body = ValueRangeBody {
            range: &range,
            major_dimension: "ROWS",
            values: rows,
        };
        self.send(self.http.put(url).json(&body))?;
        info!(rows = rows.len(), "wrote rows");
        Ok(())
    }

    #[instrument(skip_all, fields(tab = %ws.title, rows = rows.len()))]
    fn append_rows(&self, ws: &Worksheet, rows: &[Vec<CellValue>]) -> Result<GridRange> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let table = GridRange::open_rows(0, 0, width);
        let range = table.on_tab(&ws.title);
        let mut url = self.values_url(ws, &table.to_a1(), Some("append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION)
            .append_pair("insertDataOption", "INSERT_ROWS")
            .append_pair("includeValuesInResponse", "false");
        let body = ValueRangeBody {
            range: &range,
            major_dimension: "ROWS",
            values: rows,
        };
        let resp: AppendValuesResponse = self.send_json(self.http.post(url).json(&body))?;

        let updated = resp
            .updates
            .and_then(|u| u.updated_range)
            .ok_or_else(|| SheetsError::Malformed("append response has no updatedRange".into()))?;
        let written = a1::parse_range(&updated)
            .ok_or_else(|| SheetsError::Malformed(format!("cannot parse range {updated:?}")))?;
        info!(range = %updated, "appended rows");
        Ok(written)
    }

    #[instrument(skip_all, fields(tab = %ws.title, range = %range))]
    fn format_background(&self, ws: &Worksheet, range: GridRange, color: Rgb) -> Result<()> {
        let end_row = range
            .end_row
            .ok_or_else(|| SheetsError::Malformed("formatting needs a bounded range".into()))?;
        let body = BatchUpdateBody {
            requests: vec![Request::RepeatCell(RepeatCellRequest {
                range: GridRangeBody {
                    sheet_id: ws.sheet_id,
                    start_row_index: range.start_row,
                    end_row_index: end_row,
                    start_column_index: range.start_col,
                    end_column_index: range.end_col,
                },
                cell: CellData {
                    user_entered_format: CellFormat {
                        background_color: Color {
                            red: color.red,
                            green: color.green,
                            blue: color.blue,
                        },
                    },
                },
                fields: "userEnteredFormat.backgroundColor",
            })],
        };
        let url = self.url(&format!("{}:batchUpdate", ws.spreadsheet_id), &[])?;
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }

    #[instrument(skip_all, fields(tab = %ws.title, cell = %cell))]
    fn write_cell(&self, ws: &Worksheet, cell: GridRange, value: &str) -> Result<()> {
        self.write_rows(ws, cell, &[vec![CellValue::text(value)]])
    }
}
