//! Search responses and document bodies served by the mock court

use serde_json::{Value, json};

/// Body served for a successfully downloaded document
pub const PDF_BYTES: &[u8] = b"PDFDATA";

/// Storage path shared by the fixture records
pub const FIXTURE_PATH: &str = "2025/09/30/";

/// A verdict record as the search API returns it
pub fn verdict(case_id: u64, file_name: &str) -> Value {
    json!({
        "CaseId": case_id,
        "CaseNum": format!("{}/25", case_id % 10_000),
        "CaseName": "פלוני נ' מדינת ישראל",
        "CaseDesc": "ערעור אזרחי",
        "Type": "פסק-דין",
        "VerdictDt": "/Date(1759276800000)/",
        "VerdictsDtString": "01/10/2025",
        "Year": 2025,
        "PathForWeb": FIXTURE_PATH,
        "FileName": file_name,
        "DocName": file_name,
    })
}

/// Wrap records in the search response envelope
pub fn search_response(records: Vec<Value>) -> Value {
    json!({ "data": records })
}
