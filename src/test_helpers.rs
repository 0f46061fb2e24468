//! Shared helpers for unit tests.

use crate::retry::Sleeper;
use crate::types::VerdictRecord;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeper that records requested delays and returns immediately
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// A fully populated record as the search API returns it
pub(crate) fn sample_record(path: &str, file_name: &str) -> VerdictRecord {
    VerdictRecord::from_value(json!({
        "CaseId": 84213,
        "CaseNum": "5123/25",
        "CaseName": "פלוני נ' מדינת ישראל",
        "CaseDesc": "ערעור פלילי",
        "Type": "פסק-דין",
        "VerdictDt": "/Date(1759276800000)/",
        "VerdictsDtString": "01/10/2025",
        "Year": 2025,
        "PathForWeb": path,
        "FileName": file_name,
    }))
}
