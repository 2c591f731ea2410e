use crate::engine::capture::ScreenshotRef;
use crate::engine::outcome::{AutomationResult, Outcome};
use crate::utils::PlateValue;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PlateQuery {
    pub plate: Option<String>,
}

/// Wire envelope for one provider check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub ok: bool,
    pub provider: String,
    pub plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_due: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<ScreenshotSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Page state at the point of failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenshotSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<ScreenshotRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<ScreenshotRef>,
}

impl CheckResponse {
    pub fn from_result(provider: &str, plate: &PlateValue, result: AutomationResult) -> Self {
        let base = Self {
            ok: false,
            provider: provider.to_string(),
            plate: plate.as_str().to_string(),
            has_due: None,
            amount_due: None,
            currency: None,
            result_url: None,
            pay_url: None,
            screenshots: None,
            error: None,
            screenshot: None,
        };

        let shots = result.screenshots;
        match result.outcome {
            Outcome::Due {
                amount_minor,
                currency,
                result_url,
                pay_url,
            } => Self {
                ok: true,
                has_due: Some(true),
                amount_due: amount_minor,
                currency: Some(currency),
                result_url: Some(result_url),
                pay_url: Some(pay_url),
                screenshots: Some(ScreenshotSet {
                    before: shots.before,
                    after: shots.after,
                }),
                ..base
            },
            Outcome::NoDue => Self {
                ok: true,
                has_due: Some(false),
                screenshots: Some(ScreenshotSet {
                    before: shots.before,
                    after: shots.after,
                }),
                ..base
            },
            Outcome::Error { message } => Self {
                error: Some(message),
                screenshot: shots.error,
                ..base
            },
            // Never a final engine result; kept for pollers.
            Outcome::Pending => Self {
                error: Some("check still pending".to_string()),
                ..base
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.ok {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub entry_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub total: usize,
    pub providers: Vec<ProviderInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::outcome::Screenshots;

    #[test]
    fn test_due_response_shape() {
        let result = AutomationResult {
            outcome: Outcome::Due {
                amount_minor: Some(2350),
                currency: "EUR".to_string(),
                result_url: "https://portal.example/r".to_string(),
                pay_url: "https://portal.example/p".to_string(),
            },
            screenshots: Screenshots {
                before: Some(ScreenshotRef("a".to_string())),
                after: Some(ScreenshotRef("b".to_string())),
                error: None,
            },
        };
        let response =
            CheckResponse::from_result("sanef", &PlateValue::new("AB123CD"), result);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["hasDue"], true);
        assert_eq!(json["amountDue"], 2350);
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["screenshots"]["before"], "a");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let result = AutomationResult {
            outcome: Outcome::Error {
                message: "element not found".to_string(),
            },
            screenshots: Screenshots {
                before: None,
                after: None,
                error: Some(ScreenshotRef("err".to_string())),
            },
        };
        let response =
            CheckResponse::from_result("aliae", &PlateValue::new("AB123CD"), result);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "element not found");
        assert_eq!(json["screenshot"], "err");
        assert!(json.get("hasDue").is_none());
    }

    #[test]
    fn test_no_due_response_shape() {
        let result = AutomationResult {
            outcome: Outcome::NoDue,
            screenshots: Screenshots::default(),
        };
        let response =
            CheckResponse::from_result("sanef", &PlateValue::new("AB123CD"), result);
        assert_eq!(response.status(), StatusCode::OK);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["hasDue"], false);
        assert!(json.get("amountDue").is_none());
    }
}
