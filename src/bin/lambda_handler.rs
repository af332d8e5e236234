//! AWS Lambda handler for the returns calculator
//!
//! Accepts an investment (principal, tier, optional plan overrides) as JSON and
//! returns the quote, the payout schedule and, when `months_invested` is given,
//! the early withdrawal outcome.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use chrono::{NaiveDate, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use lending_returns::plan::{InvestmentLimits, PlanConfig, Tier};
use lending_returns::returns::{
    self, effective_annual_yield, next_payment_start, roi_percentage, ScheduleEntry,
    ScheduleSummary, WithdrawalOutcome,
};
use lending_returns::EngineError;

/// Input for a calculation
#[derive(Debug, Deserialize)]
pub struct CalculationRequest {
    pub principal: f64,

    #[serde(default)]
    pub tier: Tier,

    /// First payment date (default: 1st of next month)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Price an early withdrawal after this many months
    #[serde(default)]
    pub months_invested: Option<u32>,

    /// Plan overrides; missing fields use the published offering
    #[serde(default)]
    pub plan: Option<PlanConfig>,

    /// Skip the offering's principal limits (for what-if calculations)
    #[serde(default)]
    pub ignore_limits: bool,
}

/// Output of a calculation
#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    pub success: bool,
    pub plan: PlanConfig,
    pub principal: f64,
    pub tier: Tier,
    pub monthly_return: f64,
    pub annual_return: f64,
    pub annual_roi_pct: f64,
    pub effective_annual_yield_pct: Option<f64>,
    pub summary: ScheduleSummary,
    pub schedule: Vec<ScheduleEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal: Option<WithdrawalOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    errors: Vec<String>,
}

fn calculate(request: &CalculationRequest, today: NaiveDate) -> Result<CalculationResponse, EngineError> {
    let config = request.plan.unwrap_or_default();
    config.validate()?;
    if !request.ignore_limits {
        InvestmentLimits::default().check(request.principal)?;
    }

    let start = match request.start_date {
        Some(date) => date,
        None => next_payment_start(today)?,
    };

    let principal = request.principal;
    let tier = request.tier;
    let monthly_return = returns::monthly_return(principal, &config, tier)?;
    let annual_return = returns::annual_return(principal, &config, tier)?;
    let schedule = returns::build_schedule(principal, &config, tier, start)?;
    let yield_rate = effective_annual_yield(principal, &config, tier)?;

    let withdrawal = request
        .months_invested
        .map(|months| returns::early_withdrawal(principal, &config, tier, months))
        .transpose()?;
    let withdrawal_message = withdrawal.as_ref().map(|w| w.explanation.describe(&config));

    Ok(CalculationResponse {
        success: true,
        plan: config,
        principal,
        tier,
        monthly_return,
        annual_return,
        annual_roi_pct: roi_percentage(principal, annual_return),
        effective_annual_yield_pct: yield_rate.map(|y| y * 100.0),
        summary: schedule.summary(),
        schedule: schedule.entries,
        withdrawal,
        withdrawal_message,
    })
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    let text = serde_json::to_string(body)?;
    Ok(with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(text))?)
}

fn error_response(status: u16, message: &str, errors: Vec<String>) -> Result<Response<Body>, Error> {
    json_response(
        status,
        &ErrorBody {
            success: false,
            message: message.to_string(),
            errors,
        },
    )
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    if event.method().as_str() != "POST" {
        return error_response(405, "Method not allowed", Vec::new());
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: CalculationRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejected request body: {}", e);
            return error_response(400, "Invalid JSON", vec![e.to_string()]);
        }
    };

    match calculate(&request, Utc::now().date_naive()) {
        Ok(response) => {
            info!(
                "Calculated {} schedule for principal {:.2}",
                response.tier, response.principal
            );
            json_response(200, &response)
        }
        Err(EngineError::InvalidArgument(reason)) => {
            error_response(400, "Please correct the errors below", vec![reason])
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn request(json: &str) -> CalculationRequest {
        serde_json::from_str(json).unwrap()
    }

    fn event(method: &str, body: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap(),
            other => panic!("expected a text body, got {:?}", other),
        }
    }

    #[test]
    fn test_default_plan_calculation() {
        let response = calculate(
            &request(r#"{ "principal": 100000, "months_invested": 3 }"#),
            today(),
        )
        .unwrap();

        assert!((response.monthly_return - 2500.0).abs() < 1e-9);
        assert!((response.annual_return - 30_000.0).abs() < 1e-9);
        assert_eq!(response.schedule.len(), 13);
        assert_eq!(
            response.schedule[0].payment_date,
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
        );

        let withdrawal = response.withdrawal.unwrap();
        assert!((withdrawal.net_amount - 105_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_premium_with_plan_override() {
        let response = calculate(
            &request(r#"{ "principal": 100000, "tier": "premium", "plan": { "term_months": 7, "lock_in_months": 3 } }"#),
            today(),
        )
        .unwrap();

        assert!((response.monthly_return - 3000.0).abs() < 1e-9);
        assert_eq!(response.schedule.len(), 7);
        assert!(response.withdrawal.is_none());
    }

    #[test]
    fn test_limits_and_validation() {
        assert!(calculate(&request(r#"{ "principal": 1000 }"#), today()).is_err());
        assert!(calculate(&request(r#"{ "principal": 1000, "ignore_limits": true }"#), today()).is_ok());
        assert!(calculate(
            &request(r#"{ "principal": 100000, "plan": { "monthly_rate": -0.1 } }"#),
            today()
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_preflight_returns_cors_headers() {
        let response = handler(event("OPTIONS", "")).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers()["Access-Control-Allow-Methods"], "POST, OPTIONS");
    }

    #[tokio::test]
    async fn test_non_post_is_rejected() {
        let response = handler(event("GET", "")).await.unwrap();

        assert_eq!(response.status(), 405);
        let body = body_json(&response);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request() {
        let response = handler(event("POST", "{ principal: ")).await.unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        let body = body_json(&response);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid JSON");
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_a_bad_request() {
        let bodies = [
            r#"{ "principal": 1000 }"#,
            r#"{ "principal": 100000, "plan": { "term_months": 4294967295, "lock_in_months": 0 } }"#,
            r#"{ "principal": 100000, "plan": { "monthly_rate": -0.1 } }"#,
        ];
        for json in bodies {
            let response = handler(event("POST", json)).await.unwrap();

            assert_eq!(response.status(), 400, "body {}", json);
            let body = body_json(&response);
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Please correct the errors below");
            assert!(!body["errors"][0].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_valid_post_returns_quote() {
        let response = handler(event(
            "POST",
            r#"{ "principal": 100000, "start_date": "2026-11-01" }"#,
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        let body = body_json(&response);
        assert_eq!(body["success"], true);
        assert_eq!(body["monthly_return"], 2500.0);
        assert_eq!(body["schedule"].as_array().unwrap().len(), 13);
    }
}
