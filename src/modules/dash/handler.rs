use super::events::EventRecord;
use super::service::DashService;
use crate::common::response::HandlerResponse;
use crate::state::AppState;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};

/// Lambda entry point. Never returns `Err`: every outcome is a status/body pair.
pub async fn function_handler(
    event: LambdaEvent<Value>,
    state: &AppState,
) -> Result<HandlerResponse, Error> {
    let LambdaEvent { payload, context } = event;
    let span = info_span!("dash", request_id = %context.request_id);

    Ok(handle_event(state, payload).instrument(span).await)
}

pub async fn handle_event(state: &AppState, payload: Value) -> HandlerResponse {
    let record = match EventRecord::from_event(payload) {
        Ok(record) => record,
        Err(e) => {
            error!("Error processing video: {}", e);
            return HandlerResponse::error(&e);
        }
    };

    if let Err(e) = record.validate() {
        warn!(bucket = %record.bucket, key = %record.key, "{}", e);
        return HandlerResponse::error(&e);
    }

    info!(bucket = %record.bucket, key = %record.key, "📦 Received upload");

    match DashService::process(state, &record).await {
        Ok(output) => {
            info!("✅ DASH package ready: {}", output.manifest_url);
            HandlerResponse::success(output)
        }
        Err(e) => {
            error!(bucket = %record.bucket, key = %record.key, "❌ Error processing video: {}", e);
            HandlerResponse::error(&e)
        }
    }
}
