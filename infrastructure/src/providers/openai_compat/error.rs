//! HTTP failure classification

use super::types::{ChatChunk, ErrorEnvelope};
use fusion_application::GatewayError;
use fusion_domain::truncate;
use reqwest::StatusCode;

const MAX_BODY_IN_MESSAGE: usize = 200;

/// Map a non-success HTTP status and its body to a gateway error.
pub fn error_from_status(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(body.trim(), MAX_BODY_IN_MESSAGE)
            )
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::Provider(message),
    }
}

/// Map a transport-level failure.
pub fn error_from_reqwest(err: &reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_decode() {
        GatewayError::InvalidResponse(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Parse one SSE `data:` payload into its text delta.
///
/// `Ok(None)` means the chunk carried no text (role announcements,
/// usage trailers). An in-band `error` object becomes `Err`.
pub fn parse_stream_chunk(data: &str) -> Result<Option<String>, String> {
    let chunk: ChatChunk =
        serde_json::from_str(data).map_err(|e| format!("malformed stream chunk: {}", e))?;

    if let Some(error) = chunk.error {
        return Err(error.message);
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}
