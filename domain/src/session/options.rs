//! Generation options passed alongside every request

use serde::{Deserialize, Serialize};

/// Sampling and transport options for a single generation call.
///
/// `None` leaves the value to the provider's default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

impl GenerationOptions {
    /// Options used for the fan-out calls: temperature 0.7, 512 tokens.
    pub fn reference_defaults() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(512),
            stream: false,
        }
    }

    /// Options used for the synthesis call: provider defaults, streamed.
    pub fn aggregator_defaults() -> Self {
        Self {
            temperature: None,
            max_tokens: None,
            stream: true,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
