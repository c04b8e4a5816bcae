//! Prompt templates for the fan-out/aggregate flow

use crate::fusion::result::FanOutResult;
use crate::session::entities::Message;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Separator placed between reference answers in the synthesis body.
    pub const RESPONSE_SEPARATOR: &'static str = ",";

    /// Default framing instructions for the aggregator model
    pub fn aggregator_system() -> &'static str {
        "You have been provided with a set of responses from various open-source models to the latest user query. \
Your task is to synthesize these responses into a single, high-quality response. \
It is crucial to critically evaluate the information provided in these responses, recognizing that some of it may be biased or incorrect. \
Your response should not simply replicate the given answers but should offer a refined, accurate, and comprehensive reply to the instruction. \
Ensure your response is well-structured, coherent, and adheres to the highest standards of accuracy and reliability. \
Responses from models:"
    }

    /// Messages for one reference call: the prompt as a single user turn.
    pub fn reference_messages(prompt: &str) -> Vec<Message> {
        vec![Message::user(prompt)]
    }

    /// Synthesis body: the text of every succeeded result, in order.
    ///
    /// Failed results are skipped entirely rather than contributing an empty
    /// segment.
    pub fn aggregation_body(results: &[FanOutResult]) -> String {
        results
            .iter()
            .filter(|r| r.succeeded)
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(Self::RESPONSE_SEPARATOR)
    }

    /// Messages for the synthesis call: instructions as system, body as user.
    pub fn aggregation_messages(instructions: &str, results: &[FanOutResult]) -> Vec<Message> {
        vec![
            Message::system(instructions),
            Message::user(Self::aggregation_body(results)),
        ]
    }
}
