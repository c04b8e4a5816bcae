//! Scripted gateway shared by the use case tests.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use async_trait::async_trait;
use fusion_domain::{GenerationOptions, Message, Model, StreamEvent};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// What a scripted model does when called.
#[derive(Clone)]
pub(crate) enum Script {
    Reply(String),
    Fail(GatewayError),
    Delayed(Duration, String),
    Stream(Vec<StreamEvent>),
    /// Emits the events, then keeps the stream open until the consumer
    /// drops it.
    Open(Vec<StreamEvent>),
    /// The call panics inside its task.
    Panic,
}

pub(crate) struct ScriptedGateway {
    scripts: HashMap<String, Script>,
    pub(crate) generate_calls: AtomicUsize,
    pub(crate) stream_calls: AtomicUsize,
    pub(crate) last_messages: Mutex<Option<Vec<Message>>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            generate_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            last_messages: Mutex::new(None),
        }
    }

    pub(crate) fn with(mut self, model: &str, script: Script) -> Self {
        self.scripts.insert(model.to_string(), script);
        self
    }

    pub(crate) fn reply(self, model: &str, text: &str) -> Self {
        self.with(model, Script::Reply(text.to_string()))
    }

    pub(crate) fn fail(self, model: &str, error: GatewayError) -> Self {
        self.with(model, Script::Fail(error))
    }

    /// Deltas for each fragment, closed by a `Completed` with the full text.
    pub(crate) fn stream(self, model: &str, fragments: &[&str]) -> Self {
        let mut events: Vec<StreamEvent> = fragments
            .iter()
            .map(|f| StreamEvent::Delta(f.to_string()))
            .collect();
        events.push(StreamEvent::Completed(fragments.concat()));
        self.with(model, Script::Stream(events))
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }

    fn script_for(&self, model: &Model) -> Result<Script, GatewayError> {
        self.scripts
            .get(model.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::Provider(format!("unknown model {}", model)))
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(
        &self,
        model: &Model,
        messages: &[Message],
        _options: GenerationOptions,
    ) -> Result<String, GatewayError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = Some(messages.to_vec());
        match self.script_for(model)? {
            Script::Reply(text) => Ok(text),
            Script::Fail(error) => Err(error),
            Script::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Script::Stream(events) | Script::Open(events) => {
                StreamHandle::from_events(events).collect_text().await
            }
            Script::Panic => panic!("scripted panic from {}", model),
        }
    }

    async fn generate_streaming(
        &self,
        model: &Model,
        messages: &[Message],
        _options: GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = Some(messages.to_vec());
        match self.script_for(model)? {
            Script::Stream(events) => Ok(StreamHandle::from_events(events)),
            Script::Open(events) => {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                tokio::spawn(async move {
                    for event in events {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    tx.closed().await;
                });
                Ok(StreamHandle::new(rx))
            }
            Script::Reply(text) => Ok(StreamHandle::from_events(vec![StreamEvent::Completed(
                text,
            )])),
            Script::Fail(error) => Err(error),
            Script::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(StreamHandle::from_events(vec![StreamEvent::Completed(text)]))
            }
            Script::Panic => panic!("scripted panic from {}", model),
        }
    }
}
