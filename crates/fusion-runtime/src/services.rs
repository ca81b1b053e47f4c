//! Optional auxiliary services exposed through the shared context.
//!
//! Both are trait seams: the host decides whether an implementation is
//! available, modules must tolerate their absence.

use anyhow::Result;
use async_trait::async_trait;

/// LLM-backed prompt enhancement.
#[async_trait]
pub trait PromptAssistant: Send + Sync {
    /// Rewrite a user prompt into an enriched one.
    async fn enhance(&self, prompt: &str) -> Result<String>;
}

/// Host resource usage sampling.
pub trait ResourceMonitor: Send + Sync {
    fn sample(&self) -> ResourceSample;
}

/// One point-in-time usage reading, in percent. `gpu` is `None` on hosts
/// without a discrete GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceSample {
    pub cpu: f32,
    pub memory: f32,
    pub gpu: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseAssistant;

    #[async_trait]
    impl PromptAssistant for UppercaseAssistant {
        async fn enhance(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_prompt_assistant_object_safety() {
        let assistant: Box<dyn PromptAssistant> = Box::new(UppercaseAssistant);
        assert_eq!(assistant.enhance("a cat").await.unwrap(), "A CAT");
    }
}
