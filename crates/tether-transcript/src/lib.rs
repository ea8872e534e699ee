mod claude;
mod search;

pub use claude::ClaudeExtractor;
pub use search::build_search_text;

use std::collections::HashMap;
use tether_core::Enrichment;

/// Agent-specific view of a raw transcript.
pub trait Extractor {
    /// First message and session name, where the transcript carries them.
    fn enrichment(&self, raw: &str) -> Enrichment;

    /// Conversation text worth indexing, in transcript order.
    fn excerpts(&self, raw: &str) -> Vec<String>;
}

/// Extractors keyed by lowercase agent name.
#[derive(Default)]
pub struct ExtractorRegistry {
    by_agent: HashMap<String, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Registry with every extractor tether ships.
    pub fn builtin() -> Self {
        let mut reg = Self::default();
        reg.register("claude", Box::new(ClaudeExtractor));
        reg.register("claude-code", Box::new(ClaudeExtractor));
        reg
    }

    pub fn register(&mut self, agent: &str, extractor: Box<dyn Extractor>) {
        self.by_agent.insert(agent.to_lowercase(), extractor);
    }

    pub fn get(&self, agent: &str) -> Option<&dyn Extractor> {
        self.by_agent
            .get(&agent.trim().to_lowercase())
            .map(|e| e.as_ref())
    }
}
