//! Question answering and learning-path generation over the knowledge graph.
//!
//! Both operations make one remote call and never fail: a remote error is
//! logged and replaced by a deterministic fallback built from the graph.

mod answer;
mod learning_path;

pub use answer::{build_context, fallback_answer, pick_main_entity, QaAnswer};
pub use learning_path::fallback_learning_path;

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::cache::LearningPathCache;
use crate::config::{Config, LlmConfig, ModeProfile};
use crate::graph::KnowledgeGraph;
use crate::llm::ChatModel;

/// Latency/quality selector for answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Quick,
    Deep,
}

impl Mode {
    /// Lenient parse: anything other than "deep" is quick.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("deep") {
            Mode::Deep
        } else {
            Mode::Quick
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Mode::Quick => {
                "Keep the answer short: a few sentences or a compact list, \
                 at most about 150 words."
            }
            Mode::Deep => {
                "Give a thorough, well-structured Markdown answer: explain the \
                 underlying concepts, compare alternatives, and include short code \
                 examples where they help."
            }
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Mode::parse(&raw))
    }
}

/// Graph-backed assistant shared by every request handler.
pub struct Assistant {
    graph: Arc<KnowledgeGraph>,
    model: Arc<dyn ChatModel>,
    quick: ModeProfile,
    deep: ModeProfile,
    learning_path: ModeProfile,
    recommendation_limit: usize,
    path_cache: LearningPathCache,
}

impl Assistant {
    pub fn new(
        graph: Arc<KnowledgeGraph>,
        model: Arc<dyn ChatModel>,
        llm: &LlmConfig,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            graph,
            model,
            quick: llm.quick.clone(),
            deep: llm.deep.clone(),
            learning_path: llm.learning_path.clone(),
            recommendation_limit,
            path_cache: LearningPathCache::new(llm.learning_path_cache_capacity),
        }
    }

    pub fn from_config(graph: Arc<KnowledgeGraph>, model: Arc<dyn ChatModel>, config: &Config) -> Self {
        Self::new(graph, model, &config.llm, config.graph.recommendation_limit)
    }

    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Quick => &self.quick,
            Mode::Deep => &self.deep,
        }
    }

    pub fn recommendation_limit(&self) -> usize {
        self.recommendation_limit
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("deep"), Mode::Deep);
        assert_eq!(Mode::parse(" DEEP "), Mode::Deep);
        assert_eq!(Mode::parse("quick"), Mode::Quick);
        assert_eq!(Mode::parse("turbo"), Mode::Quick);
        assert_eq!(Mode::default(), Mode::Quick);
    }

    #[test]
    fn test_mode_deserialize_lenient() {
        let mode: Mode = serde_json::from_str("\"deep\"").unwrap();
        assert_eq!(mode, Mode::Deep);
        let mode: Mode = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(mode, Mode::Quick);
    }

    #[test]
    fn test_profiles_follow_config() {
        let assistant = test_support::assistant(test_support::StubModel::failing());
        assert_eq!(assistant.profile(Mode::Quick).timeout_secs, 7);
        assert_eq!(assistant.profile(Mode::Deep).timeout_secs, 200);
        assert!(assistant.profile(Mode::Deep).max_tokens > assistant.profile(Mode::Quick).max_tokens);
    }
}
