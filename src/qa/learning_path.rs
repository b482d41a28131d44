use serde_json::{json, Value};

use super::Assistant;
use crate::error::{KgError, Result};
use crate::graph::Relation;
use crate::llm::{strip_code_fences, ChatMessage, ChatRequest};

const SYSTEM_PROMPT: &str = "You are a frontend learning-path planner. You reply with a \
single JSON object and nothing else.";

/// Static learning path returned when the model is unavailable or its reply
/// is not a JSON object.
pub fn fallback_learning_path(entity: &str) -> Value {
    json!({
        "prerequisites": [],
        "core": [{
            "name": entity,
            "description": "Learning path generation is temporarily unavailable. Start with the official documentation."
        }],
        "next_steps": []
    })
}

fn neighbor_lines(relations: &[Relation]) -> String {
    if relations.is_empty() {
        return "- (none recorded)\n".to_string();
    }
    relations
        .iter()
        .map(|r| format!("- {} {} {}\n", r.source, r.relation, r.target))
        .collect()
}

fn build_messages(entity: &str, incoming: &[Relation], outgoing: &[Relation]) -> Vec<ChatMessage> {
    let prompt = format!(
        "Plan a learning path for the frontend topic \"{entity}\".\n\n\
         Concepts that lead into it:\n{}\n\
         Concepts it leads to:\n{}\n\
         Return ONLY a JSON object, without Markdown fences, with exactly these keys:\n\
         - \"prerequisites\": array of {{\"name\", \"reason\"}} to learn before {entity}\n\
         - \"core\": array of {{\"name\", \"description\"}} for the key topics of {entity} itself\n\
         - \"next_steps\": array of {{\"name\", \"reason\"}} to learn afterwards\n\
         Prefer concepts from the lists above when they fit.",
        neighbor_lines(incoming),
        neighbor_lines(outgoing),
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Parse a model reply into a JSON object, tolerating surrounding code fences.
fn parse_reply(reply: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| KgError::Parse(format!("learning path is not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(KgError::Parse("learning path is not a JSON object".to_string()));
    }
    Ok(value)
}

impl Assistant {
    /// Learning path `{prerequisites, core, next_steps}` for an entity.
    /// Successful replies are cached; failures yield the static fallback.
    pub async fn learning_path(&self, entity: &str) -> Value {
        if let Some(cached) = self.path_cache.get(entity) {
            log::debug!("Learning path cache hit for {}", entity);
            return cached;
        }

        let (incoming, outgoing) = self.graph.neighbors(entity);
        let request = ChatRequest::new(build_messages(entity, &incoming, &outgoing), &self.learning_path);

        let parsed = match self.model.complete(&request).await {
            Ok(reply) => parse_reply(&reply),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(path) => {
                self.path_cache.put(entity.to_string(), path.clone());
                path
            }
            Err(e) => {
                log::warn!("Learning path for {} failed, using fallback: {}", entity, e);
                fallback_learning_path(entity)
            }
        }
    }
}
