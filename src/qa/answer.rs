use serde::{Deserialize, Serialize};

use super::{Assistant, Mode};
use crate::graph::{rank_recommendations, Recommendation, Relation};
use crate::llm::{escape_html, markdown_to_html, ChatMessage, ChatRequest};

const SYSTEM_PROMPT: &str = "You are a frontend technology expert who answers questions \
about web development clearly and accurately.";

const NO_ANSWER_HTML: &str = "<p>Sorry, no answer is available right now.</p>";

/// Reply to `POST /api/qa`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    /// HTML
    pub answer: String,
    pub related_entities: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Longest matched entity; the earliest wins on equal length.
pub fn pick_main_entity(matches: &[String]) -> Option<&str> {
    let mut best: Option<&str> = None;
    for name in matches {
        let longer = best.map_or(true, |b| name.chars().count() > b.chars().count());
        if longer {
            best = Some(name);
        }
    }
    best
}

/// Knowledge-graph context block for the prompt; empty when there are no relations.
pub fn build_context(relations: &[Relation]) -> String {
    if relations.is_empty() {
        return String::new();
    }
    let mut context = String::from("Knowledge graph facts related to the question:\n");
    for rel in relations {
        context.push_str(&format!(
            "- {} {} {} (relevance: {}/10)\n",
            rel.source, rel.relation, rel.target, rel.weight
        ));
    }
    context
}

fn build_messages(question: &str, context: &str, mode: Mode) -> Vec<ChatMessage> {
    let context = if context.is_empty() {
        "(no matching knowledge graph entries)"
    } else {
        context.trim_end()
    };
    let prompt = format!(
        "Answer the question using the context below. If the context has nothing \
         relevant, answer from your own knowledge.\n{}\n\nContext:\n{}\n\nQuestion: {}\n",
        mode.instruction(),
        context,
        question
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Deterministic HTML answer from graph relations, used when the model is unavailable.
pub fn fallback_answer(main_entity: Option<&str>, relations: &[Relation]) -> String {
    let entity = match main_entity {
        Some(e) if !relations.is_empty() => e,
        _ => return NO_ANSWER_HTML.to_string(),
    };

    let mut parts = vec![format!(
        "<h4>Knowledge about \u{201c}{}\u{201d}:</h4>",
        escape_html(entity)
    )];
    for rel in relations {
        parts.push(format!(
            "<p>- {} <strong>{}</strong> {} (relevance: {}/10)</p>",
            escape_html(&rel.source),
            escape_html(&rel.relation),
            escape_html(&rel.target),
            rel.weight
        ));
    }
    parts.join("\n")
}

impl Assistant {
    /// Answer a question with graph context. Never fails: a remote error
    /// yields the fallback answer.
    pub async fn answer(&self, question: &str, mode: Mode) -> QaAnswer {
        let related_entities = self.graph.match_entities(question);
        let main_entity = pick_main_entity(&related_entities).map(str::to_string);
        let relations = main_entity
            .as_deref()
            .map(|e| self.graph.relations(e))
            .unwrap_or_default();

        log::info!(
            "QA ({:?}): {} matched entities, main entity {:?}, {} relations",
            mode,
            related_entities.len(),
            main_entity,
            relations.len()
        );

        let context = build_context(&relations);
        let request = ChatRequest::new(build_messages(question, &context, mode), self.profile(mode));

        let answer = match self.model.complete(&request).await {
            Ok(markdown) => markdown_to_html(&markdown),
            Err(e) => {
                log::warn!("Chat API call failed, using graph fallback: {}", e);
                fallback_answer(main_entity.as_deref(), &relations)
            }
        };

        let recommendations = main_entity
            .as_deref()
            .map(|e| rank_recommendations(e, &relations, self.recommendation_limit))
            .unwrap_or_default();

        QaAnswer {
            answer,
            related_entities,
            recommendations,
        }
    }
}
