//! Entity and relationship extraction from text
//!
//! One extraction call sends a single chunk to the configured
//! text-generation provider under a fixed prompt contract and parses the
//! response into a [`KnowledgeGraph`] fragment.
//!
//! ## Partial-failure policy
//!
//! [`GraphExtractor::extract`] never fails: provider errors, timeouts, and
//! unparseable responses all degrade to an empty fragment and are logged
//! with `warn!`. One bad chunk must never abort processing of the rest of
//! a document.
//!
//! ## Leniency
//!
//! Individual entities or relationships missing a required field are
//! dropped from the fragment; property values outside the closed
//! [`PropertyValue`] scalar set are dropped per key. The rest of the
//! fragment is kept.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use graphsmith_core::graph::{Entity, KnowledgeGraph, Properties, PropertyValue, Relationship};
use graphsmith_core::traits::llm::TextGenerationProvider;

/// Instruction prompt for knowledge-graph extraction. `{text}` is replaced
/// with the chunk content.
const EXTRACTION_PROMPT: &str = r#"You are an expert at extracting entities and relationships from text to build a knowledge graph.

Given the following text, extract:
1. Entities: important concepts, objects, people, organizations, or any significant nouns
2. Relationships: connections between entities

Text:
{text}

Output the result as a valid JSON object with this structure:
{
  "entities": [
    {
      "name": "entity name",
      "type": "entity type (e.g. Person, Organization, Concept, Location)",
      "properties": {}
    }
  ],
  "relationships": [
    {
      "source": "source entity name",
      "target": "target entity name",
      "type": "relationship type (e.g. works_for, located_in, related_to)",
      "properties": {}
    }
  ]
}

Important:
- Extract only entities that are explicitly mentioned or strongly implied
- Entity names should be concise and standardized
- Relationship types should be clear and descriptive
- Source and target entity names must match names in the entities list exactly
- Return ONLY the JSON object, no additional text

JSON Output:"#;

/// Extracts knowledge-graph fragments from text chunks via a
/// text-generation provider.
pub struct GraphExtractor {
    provider: Arc<dyn TextGenerationProvider>,
    fence: Regex,
}

impl GraphExtractor {
    /// Create an extractor backed by the given provider.
    pub fn new(provider: Arc<dyn TextGenerationProvider>) -> Self {
        Self {
            provider,
            // Optional ```json ... ``` wrapper around the payload.
            fence: Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```")
                .expect("fence regex is valid"),
        }
    }

    /// Extract entities and relationships from one chunk of text.
    ///
    /// Always returns a fragment; failures degrade to an empty one.
    pub async fn extract(&self, text: &str) -> KnowledgeGraph {
        let prompt = EXTRACTION_PROMPT.replace("{text}", text);

        let response = match self.provider.generate(&prompt).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    provider = self.provider.provider_name(),
                    %error,
                    "Extraction call failed, returning empty fragment"
                );
                return KnowledgeGraph::new();
            }
        };

        match self.parse_response(&response) {
            Some(graph) => {
                debug!(
                    entities = graph.entities.len(),
                    relationships = graph.relationships.len(),
                    "Extracted fragment"
                );
                graph
            }
            None => {
                warn!(
                    provider = self.provider.provider_name(),
                    response_len = response.len(),
                    "Unparseable extraction response, returning empty fragment"
                );
                KnowledgeGraph::new()
            }
        }
    }

    /// Extract fragments for a batch of chunks, one call per chunk.
    ///
    /// The result has the same length and order as the input; each element
    /// obeys the single-chunk contract independently.
    pub async fn extract_batch(&self, texts: &[String]) -> Vec<KnowledgeGraph> {
        let mut fragments = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            debug!(chunk = index + 1, total = texts.len(), "Extracting chunk");
            fragments.push(self.extract(text).await);
        }
        fragments
    }

    /// Parse a raw model response into a fragment.
    ///
    /// Strips an optional fenced code block, then parses the JSON object
    /// leniently: invalid elements are dropped, not fatal.
    fn parse_response(&self, raw: &str) -> Option<KnowledgeGraph> {
        let content = raw.trim();
        let content = match self.fence.captures(content) {
            Some(captures) => captures.get(1)?.as_str(),
            None => content,
        };

        let value: serde_json::Value = serde_json::from_str(content).ok()?;

        let entities = value
            .get("entities")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_entity).collect())
            .unwrap_or_default();

        let relationships = value
            .get("relationships")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_relationship).collect())
            .unwrap_or_default();

        Some(KnowledgeGraph {
            entities,
            relationships,
        })
    }
}

fn parse_entity(value: &serde_json::Value) -> Option<Entity> {
    let name = non_empty_str(value.get("name")?)?;
    let entity_type = non_empty_str(value.get("type")?)?;
    Some(Entity {
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        properties: parse_properties(value.get("properties")),
        embedding: None,
    })
}

fn parse_relationship(value: &serde_json::Value) -> Option<Relationship> {
    let source = non_empty_str(value.get("source")?)?;
    let target = non_empty_str(value.get("target")?)?;
    let rel_type = non_empty_str(value.get("type")?)?;
    Some(Relationship {
        source: source.to_string(),
        target: target.to_string(),
        rel_type: rel_type.to_string(),
        properties: parse_properties(value.get("properties")),
    })
}

fn non_empty_str(value: &serde_json::Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn parse_properties(value: Option<&serde_json::Value>) -> Properties {
    let mut properties = Properties::new();
    let Some(object) = value.and_then(|v| v.as_object()) else {
        return properties;
    };
    for (key, raw) in object {
        match PropertyValue::from_json(raw) {
            Some(parsed) => {
                properties.insert(key.clone(), parsed);
            }
            None => {
                debug!(key = key.as_str(), "Dropping non-scalar property value");
            }
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockTextProvider;

    fn extractor_with(provider: MockTextProvider) -> (GraphExtractor, Arc<MockTextProvider>) {
        let provider = Arc::new(provider);
        (GraphExtractor::new(provider.clone()), provider)
    }

    const VALID_RESPONSE: &str = r#"{
        "entities": [
            {"name": "Alice", "type": "Person", "properties": {"age": 30}},
            {"name": "Acme", "type": "Organization", "properties": {}}
        ],
        "relationships": [
            {"source": "Alice", "target": "Acme", "type": "works_for", "properties": {}}
        ]
    }"#;

    #[tokio::test]
    async fn extracts_entities_and_relationships() {
        let provider = MockTextProvider::new();
        provider.push_response(VALID_RESPONSE);
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("Alice works for Acme.").await;

        assert_eq!(graph.entities.len(), 2);
        assert_eq!(graph.entities[0].name, "Alice");
        assert_eq!(graph.entities[0].entity_type, "Person");
        assert_eq!(
            graph.entities[0].properties.get("age"),
            Some(&PropertyValue::Number(30.0))
        );
        assert_eq!(graph.relationships.len(), 1);
        assert_eq!(graph.relationships[0].rel_type, "works_for");
    }

    #[tokio::test]
    async fn chunk_text_is_embedded_in_the_prompt() {
        let provider = MockTextProvider::new();
        let (extractor, provider) = extractor_with(provider);

        extractor.extract("a very specific chunk marker").await;

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("a very specific chunk marker"));
        assert!(prompts[0].contains("knowledge graph"));
    }

    #[tokio::test]
    async fn fenced_response_is_unwrapped() {
        let provider = MockTextProvider::new();
        provider.push_response(format!("```json\n{}\n```", VALID_RESPONSE));
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        assert_eq!(graph.entities.len(), 2);
    }

    #[tokio::test]
    async fn bare_fence_is_unwrapped_too() {
        let provider = MockTextProvider::new();
        provider.push_response(format!("```\n{}\n```", VALID_RESPONSE));
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        assert_eq!(graph.entities.len(), 2);
    }

    #[tokio::test]
    async fn unparseable_response_degrades_to_empty_fragment() {
        let provider = MockTextProvider::new();
        provider.push_response("I'm sorry, I can't produce JSON today.");
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty_fragment() {
        let provider = MockTextProvider::new();
        provider.push_failure("timeout");
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn invalid_elements_are_dropped_not_fatal() {
        let provider = MockTextProvider::new();
        provider.push_response(
            r#"{
                "entities": [
                    {"name": "Kept", "type": "Concept"},
                    {"name": "NoType"},
                    {"type": "NoName"},
                    {"name": "", "type": "Empty"}
                ],
                "relationships": [
                    {"source": "Kept", "target": "Other", "type": "rel"},
                    {"source": "MissingTarget", "type": "rel"}
                ]
            }"#,
        );
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        assert_eq!(graph.entities.len(), 1);
        assert_eq!(graph.entities[0].name, "Kept");
        assert_eq!(graph.relationships.len(), 1);
    }

    #[tokio::test]
    async fn non_scalar_properties_are_dropped_per_key() {
        let provider = MockTextProvider::new();
        provider.push_response(
            r#"{
                "entities": [
                    {
                        "name": "E",
                        "type": "T",
                        "properties": {
                            "kept": "yes",
                            "count": 3,
                            "flag": false,
                            "vec": [1.0, 2.0],
                            "nested": {"dropped": true},
                            "nullish": null
                        }
                    }
                ],
                "relationships": []
            }"#,
        );
        let (extractor, _) = extractor_with(provider);

        let graph = extractor.extract("text").await;
        let props = &graph.entities[0].properties;
        assert_eq!(props.len(), 4);
        assert_eq!(props.get("kept"), Some(&PropertyValue::Text("yes".into())));
        assert_eq!(props.get("count"), Some(&PropertyValue::Number(3.0)));
        assert_eq!(props.get("flag"), Some(&PropertyValue::Bool(false)));
        assert_eq!(
            props.get("vec"),
            Some(&PropertyValue::Vector(vec![1.0, 2.0]))
        );
        assert!(!props.contains_key("nested"));
        assert!(!props.contains_key("nullish"));
    }

    #[tokio::test]
    async fn batch_preserves_order_and_isolates_failures() {
        let provider = MockTextProvider::new();
        provider.push_response(VALID_RESPONSE);
        provider.push_failure("connection reset");
        provider.push_response(VALID_RESPONSE);
        let (extractor, provider) = extractor_with(provider);

        let chunks = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let fragments = extractor.extract_batch(&chunks).await;

        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].entities.len(), 2);
        assert!(fragments[1].is_empty());
        assert_eq!(fragments[2].entities.len(), 2);
        assert_eq!(provider.call_count(), 3);
    }
}
