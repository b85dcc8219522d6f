use crate::agents::tools::parameters;
use crate::error::ToolError;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DUCKDUCKGO_API: &str = "https://api.duckduckgo.com/";
const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchArgs {
    /// What to search for.
    pub query: String,
    /// Upper bound on returned results (default 5).
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

/// DuckDuckGo instant answer lookup.
pub struct WebSearch {
    http: reqwest::Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: DUCKDUCKGO_API.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Tool for WebSearch {
    const NAME: &'static str = "web_search";

    type Error = ToolError;
    type Args = WebSearchArgs;
    type Output = Vec<SearchHit>;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web with DuckDuckGo and return titles, snippets and links."
                .to_string(),
            parameters: parameters::<WebSearchArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("empty query".to_string()));
        }
        log::info!("Web search: {}", query);

        let answer: InstantAnswer = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(collect_hits(answer, args.max_results.unwrap_or(DEFAULT_MAX_RESULTS)))
    }
}

fn collect_hits(answer: InstantAnswer, max: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if !answer.answer.is_empty() {
        hits.push(SearchHit {
            title: answer.heading.clone(),
            snippet: answer.answer,
            url: None,
        });
    }
    if !answer.abstract_text.is_empty() {
        hits.push(SearchHit {
            title: answer.heading.clone(),
            snippet: answer.abstract_text,
            url: non_empty(answer.abstract_url),
        });
    }

    let mut stack: Vec<RelatedTopic> = answer.related_topics.into_iter().rev().collect();
    while let Some(topic) = stack.pop() {
        match topic {
            RelatedTopic::Entry { text, first_url } => {
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                hits.push(SearchHit {
                    title,
                    snippet: text,
                    url: non_empty(first_url),
                });
            }
            RelatedTopic::Group { topics } => stack.extend(topics.into_iter().rev()),
        }
    }

    hits.truncate(max);
    hits
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InstantAnswer {
        serde_json::from_value(json!({
            "Heading": "Rust",
            "AbstractText": "Rust is a systems programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "Answer": "",
            "RelatedTopics": [
                {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
                {"Name": "Tools", "Topics": [
                    {"Text": "rustup - toolchain installer", "FirstURL": "https://duckduckgo.com/rustup"}
                ]},
                {"Text": "Ferris - the mascot", "FirstURL": ""}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn flattens_abstract_and_topics_in_order() {
        let hits = collect_hits(sample(), 10);
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].snippet, "Rust is a systems programming language.");
        assert_eq!(hits[1].title, "Cargo");
        assert_eq!(hits[2].title, "rustup");
        assert_eq!(hits[3].url, None);
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(collect_hits(sample(), 2).len(), 2);
    }

    #[test]
    fn empty_answer_yields_nothing() {
        assert!(collect_hits(InstantAnswer::default(), 5).is_empty());
    }

    #[tokio::test]
    async fn rejects_blank_query() {
        let tool = WebSearch::new(reqwest::Client::new());
        let err = tool
            .call(WebSearchArgs { query: " ".into(), max_results: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
