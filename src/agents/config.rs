use crate::agents::tools::ToolKind;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    /// Pinned model; `None` means the configured default model.
    pub model: Option<String>,
    pub instructions: Vec<String>,
    pub tools: Vec<ToolKind>,
}

impl AgentConfig {
    fn preset(
        id: &str,
        name: &str,
        emoji: &str,
        description: &str,
        model: Option<&str>,
        tools: &[ToolKind],
        instructions: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            emoji: emoji.to_string(),
            model: model.map(str::to_string),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
            tools: tools.to_vec(),
        }
    }

    pub fn resolve_model(&self, default_model: &str) -> String {
        self.model.clone().unwrap_or_else(|| default_model.to_string())
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.to_string()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub mode: String,
    pub model: Option<String>,
    /// Member agent ids, in delegation order.
    pub members: Vec<String>,
    pub instructions: Vec<String>,
}

impl TeamConfig {
    pub fn resolve_model(&self, default_model: &str) -> String {
        self.model.clone().unwrap_or_else(|| default_model.to_string())
    }

    /// Tool-less agent that merges member answers.
    pub fn coordinator(&self) -> AgentConfig {
        AgentConfig {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            emoji: self.emoji.clone(),
            model: self.model.clone(),
            instructions: self.instructions.clone(),
            tools: Vec::new(),
        }
    }
}

pub fn presets() -> Vec<AgentConfig> {
    vec![
        AgentConfig::preset(
            "general",
            "GeneralAgent",
            "🤖",
            "General assistant for conversation and everyday questions",
            Some("qwen3:8b"),
            &[],
            &[
                "You are a helpful, knowledgeable general assistant.",
                "Answer general-knowledge questions accurately.",
                "Give clear explanations that teach rather than just tell.",
                "If a question needs a specialised tool, recommend the matching agent.",
                "Be concise but complete.",
            ],
        ),
        AgentConfig::preset(
            "search",
            "SearchAgent",
            "🔍",
            "Finds current information on the web",
            Some("llama3.2:3b"),
            &[ToolKind::WebSearch],
            &[
                "You are a research agent and you MUST use the web_search tool before answering.",
                "1. Call web_search with a focused query.",
                "2. Read the results.",
                "3. Answer ONLY from what the results say.",
                "4. Cite the sources you used.",
                "An answer given without searching first is a failure.",
            ],
        ),
        AgentConfig::preset(
            "finance",
            "FinanceAgent",
            "💰",
            "Financial analyst with live market data",
            None,
            &[ToolKind::StockPrice],
            &[
                "You are an experienced financial analyst with access to market data tools.",
                "Whenever prices or company figures are asked for, call stock_price with the ticker symbol.",
                "Base your analysis on the data returned, not on memory.",
                "Use tables when comparing several figures.",
                "Explain financial concepts in plain language.",
                "Always remind the user that investing carries risk.",
            ],
        ),
        AgentConfig::preset(
            "code",
            "CodeAgent",
            "💻",
            "Programming and computation expert",
            Some("qwen2.5-coder:7b"),
            &[ToolKind::Python],
            &[
                "You are a programming expert who solves problems by running Python.",
                "For any code or calculation request you MUST execute the code with run_python.",
                "1. Analyse the problem.",
                "2. Write and run the Python code.",
                "3. Show the execution output.",
                "4. Explain the solution using the code you ran.",
                "Never answer with untested code.",
            ],
        ),
        AgentConfig::preset(
            "system",
            "SystemAgent",
            "⚙️",
            "Careful system administrator with shell access",
            None,
            &[ToolKind::Shell],
            &[
                "You are an expert and cautious system administrator.",
                "Use run_shell for appropriate system tasks.",
                "ALWAYS explain what a command does before running it.",
                "Be extremely careful with destructive commands.",
                "Prefer safe alternatives whenever possible.",
                "Check permissions and security implications before acting.",
            ],
        ),
        AgentConfig::preset(
            "whatsapp",
            "WhatsAppAgent",
            "💬",
            "Messaging assistant answering WhatsApp conversations",
            None,
            &[],
            &[
                "You are a helpful assistant replying to WhatsApp messages.",
                "Keep replies short and clear, suited to a phone screen.",
                "Avoid heavy markdown; plain sentences and short lists only.",
                "Ask one clarifying question when the request is ambiguous.",
            ],
        ),
    ]
}

pub fn collaborative_team() -> TeamConfig {
    TeamConfig {
        id: "collaborative".to_string(),
        name: "CollaborativeTeam".to_string(),
        description: "Collaborative team of specialised experts".to_string(),
        emoji: "👥".to_string(),
        mode: "coordinate".to_string(),
        model: None,
        members: ["general", "search", "finance", "code", "system"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        instructions: [
            "You coordinate a team of specialised experts working together.",
            "Combine their answers into one complete response.",
            "Use each expert's contribution where it is strongest.",
            "Remove redundancy and resolve contradictions explicitly.",
            "Say which expert a key fact came from when it matters.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn preset_ids_are_unique() {
        let ids: HashSet<String> = presets().into_iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), presets().len());
        for id in ["general", "search", "finance", "code", "system", "whatsapp"] {
            assert!(ids.contains(id), "missing preset {}", id);
        }
    }

    #[test]
    fn default_model_applies_only_when_unpinned() {
        let agents = presets();
        let finance = agents.iter().find(|a| a.id == "finance").unwrap();
        let code = agents.iter().find(|a| a.id == "code").unwrap();
        assert_eq!(finance.resolve_model("mistral:latest"), "mistral:latest");
        assert_eq!(code.resolve_model("mistral:latest"), "qwen2.5-coder:7b");
    }

    #[test]
    fn team_members_are_presets() {
        let ids: HashSet<String> = presets().into_iter().map(|a| a.id).collect();
        for member in collaborative_team().members {
            assert!(ids.contains(&member));
        }
    }
}
