//! Terminal front-end: talks to the agents directly, no server needed.

use agent_hub::agents::{AgentRegistry, Responder};
use agent_hub::ollama::{format_size, has_model, OllamaProbe};
use agent_hub::AiConfig;
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEMO_PREVIEW: usize = 300;

/// Multi-agent assistant backed by a local Ollama daemon.
#[derive(Parser, Debug)]
#[command(name = "agent-hub-cli", version, about = "🤖 Multi-agent system on Ollama")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available agents.
    ListAgents {
        /// Default model for agents without a pinned one.
        #[arg(long)]
        model: Option<String>,
    },
    /// Interactive chat with one agent, or `team` for the collaborative team.
    Chat {
        #[arg(long, default_value = "general")]
        agent: String,
        /// Default model for agents without a pinned one.
        #[arg(long)]
        model: Option<String>,
    },
    /// Run three canned prompts against general, code and search.
    Demo,
    /// Check that Ollama is up and the configured models are pulled.
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut ai = AiConfig::from_env()?;

    match cli.command {
        Command::ListAgents { model } => {
            if let Some(model) = model {
                ai.default_model = model;
            }
            let registry = AgentRegistry::build(&ai)?;
            welcome();
            print_agents(&registry);
            println!("\nUse: agent-hub-cli chat --agent <ID> --model {}", ai.default_model);
        }
        Command::Chat { agent, model } => {
            if let Some(model) = model {
                ai.default_model = model;
            }
            let registry = AgentRegistry::build(&ai)?;
            welcome();
            chat(&registry, &agent).await?;
        }
        Command::Demo => {
            let registry = AgentRegistry::build(&ai)?;
            welcome();
            demo(&registry).await;
        }
        Command::Check => check(&ai).await,
    }

    Ok(())
}

fn welcome() {
    println!("🤖 Multi-Agent System v{} - powered by Ollama\n", env!("CARGO_PKG_VERSION"));
}

fn print_agents(registry: &AgentRegistry) {
    println!("{:<12} {:<22} DESCRIPTION", "ID", "MODEL");
    for agent in registry.agents() {
        println!(
            "{:<12} {:<22} {} {}",
            agent.config.id, agent.model, agent.config.emoji, agent.config.description
        );
    }
    for team in registry.teams() {
        println!(
            "{:<12} {:<22} {} {}",
            "team", team.model, team.config.emoji, team.config.description
        );
    }
}

/// Pick the agent, or the first team for `team`.
fn select<'a>(registry: &'a AgentRegistry, id: &str) -> Option<(String, &'a dyn Responder)> {
    if id == "team" {
        return registry
            .teams()
            .first()
            .map(|t| (t.config.name.clone(), t.team.as_ref() as &dyn Responder));
    }
    registry
        .agent(id)
        .map(|a| (a.config.name.clone(), a.responder.as_ref()))
}

async fn chat(registry: &AgentRegistry, agent_id: &str) -> std::io::Result<()> {
    let Some((name, responder)) = select(registry, agent_id) else {
        println!("❌ Agent '{}' not found", agent_id);
        print_agents(registry);
        return Ok(());
    };

    println!("✅ {} ready", name);
    println!("Type 'quit' to leave, 'agents' to list agents\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("💬 > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\n👋 Bye!");
            break;
        };
        let question = line.trim();
        match question.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("👋 Bye!");
                break;
            }
            "agents" => {
                print_agents(registry);
                continue;
            }
            "" => continue,
            _ => {}
        }

        println!("🔄 {} is working on it...", name);
        match responder.respond(question).await {
            Ok(answer) => println!("\n🤖 {}\n{}\n", name, answer),
            Err(e) => {
                log::error!("chat error: {}", e);
                println!("❌ Error: {}", e);
            }
        }
    }
    Ok(())
}

async fn demo(registry: &AgentRegistry) {
    println!("🎯 Agent demo\n");
    let prompts = [
        ("general", "Explain what artificial intelligence is in 3 sentences."),
        ("code", "Compute the factorial of 5 and show the Python code."),
        ("search", "Find the latest news about AI."),
    ];

    for (agent_id, question) in prompts {
        println!("🔸 Agent '{}'", agent_id);
        println!("   Question: {}", question);
        let Some(agent) = registry.agent(agent_id) else {
            continue;
        };
        match agent.responder.respond(question).await {
            Ok(answer) => println!("🤖 {}\n{}\n", agent.config.name, preview(&answer, DEMO_PREVIEW)),
            Err(e) => println!("❌ Error with {}: {}\n", agent_id, e),
        }
    }
}

async fn check(ai: &AiConfig) {
    let probe = OllamaProbe::new(&ai.url);
    let models = match probe.list_models().await {
        Ok(models) => models,
        Err(e) => {
            println!("❌ Ollama not reachable at {}: {}", ai.url, e);
            println!("   Start it with: ollama serve");
            return;
        }
    };
    println!("✅ Ollama running at {} ({} models)", ai.url, models.len());
    for model in &models {
        println!("   • {} ({})", model.name, format_size(model.size));
    }

    let mut wanted: Vec<String> = agent_hub::agents::presets()
        .iter()
        .map(|a| a.resolve_model(&ai.default_model))
        .collect();
    wanted.sort();
    wanted.dedup();

    println!();
    for name in wanted {
        if has_model(&models, &name) {
            println!("✅ {} available", name);
        } else {
            println!("⚠️  {} missing - run: ollama pull {}", name, name);
        }
    }
}

fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_answers() {
        let long = "a".repeat(400);
        let short = preview(&long, DEMO_PREVIEW);
        assert_eq!(short.len(), 303);
        assert!(short.ends_with("..."));
        assert_eq!(preview("ok", DEMO_PREVIEW), "ok");
    }

    #[test]
    fn parses_chat_flags() {
        let cli = Cli::parse_from(["agent-hub-cli", "chat", "--agent", "team", "--model", "llama3"]);
        match cli.command {
            Command::Chat { agent, model } => {
                assert_eq!(agent, "team");
                assert_eq!(model.as_deref(), Some("llama3"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn selects_team_alias() {
        let registry = AgentRegistry::build(&AiConfig::default()).unwrap();
        let (name, _) = select(&registry, "team").unwrap();
        assert_eq!(name, "CollaborativeTeam");
        assert!(select(&registry, "nobody").is_none());
    }
}
