use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use goalplan_kb::{
    create_provider, logging::init_logging, start_planner, CoreError, ExtractionOutcome,
    ExtractionRequest, GoalWriter, PlannerClient, PlannerConfig, QueryService,
    TextCompletionProvider,
};
use goalplan_interfaces::PresentationPayload;

const HELP: &str = "\
Type a message to extract goals from it, or one of:
  :summary            print the goal graph
  :order              print goals in dependency order
  :goals              list goals
  :deps <goal>        goals that must come before <goal>
  :dependents <goal>  goals waiting on <goal>
  :remove <goal>      remove a goal and its edges
  :clear              remove every goal
  :load <file>        extract goals from a text file
  :models             list available models
  :model [name]       show or switch model
  :quit               exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = PlannerConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_logging(&config).context("Failed to initialize logging")?;

    let provider = create_provider(&config).context("Failed to create text completion provider")?;
    match provider.list_models().await {
        Ok(models) if models.is_empty() => warn!("Provider reports no installed models"),
        Ok(models) => info!(?models, "Provider reachable"),
        Err(e) => warn!(error = %e, "Provider not reachable yet, requests will fail until it is"),
    }

    let handles = start_planner(&config, Arc::clone(&provider));
    info!(goals_path = %config.goals_path().display(), "Goal planner started");
    println!("{HELP}");

    let mut shell = Shell {
        client: handles.client,
        queries: handles.queries,
        provider,
        model: config.default_model.clone(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }
        if let Err(e) = shell.dispatch(line).await {
            error!(error = %e, "Command failed");
            println!("Error: {e}");
        }
    }

    info!("Shutting down");
    Ok(())
}

struct Shell {
    client: PlannerClient,
    queries: QueryService,
    provider: Arc<dyn TextCompletionProvider>,
    model: String,
}

impl Shell {
    async fn dispatch(&mut self, line: &str) -> Result<(), CoreError> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            ":help" => println!("{HELP}"),
            ":summary" => print!("{}", self.queries.summary().await?),
            ":order" => match self.queries.topological_order().await {
                Ok(order) => {
                    for (step, goal) in order.iter().enumerate() {
                        println!("{}. {goal}", step + 1);
                    }
                }
                Err(CoreError::CycleDetected { remaining }) => {
                    println!("The goal graph has a cycle among: {}", remaining.join(", "));
                }
                Err(e) => return Err(e),
            },
            ":goals" => {
                for goal in self.queries.goals().await? {
                    println!("- {} [{}] {}", goal.name, goal.priority(), goal.description());
                }
            }
            ":deps" => println!("{}", self.queries.dependencies(argument).await?.join(", ")),
            ":dependents" => println!("{}", self.queries.dependents(argument).await?.join(", ")),
            ":remove" => {
                let removed = self.client.graph().remove_goal(argument).await?;
                println!("{}", if removed { "Removed." } else { "No such goal." });
            }
            ":clear" => {
                self.client.graph().clear().await?;
                println!("Goal graph cleared.");
            }
            ":load" => {
                let context = tokio::fs::read_to_string(argument).await.map_err(|e| {
                    CoreError::invalid_argument(format!("Cannot read '{argument}': {e}"))
                })?;
                self.submit(ExtractionRequest::from_context(&context)).await?;
            }
            ":models" => {
                let models = self.provider.list_models().await?;
                for model in models {
                    let marker = if model == self.model { "*" } else { " " };
                    println!("{marker} {model}");
                }
            }
            ":model" => println!("{}", self.select_model(argument)),
            _ if command.starts_with(':') => println!("Unknown command. Type :help for a list."),
            _ => self.submit(ExtractionRequest::new(line)).await?,
        }
        Ok(())
    }

    /// Switches to `name`, or keeps the current model when `name` is empty.
    fn select_model(&mut self, name: &str) -> String {
        if !name.is_empty() {
            self.model = name.to_string();
        }
        format!("Using model {}", self.model)
    }

    /// Hands the request to the extraction worker and prints the outcome
    /// whenever it arrives, without blocking the prompt.
    async fn submit(&self, request: ExtractionRequest) -> Result<(), CoreError> {
        let request = request.with_model(self.model.clone());
        let request_id = request.request_id;
        let pending = self.client.submit(request).await?;
        let queries = self.queries.clone();
        println!("Thinking...");

        tokio::spawn(async move {
            let outcome = match pending.await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    println!("Error: {e}");
                    return;
                }
                Err(_) => {
                    error!(%request_id, "Extraction worker dropped the request");
                    return;
                }
            };
            let extracted: Vec<String> = match &outcome {
                ExtractionOutcome::Extracted(records) => {
                    records.iter().map(|record| record.name.clone()).collect()
                }
                ExtractionOutcome::Conversational(_) => Vec::new(),
            };

            match queries.outcome_payload(outcome).await {
                Ok(PresentationPayload::Conversational(text)) => println!("AI: {text}"),
                Ok(PresentationPayload::Graph(view)) => {
                    println!("AI: Goals extracted and added to graph.");
                    for name in extracted {
                        println!("  - {name}");
                    }
                    println!(
                        "Graph now holds {} goals and {} dependencies.",
                        view.goals.len(),
                        view.dependencies.len()
                    );
                }
                Ok(PresentationPayload::Summary(summary)) => print!("{summary}"),
                Err(e) => println!("Error: {e}"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalplan_kb::test_utils::ScriptedProvider;
    use goalplan_kb::{start, ExtractionOptions, GraphStore};

    fn shell(dir: &tempfile::TempDir) -> Shell {
        let provider: Arc<dyn TextCompletionProvider> =
            Arc::new(ScriptedProvider::new().with_models(&["llama2", "mistral"]));
        let store = GraphStore::open(dir.path().join("goals.json"));
        let handles = start(store, Arc::clone(&provider), ExtractionOptions::default());
        Shell {
            client: handles.client,
            queries: handles.queries,
            provider,
            model: "llama2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_model_without_name_reports_current_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir);

        assert_eq!(shell.select_model(""), "Using model llama2");
        shell.dispatch(":model").await.unwrap();
        assert_eq!(shell.model, "llama2");

        shell.dispatch(":model   mistral").await.unwrap();
        assert_eq!(shell.model, "mistral");
        assert_eq!(shell.select_model(""), "Using model mistral");
    }
}
