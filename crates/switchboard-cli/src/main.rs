//! switchboard — run the orchestrator, talk to it, or stand up a test adapter
//!
//! ```text
//! switchboard serve --port 8000
//! switchboard ask "What's new in quantum computing?"
//! switchboard ask "Summarize this clip" --agent VideoAgent --no-wait
//! switchboard ask                       # interactive session
//! switchboard status <TASK_ID>
//! switchboard agents
//! switchboard adapter --name ResearchAgent --capability search --port 8001
//! ```

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use switchboard_a2a::{A2aClient, AdapterServer, EchoBackend};
use switchboard_core::{AgentCard, Config, Orchestrator, Task, TaskStatus};
use switchboard_gateway::{AppState, GatewayClient};

const DEFAULT_URL: &str = "http://localhost:8000";

/// Delegates queries to specialized agents over HTTP
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(about = "Orchestrator that delegates tasks to specialized agents")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.switchboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the orchestrator API
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Submit a query and print the agent's answer; without a query, start an interactive session
    Ask {
        query: Option<String>,
        /// Send to this agent instead of auto-selecting
        #[arg(short, long)]
        agent: Option<String>,
        /// Conversation id forwarded to the agent
        #[arg(long)]
        context: Option<String>,
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        /// Print the task id and return without waiting
        #[arg(long)]
        no_wait: bool,
    },
    /// Show a task
    Status {
        task_id: String,
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// List registered agents
    Agents {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Run an echo adapter for local testing
    Adapter {
        #[arg(long)]
        name: String,
        #[arg(long = "capability", required = true)]
        capabilities: Vec<String>,
        #[arg(short, long, default_value_t = 8001)]
        port: u16,
        /// Reply `working` first and finish in the background
        #[arg(long)]
        async_mode: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { bind, port } => cmd_serve(cli.config, bind, port).await,
        Commands::Ask {
            query,
            agent,
            context,
            url,
            no_wait,
        } => {
            let ask = AskOptions::new(&url, agent, context, no_wait, cli.config)?;
            match query {
                Some(query) => ask.once(&query).await,
                None => ask.interactive().await,
            }
        }
        Commands::Status { task_id, url } => cmd_status(&url, &task_id).await,
        Commands::Agents { url } => cmd_agents(&url).await,
        Commands::Adapter {
            name,
            capabilities,
            port,
            async_mode,
        } => cmd_adapter(name, capabilities, port, async_mode).await,
    }
}

async fn cmd_serve(config_path: Option<PathBuf>, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load_or_default(config_path.as_deref())?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;

    let transport = A2aClient::with_timeout(config.dispatch.timeout())?;
    let orchestrator = Orchestrator::from_config(&config, Arc::new(transport));
    let connected = orchestrator.connect_configured(&config).await;
    if connected < config.agents.len() {
        warn!(
            "{} of {} configured agents unavailable",
            config.agents.len() - connected,
            config.agents.len()
        );
    }
    info!("Orchestrator ready with {} agents", connected);

    let state = Arc::new(AppState::new(orchestrator));
    switchboard_gateway::serve(state, addr, shutdown_signal()).await
}

/// Everything `ask` needs besides the query itself
struct AskOptions {
    client: GatewayClient,
    agent: Option<String>,
    context: Option<String>,
    no_wait: bool,
    poll_interval: Duration,
    wait: Duration,
}

impl AskOptions {
    fn new(
        url: &str,
        agent: Option<String>,
        context: Option<String>,
        no_wait: bool,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config = Config::load_or_default(config_path.as_deref())?;
        Ok(Self {
            client: GatewayClient::new(url)?,
            agent,
            context,
            no_wait,
            poll_interval: config.dispatch.poll_interval(),
            // Leave headroom over the server-side bound so its own timeout wins
            wait: config.dispatch.timeout() + Duration::from_secs(5),
        })
    }

    async fn once(&self, query: &str) -> Result<()> {
        self.send(query, self.agent.as_deref()).await
    }

    async fn send(&self, query: &str, agent: Option<&str>) -> Result<()> {
        let submission = self
            .client
            .submit(query, agent, self.context.as_deref())
            .await?;
        println!("Task {} delegated to {}", submission.task_id, submission.agent_name);
        if self.no_wait {
            return Ok(());
        }

        let task = self
            .client
            .wait_for_task(&submission.task_id, self.poll_interval, self.wait)
            .await?;
        print_task(&task);
        Ok(())
    }

    /// Prompt for queries until `exit`, `quit` or end of input.
    ///
    /// Every query in the session shares one conversation id.
    async fn interactive(mut self) -> Result<()> {
        let info = self.client.info().await?;
        println!("Connected to {}", info.name);
        println!("Available agents: {}", info.agents.join(", "));
        println!("Type 'exit' or 'quit' to leave");

        if self.context.is_none() {
            self.context = Some(uuid::Uuid::new_v4().to_string());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let Some(query) = prompt(&mut lines, "\nQuery: ").await? else {
                break;
            };
            if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
                break;
            }
            if query.is_empty() {
                continue;
            }

            let agent = match &self.agent {
                Some(agent) => Some(agent.clone()),
                None => prompt(&mut lines, "Agent (empty for auto-selection): ")
                    .await?
                    .filter(|name| !name.is_empty()),
            };

            if let Err(e) = self.send(&query, agent.as_deref()).await {
                println!("Error: {:#}", e);
            }
        }
        Ok(())
    }
}

/// Print `label` and read one trimmed line; `None` at end of input
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let line = lines.next_line().await.context("Failed to read from stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

async fn cmd_status(url: &str, task_id: &str) -> Result<()> {
    let client = GatewayClient::new(url)?;
    let task = client.get_task(task_id).await?;
    print_task(&task);
    Ok(())
}

async fn cmd_agents(url: &str) -> Result<()> {
    let client = GatewayClient::new(url)?;
    let agents = client.list_agents().await?;
    if agents.is_empty() {
        println!("No agents registered");
        return Ok(());
    }
    for agent in agents {
        println!("{}  {}", agent.name, agent.endpoint);
        if !agent.description.is_empty() {
            println!("    {}", agent.description);
        }
        println!("    capabilities: {}", agent.capabilities.join(", "));
    }
    Ok(())
}

async fn cmd_adapter(
    name: String,
    capabilities: Vec<String>,
    port: u16,
    async_mode: bool,
) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let mut card = AgentCard::new(name.clone(), format!("http://{}", addr))
        .with_description(format!("Echo adapter ({})", capabilities.join(", ")));
    for capability in capabilities {
        card = card.with_capability(capability);
    }

    let server = AdapterServer::new(card, Arc::new(EchoBackend::new(format!("[{}] ", name))))
        .with_async_mode(async_mode);
    server.serve(addr).await
}

fn print_task(task: &Task) {
    println!("Task:   {}", task.id);
    println!("Agent:  {}", task.agent_name);
    println!("Status: {}", task.status);
    match task.status {
        TaskStatus::Completed => {
            if let Some(result) = &task.result {
                println!("\n{}", result);
            }
        }
        TaskStatus::Failed => {
            if let Some(error) = &task.error {
                println!("Error:  {}", error);
            }
        }
        _ => {}
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
