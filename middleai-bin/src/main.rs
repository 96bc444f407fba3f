use std::path::PathBuf;

use clap::{Parser, Subcommand};
use middleai_core::{FeedbackType, MiddleAiTracer, TraceRequest, TracerConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "MiddleAI collector smoke tool", long_about = None)]
struct Cli {
    /// Config file (JSON or TOML). Defaults to MIDDLE_AI_ENDPOINT / MIDDLE_AI_API_KEY.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Application name reported as service.name and application_ref
    #[arg(long, global = true, default_value = "middleai-cli")]
    app: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open and close one trace span, then flush it to the collector
    Trace {
        #[arg(long, default_value = "llm-call")]
        name: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        user: String,
        #[arg(short, long, help = "Prompt sent to the model")]
        prompt: String,
        #[arg(long)]
        thread: String,
        #[arg(long, help = "Model parameters as a JSON object")]
        params: Option<String>,
        #[arg(long, default_value = "")]
        initial_prompt: String,
        #[arg(short, long, help = "Model output recorded on the span")]
        output: String,
    },
    /// Send one feedback record
    Feedback {
        #[arg(long)]
        thread: String,
        #[arg(long)]
        user: String,
        #[arg(long = "type", help = "emoji, thumbs or scale")]
        kind: FeedbackType,
        #[arg(long)]
        value: String,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => TracerConfig::from_path(path)?,
        None => TracerConfig::from_env()?,
    };
    let tracer = MiddleAiTracer::new(cli.app, cfg)?;
    tracing::debug!(app = tracer.name(), endpoint = tracer.endpoint(), "tracer ready");

    match cli.command {
        Commands::Trace {
            name,
            model,
            user,
            prompt,
            thread,
            params,
            initial_prompt,
            output,
        } => {
            let model_params = match params {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("--params is not valid JSON: {e}"))?,
                None => serde_json::json!({}),
            };
            let request = TraceRequest::new(name, model)
                .model_params(model_params)
                .user(user)
                .prompt(prompt)
                .thread_id(thread)
                .initial_prompt(initial_prompt);

            let span = tracer.start_trace(request);
            let trace_id = span.span_context().trace_id();
            tracer.end_trace(span, output);
            // the batch exporter posts from its own thread; keep the runtime free
            tokio::task::block_in_place(|| tracer.shutdown())?;
            println!("{} -> trace {}", tracer.endpoint(), trace_id);
        }
        Commands::Feedback {
            thread,
            user,
            kind,
            value,
        } => {
            let accepted = tracer.send_feedback(&thread, &user, kind, &value).await?;
            tokio::task::block_in_place(|| tracer.shutdown())?;
            if accepted {
                println!("feedback accepted");
            } else {
                anyhow::bail!("feedback rejected by collector");
            }
        }
    }

    Ok(())
}
