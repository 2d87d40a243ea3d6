use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use symptom_dx::insights::LifeExpectancyTable;
use symptom_dx::knowledge::KnowledgeBase;
use symptom_dx::{ArtifactSource, ArtifactStore, ChatBot, DiagnosisPipeline, RuntimeConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict a disease from a comma-separated symptom list
    Predict {
        /// Symptoms, e.g. "itching,skin_rash"
        #[arg(short, long)]
        symptoms: String,
        /// Artifact bundle directory
        #[arg(short, long, env = "SYMPTOM_DX_ARTIFACT", default_value = "artifacts/sih")]
        artifact: PathBuf,
    },
    /// Answer one chat message and print the JSON reply
    Chat {
        #[arg(short, long)]
        message: String,
        #[arg(short, long, env = "SYMPTOM_DX_ARTIFACT", default_value = "artifacts/sih")]
        artifact: PathBuf,
        /// JSON object of keyword -> answer replacing the built-in knowledge base
        #[arg(long)]
        knowledge: Option<PathBuf>,
        /// JSON array of WHO life expectancy records
        #[arg(long)]
        life_expectancy: Option<PathBuf>,
    },
    /// Download an artifact bundle into the local store
    Fetch {
        #[arg(short, long)]
        name: String,
        /// Base URL the bundle files live under
        #[arg(short, long)]
        url: String,
        /// Force a fresh download of the bundle
        #[arg(short, long)]
        fresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Predict { symptoms, artifact } => predict(&symptoms, artifact),
        Command::Chat { message, artifact, knowledge, life_expectancy } => {
            chat(&message, artifact, knowledge, life_expectancy)
        }
        Command::Fetch { name, url, fresh } => fetch(name, url, fresh).await,
    }
}

fn predict(symptoms: &str, artifact: PathBuf) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let pipeline = DiagnosisPipeline::load(&artifact, RuntimeConfig::from_env());
    info!("Pipeline loaded in {:.2?}", start_time.elapsed());

    let symptoms: Vec<&str> = symptoms.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    match pipeline.assemble(&symptoms) {
        Ok(prediction) => {
            println!("--- Chatbot Response ---");
            println!("Predicted Disease: {}", prediction.disease);
            println!("Description: {}", prediction.description);
            println!("Recommended Precautions: {}", prediction.precautions.join(", "));
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.detail);
            if let Some(cause) = &err.cause {
                info!("Cause: {}", cause);
            }
            Err(err.into())
        }
    }
}

fn chat(
    message: &str,
    artifact: PathBuf,
    knowledge: Option<PathBuf>,
    life_expectancy: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pipeline = Arc::new(DiagnosisPipeline::load(&artifact, RuntimeConfig::from_env()));
    let mut bot = ChatBot::new(pipeline);

    if let Some(path) = knowledge {
        let kb = KnowledgeBase::from_json_path(&path)
            .with_context(|| format!("loading knowledge base from {:?}", path))?;
        bot = bot.with_knowledge(kb);
    }
    if let Some(path) = life_expectancy {
        let table = LifeExpectancyTable::from_json_path(&path)
            .with_context(|| format!("loading life expectancy data from {:?}", path))?;
        bot = bot.with_life_expectancy(table);
    }

    let response = bot.respond(message);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn fetch(name: String, url: String, fresh: bool) -> anyhow::Result<()> {
    let store = ArtifactStore::new_default()?;
    let source = ArtifactSource::new(name, url);

    if fresh {
        info!("Fresh download requested - removing any existing bundle...");
        store.remove_download(&source.name)?;
    }

    let dir = store.ensure_downloaded(&source).await?;
    println!("Artifact ready at {}", dir.display());
    Ok(())
}
