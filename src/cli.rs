//! Command-line interface for menuforge.
//!
//! Argument parsing, configuration loading and collaborator wiring; the
//! actual workflow lives in `menuforge-engine`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use menuforge_config::Config;
use menuforge_engine::{Collaborators, Orchestrator, WorkflowOutcome};
use menuforge_llm::{LlmClient, ScriptedClient};
use menuforge_model::MenuDocument;
use menuforge_pdf::PlainTextExtractor;
use menuforge_store::{CodeArtifactStore, FsStore, InMemoryStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// menuforge turns a restaurant menu document into a generated website.
#[derive(Parser)]
#[command(name = "menuforge", version)]
#[command(about = "Generate a restaurant website from a menu document")]
#[command(long_about = r#"
menuforge runs a fixed pipeline over a submitted menu document: text
extraction, menu structuring, design token selection, site generation and
static validation, regenerating up to the retry budget while validation
reports blocking findings.

EXAMPLES:
  # Generate a site from a menu
  menuforge generate menu.pdf --out ./site

  # Steer the look with a design brief
  menuforge generate menu.txt --brief "warm, rustic, candle-lit"

  # Exercise the pipeline without an API key
  menuforge generate menu.txt --dry-run

  # Inspect stored workflow records
  menuforge list
  menuforge show 6f1c2e6a-...

CONFIGURATION:
  Loaded from --config when given, else ./menuforge.toml when present,
  else defaults. MENUFORGE_* environment variables override file values.
"#)]
pub struct Cli {
    /// Path to a configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline over a menu document.
    Generate {
        /// Menu document to process.
        input: PathBuf,

        /// Directory the generated site is written to.
        #[arg(long, default_value = "site")]
        out: PathBuf,

        /// Free-form styling brief forwarded to the design stage.
        #[arg(long)]
        brief: Option<String>,

        /// Model name override.
        #[arg(long)]
        model: Option<String>,

        /// Use canned responses instead of a live model.
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored workflow records, newest first.
    List,

    /// Print one stored workflow record as JSON.
    Show { id: Uuid },

    /// Delete a stored workflow record.
    Delete { id: Uuid },
}

/// Entry point invoked by the binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    match cli.command {
        Command::Generate {
            input,
            out,
            brief,
            model,
            dry_run,
        } => {
            let mut config = config;
            if let Some(model) = model {
                config.llm.model = model;
            }
            let outcome = runtime.block_on(generate(&config, &input, brief, dry_run))?;
            write_site(&out, &outcome)?;
            print_outcome(&out, &outcome);
            Ok(())
        }
        Command::List => runtime.block_on(list(&config)),
        Command::Show { id } => runtime.block_on(show(&config, id)),
        Command::Delete { id } => runtime.block_on(delete(&config, id)),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let discovered = PathBuf::from("menuforge.toml");
            discovered.exists().then_some(discovered)
        }
    };
    Config::load(path.as_deref()).context("failed to load configuration")
}

async fn generate(
    config: &Config,
    input: &Path,
    brief: Option<String>,
    dry_run: bool,
) -> Result<WorkflowOutcome> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read menu document {}", input.display()))?;
    let filename = input
        .file_name()
        .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut document = MenuDocument::new(filename, bytes);
    if let Some(brief) = brief {
        document = document.with_design_brief(brief);
    }

    let llm: Arc<dyn LlmClient> = if dry_run {
        sample_client()
    } else {
        menuforge_llm::from_config(&config.llm).context("failed to build LLM client")?
    };
    let collaborators = Collaborators {
        extractor: Arc::new(PlainTextExtractor),
        llm,
        store: open_store(config)?,
    };

    let orchestrator = Orchestrator::new(config.clone(), collaborators);
    let outcome = orchestrator.run(document).await?;
    Ok(outcome)
}

fn open_store(config: &Config) -> Result<Arc<dyn CodeArtifactStore>> {
    match &config.store.root {
        Some(root) => {
            let store = FsStore::new(root)
                .with_context(|| format!("failed to open store at {}", root.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

fn require_fs_store(config: &Config) -> Result<Arc<dyn CodeArtifactStore>> {
    if config.store.root.is_none() {
        bail!("no store configured; set store.root in menuforge.toml or MENUFORGE_STORE_ROOT");
    }
    open_store(config)
}

/// Write the validated artifact to disk. Paths were vetted by the
/// generator stage, so plain joins are safe here.
fn write_site(out: &Path, outcome: &WorkflowOutcome) -> Result<()> {
    for (path, content) in &outcome.artifact.files {
        let target = out.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }
    Ok(())
}

fn print_outcome(out: &Path, outcome: &WorkflowOutcome) {
    println!(
        "Generated {} files for '{}' into {}",
        outcome.artifact.file_count(),
        outcome.menu.restaurant_name,
        out.display()
    );
    println!(
        "Workflow {} {} after {} generator attempt(s)",
        outcome.state.id(),
        outcome.state.status(),
        outcome.state.retry_count() + 1
    );
    for issue in &outcome.report.issues {
        println!("warning: [{}] {}", issue.location, issue.message);
    }
}

async fn list(config: &Config) -> Result<()> {
    let store = require_fs_store(config)?;
    let summaries = store.list().await?;
    if summaries.is_empty() {
        println!("no stored workflows");
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {:9}  {:3} files  {}  {}",
            summary.id,
            summary.status,
            summary.file_count,
            summary.saved_at.format("%Y-%m-%d %H:%M:%S"),
            summary.restaurant_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn show(config: &Config, id: Uuid) -> Result<()> {
    let store = require_fs_store(config)?;
    let record = store.load(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn delete(config: &Config, id: Uuid) -> Result<()> {
    let store = require_fs_store(config)?;
    store.delete(id).await?;
    println!("deleted {id}");
    Ok(())
}

/// Canned single-pass replies so `--dry-run` exercises the whole
/// pipeline, validator included, without a live model.
fn sample_client() -> Arc<dyn LlmClient> {
    let client = ScriptedClient::new();
    client.push_reply(
        json!({
            "restaurant_name": "Sample Bistro",
            "categories": [
                {"name": "Starters", "items": [
                    {"name": "Soup of the Day", "description": "ask your server", "price": 6.50, "tags": ["vegetarian"]}
                ]},
                {"name": "Mains", "items": [
                    {"name": "Roast Chicken", "description": "with seasonal vegetables", "price": 18.00, "tags": []}
                ]}
            ],
            "restaurant_info": {"address": "1 Sample Street", "phone": null, "hours": null, "about": null}
        })
        .to_string(),
    );
    client.push_reply(
        json!({
            "design_system": {
                "primary_color": "#8b0000",
                "secondary_color": "#f5e6c8",
                "accent_color": "#c9a227",
                "background_color": "#fffaf0",
                "text_color": "#2b2b2b"
            },
            "typography": {"heading_font": "Playfair Display", "body_font": "Source Sans Pro"},
            "layout_style": "elegant",
            "spacing": {"small": "0.5rem", "medium": "1rem", "large": "2rem"}
        })
        .to_string(),
    );
    client.push_reply(
        json!({
            "files": [
                {"path": "package.json",
                 "content": "{\n  \"name\": \"sample-bistro\",\n  \"version\": \"0.1.0\"\n}\n"},
                {"path": "src/index.js",
                 "content": "import App from './App';\nconsole.log('sample bistro', App);\n"},
                {"path": "src/App.jsx",
                 "content": "export default function App() {\n  return (\n    <Routes>\n      <Route path='/' />\n      <Route path='/starters' />\n      <Route path='/mains' />\n    </Routes>\n  );\n}\n"},
                {"path": "src/styles.css",
                 "content": ":root {\n  --primary: #8b0000;\n  --background: #fffaf0;\n}\n"}
            ],
            "entry_point": "src/index.js"
        })
        .to_string(),
    );
    Arc::new(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sample_replies_satisfy_the_validator() {
        let menu = menuforge_model::StructuredMenu::new(
            "Sample Bistro",
            vec![
                menuforge_model::MenuCategory {
                    name: "Starters".into(),
                    items: vec![],
                },
                menuforge_model::MenuCategory {
                    name: "Mains".into(),
                    items: vec![],
                },
            ],
            menuforge_model::RestaurantInfo::default(),
        );
        let raw: serde_json::Value = serde_json::from_str(
            &serde_json::json!({
                "files": [
                    {"path": "src/index.js", "content": "import App from './App';"},
                    {"path": "src/App.jsx",
                     "content": "export default () => (<><Route path='/' /><Route path='/starters' /><Route path='/mains' /></>);"}
                ],
                "entry_point": "src/index.js"
            })
            .to_string(),
        )
        .unwrap();
        let files: std::collections::BTreeMap<String, String> = raw["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| {
                (
                    f["path"].as_str().unwrap().to_string(),
                    f["content"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        let artifact = menuforge_model::CodeArtifact::new(files, "src/index.js").unwrap();
        let design = menuforge_model::DesignSpec {
            palette: menuforge_model::Palette {
                primary: "#8b0000".into(),
                secondary: "#f5e6c8".into(),
                accent: "#c9a227".into(),
                background: "#fffaf0".into(),
                text: "#2b2b2b".into(),
            },
            typography: menuforge_model::Typography {
                heading_font: "Playfair Display".into(),
                body_font: "Source Sans Pro".into(),
                heading_size: "2.5rem".into(),
                body_size: "1rem".into(),
            },
            layout_style: "elegant".into(),
            spacing: menuforge_model::Spacing::default(),
        };
        let report = menuforge_engine::stages::validate(&artifact, &menu, &design);
        assert!(report.is_clean(), "{:?}", report.issues);
    }
}
