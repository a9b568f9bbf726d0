use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use uc_modeler::schema::render_script;
use uc_modeler::utils::logging::init_logging;
use uc_modeler::utils::quoting::Dialect;
use uc_modeler::{config, DdlGenerator, DesignModel, DiagramEncoder};

#[derive(Parser)]
#[command(
    name = "uc-modeler",
    version,
    about = "Explore warehouse schemas and apply design models"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "uc_modeler.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, clap::Args)]
struct Target {
    /// Catalog; defaults to warehouse.catalog
    #[arg(long)]
    catalog: Option<String>,
    /// Schema; defaults to warehouse.schema
    #[arg(long)]
    schema: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the warehouse answers
    Ping,
    /// List catalogs
    Catalogs,
    /// List schemas in a catalog
    Schemas {
        #[arg(long)]
        catalog: Option<String>,
    },
    /// List tables in a schema
    Tables {
        #[command(flatten)]
        target: Target,
    },
    /// Print a DOT diagram of the warehouse schema, or of a design model file
    Diagram {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Replace a design model file with the warehouse schema
    Import {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        model: PathBuf,
        /// Overwrite a model file even if design edits would be lost
        #[arg(long)]
        force: bool,
    },
    /// Print the DDL for a design model file
    Ddl {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        model: PathBuf,
        /// Quote for this dialect instead of ddl.dialect
        #[arg(long)]
        dialect: Option<Dialect>,
    },
    /// Apply a design model file to the warehouse
    Apply {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        model: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_from_file(&cli.config).context("loading configuration")?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Ddl {
            target,
            model,
            dialect,
        } => {
            let (catalog, schema) = resolve_target(&config, &target)?;
            let model = load_model(&model)?;
            let mut ddl = config.ddl.clone();
            if let Some(dialect) = dialect {
                ddl.dialect = dialect;
            }
            let statements =
                DdlGenerator::new(&ddl).generate_from_model(&model, &catalog, &schema);
            println!("{}", render_script(&statements));
            Ok(())
        }
        Command::Diagram {
            target,
            model: Some(path),
        } => {
            let (_, schema) = resolve_target(&config, &target)?;
            let model = load_model(&path)?;
            println!("{}", DiagramEncoder::new(&config.diagram).encode_model(&model, &schema));
            Ok(())
        }
        command => run_online(&cli.config, command).await,
    }
}

async fn run_online(config_path: &str, command: Command) -> anyhow::Result<()> {
    let client = uc_modeler::init(config_path)
        .await
        .context("connecting to warehouse")?;

    match command {
        Command::Ping => {
            client.warehouse().test_connection().await?;
            println!("Connected successfully");
        }
        Command::Catalogs => print_lines(&client.list_catalogs().await?),
        Command::Schemas { catalog } => {
            let catalog = catalog
                .or_else(|| client.config().warehouse.catalog.clone())
                .ok_or_else(|| anyhow!("no catalog given and warehouse.catalog is not set"))?;
            print_lines(&client.list_schemas(&catalog).await?);
        }
        Command::Tables { target } => {
            let (catalog, schema) = resolve_target(client.config(), &target)?;
            print_lines(&client.list_tables(&catalog, &schema).await?);
        }
        Command::Diagram { target, .. } => {
            let (catalog, schema) = resolve_target(client.config(), &target)?;
            let graph = client.fetch_graph(&catalog, &schema).await?;
            println!("{}", client.diagram(&graph, &schema));
        }
        Command::Import { target, model, force } => {
            let (catalog, schema) = resolve_target(client.config(), &target)?;
            let current = if model.exists() {
                load_model(&model)?
            } else {
                DesignModel::new()
            };
            let outcome = client.import_design(&current, &catalog, &schema).await?;
            if outcome.lost_edits() && !force {
                bail!(
                    "import would discard {} table(s) and {} relationship(s) from {}; \
                     rerun with --force",
                    outcome.discarded_tables.len(),
                    outcome.discarded_relationships,
                    model.display()
                );
            }
            save_model(&model, &outcome.model)?;
            println!(
                "Imported {} table(s) and {} relationship(s) into {}",
                outcome.model.tables.len(),
                outcome.model.relationships.len(),
                model.display()
            );
        }
        Command::Apply { target, model } => {
            let (catalog, schema) = resolve_target(client.config(), &target)?;
            let model = load_model(&model)?;
            let report = client.apply_model(&model, &catalog, &schema).await;
            if report.dry_run {
                println!("Dry run: nothing applied");
            } else if report.is_success() {
                println!("All {} statement(s) applied successfully", report.attempted);
            } else {
                eprintln!("{}", report.render_failures());
                bail!(
                    "{} of {} statement(s) failed",
                    report.failures.len(),
                    report.attempted
                );
            }
        }
        Command::Ddl { .. } => bail!("ddl runs without a warehouse connection"),
    }

    Ok(())
}

fn resolve_target(config: &config::Config, target: &Target) -> anyhow::Result<(String, String)> {
    let catalog = target
        .catalog
        .clone()
        .or_else(|| config.warehouse.catalog.clone())
        .ok_or_else(|| anyhow!("no catalog given and warehouse.catalog is not set"))?;
    let schema = target
        .schema
        .clone()
        .or_else(|| config.warehouse.schema.clone())
        .ok_or_else(|| anyhow!("no schema given and warehouse.schema is not set"))?;
    Ok((catalog, schema))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn load_model(path: &Path) -> anyhow::Result<DesignModel> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let model = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(model)
}

fn save_model(path: &Path, model: &DesignModel) -> anyhow::Result<()> {
    let text = if is_yaml(path) {
        serde_yaml::to_string(model)?
    } else {
        serde_json::to_string_pretty(model)?
    };
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
