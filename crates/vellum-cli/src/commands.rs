//! Subcommand implementations. Every command reads JSON and writes JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use vellum_engine::{
    compose_proposal, detect, flatten, harvest_notes, harvest_values, prepare_template,
    seed_client_name,
};
use vellum_types::{Delta, NoteEmbed, PlaceholderDefinition, Template, Values};

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the `{{NAME}}` placeholders a Delta contains
    Detect {
        /// Delta JSON file (`-` for stdin)
        input: PathBuf,
    },

    /// Compose a proposal draft from a template
    Fill {
        /// Template JSON file (`-` for stdin)
        template: PathBuf,
        /// JSON object of initial values by placeholder name
        #[arg(long)]
        values: Option<PathBuf>,
        /// Client name (fills CLIENT_NAME and CLIENT_COMPANY_NAME placeholders and the title)
        #[arg(long)]
        client: Option<String>,
        /// Derive embed ids from the template id (or name) instead of timestamps
        #[arg(long)]
        derived_ids: bool,
    },

    /// Replace placeholder tokens in a Delta with editable embeds
    Transform {
        /// Delta JSON file (`-` for stdin)
        input: PathBuf,
        /// JSON array of placeholder definitions
        #[arg(long)]
        placeholders: PathBuf,
        /// JSON object of initial values by placeholder name
        #[arg(long)]
        values: Option<PathBuf>,
    },

    /// Collect placeholder values and notes from a filled Delta
    Harvest {
        /// Delta JSON file (`-` for stdin)
        input: PathBuf,
    },

    /// Turn placeholder and note embeds into plain text
    Flatten {
        /// Delta JSON file (`-` for stdin)
        input: PathBuf,
    },

    /// Validate a template and refresh its placeholder definitions
    Prepare {
        /// Template JSON file (`-` for stdin)
        template: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct Harvest {
    values: Values,
    notes: Vec<NoteEmbed>,
}

/// Run one command, writing its JSON result to `output` or stdout.
pub fn run(command: Command, config: &Config, output: Option<&Path>) -> Result<()> {
    match command {
        Command::Detect { input } => {
            let delta = read_delta(&input)?;
            emit(&detect(&delta), config, output)
        }
        Command::Fill {
            template,
            values,
            client,
            derived_ids,
        } => {
            let template: Template = read_json(&template)?;
            let prepared = prepare_template(&template)
                .with_context(|| format!("template {:?} is not usable", template.name))?;
            let mut values = read_values(values.as_deref())?;
            if let Some(client) = client {
                seed_client_name(&mut values, &prepared.placeholders, &client);
            }
            let transformer = config.transformer(&prepared.id_scope(), derived_ids);
            emit(&compose_proposal(&prepared, &values, &transformer), config, output)
        }
        Command::Transform {
            input,
            placeholders,
            values,
        } => {
            let delta = read_delta(&input)?;
            let placeholders: Vec<PlaceholderDefinition> = read_json(&placeholders)?;
            let values = read_values(values.as_deref())?;
            let transformer = config.transformer(&scope_for(&input), false);
            emit(&transformer.transform(&delta, &placeholders, &values), config, output)
        }
        Command::Harvest { input } => {
            let delta = read_delta(&input)?;
            let harvest = Harvest {
                values: harvest_values(&delta),
                notes: harvest_notes(&delta),
            };
            emit(&harvest, config, output)
        }
        Command::Flatten { input } => {
            let delta = read_delta(&input)?;
            emit(&flatten(&delta), config, output)
        }
        Command::Prepare { template } => {
            let template: Template = read_json(&template)?;
            let prepared = prepare_template(&template)
                .with_context(|| format!("template {:?} is not usable", template.name))?;
            emit(&prepared, config, output)
        }
    }
}

/// Derived-id scope for a bare Delta: its file stem.
fn scope_for(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_delta(path: &Path) -> Result<Delta> {
    let text = read_input(path)?;
    Delta::parse(&text).with_context(|| format!("invalid Delta in {}", path.display()))
}

fn read_values(path: Option<&Path>) -> Result<Values> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Values::new()),
    }
}

fn emit<T: Serialize>(value: &T, config: &Config, output: Option<&Path>) -> Result<()> {
    let mut json = if config.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');

    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{json}"),
    }
    Ok(())
}
