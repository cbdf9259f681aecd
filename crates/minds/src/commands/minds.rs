//! Minds command - create, inspect and reshape minds.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use minds_client::{CreateMind, DatasourceRef, Mind, MindUpdate, PROMPT_TEMPLATE_KEY};

use super::Context;

/// Arguments for the minds command.
#[derive(Args, Debug)]
pub struct MindsArgs {
    #[command(subcommand)]
    pub command: MindsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MindsCommand {
    /// List all minds in the project
    List,

    /// Show a mind
    Get {
        /// Mind name
        name: String,
    },

    /// Create a mind
    Create {
        /// Mind name
        name: String,

        /// Inference provider (e.g. openai)
        #[arg(long)]
        provider: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Prompt template override
        #[arg(long)]
        prompt_template: Option<String>,

        /// Existing datasource to attach (repeatable)
        #[arg(long = "datasource", value_name = "NAME")]
        datasources: Vec<String>,

        /// Replace a mind with the same name
        #[arg(long)]
        replace: bool,
    },

    /// Update a mind
    Update {
        /// Mind name
        name: String,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        /// Inference provider
        #[arg(long)]
        provider: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Prompt template override
        #[arg(long)]
        prompt_template: Option<String>,

        /// Replacement datasource set (repeatable)
        #[arg(long = "datasource", value_name = "NAME", conflicts_with = "clear_datasources")]
        datasources: Vec<String>,

        /// Detach every datasource
        #[arg(long)]
        clear_datasources: bool,
    },

    /// Attach a datasource to a mind
    AddDatasource {
        /// Mind name
        mind: String,

        /// Datasource name
        datasource: String,
    },

    /// Detach a datasource from a mind
    RemoveDatasource {
        /// Mind name
        mind: String,

        /// Datasource name
        datasource: String,
    },

    /// Delete a mind
    Drop {
        /// Mind name
        name: String,

        /// Succeed when the mind does not exist
        #[arg(long)]
        if_exists: bool,
    },
}

/// Run the minds command.
pub async fn run(args: MindsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect()?;
    let api = client.minds();

    match args.command {
        MindsCommand::List => {
            let minds = api.list().await?;
            if ctx.json_output {
                let infos: Vec<_> = minds.iter().map(Mind::info).collect();
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                print_table(&minds);
            }
        }
        MindsCommand::Get { name } => {
            let mind = api.get(&name).await?;
            print_mind(&mind, ctx)?;
        }
        MindsCommand::Create {
            name,
            provider,
            model,
            prompt_template,
            datasources,
            replace,
        } => {
            let mut spec = CreateMind::new(name)
                .datasources(datasources)
                .replace(replace);
            if let Some(provider) = provider {
                spec = spec.provider(provider);
            }
            if let Some(model) = model {
                spec = spec.model_name(model);
            }
            if let Some(template) = prompt_template {
                spec = spec.prompt_template(template);
            }

            let mind = api.create(spec).await?;
            done(&mind, "created", ctx)?;
        }
        MindsCommand::Update {
            name,
            rename,
            provider,
            model,
            prompt_template,
            datasources,
            clear_datasources,
        } => {
            let mind = api.get(&name).await?;

            let mut update = MindUpdate::new();
            if let Some(rename) = rename {
                update = update.name(rename);
            }
            if let Some(provider) = provider {
                update = update.provider(provider);
            }
            if let Some(model) = model {
                update = update.model_name(model);
            }
            if let Some(template) = prompt_template {
                // Parameters are replaced wholesale, so carry the other keys over.
                let mut parameters = mind.parameters().clone();
                parameters.insert(PROMPT_TEMPLATE_KEY.to_string(), template.into());
                update = update.parameters(parameters);
            }
            if clear_datasources {
                update = update.datasources(Vec::<DatasourceRef>::new());
            } else if !datasources.is_empty() {
                update = update.datasources(datasources);
            }

            let mind = mind.update(update).await?;
            done(&mind, "updated", ctx)?;
        }
        MindsCommand::AddDatasource { mind, datasource } => {
            let mind = api.get(&mind).await?.add_datasource(datasource).await?;
            done(&mind, "updated", ctx)?;
        }
        MindsCommand::RemoveDatasource { mind, datasource } => {
            let mind = api.get(&mind).await?.del_datasource(&datasource).await?;
            done(&mind, "updated", ctx)?;
        }
        MindsCommand::Drop { name, if_exists } => {
            let dropped = if if_exists {
                api.drop_if_exists(&name).await?
            } else {
                api.drop(&name).await?;
                true
            };

            if ctx.json_output {
                println!(
                    "{}",
                    serde_json::json!({ "name": name, "dropped": dropped })
                );
            } else if dropped {
                println!("{} Mind \"{}\" dropped.", Style::new().green().apply_to("✓"), name);
            } else {
                println!("Mind \"{}\" does not exist.", name);
            }
        }
    }

    Ok(())
}

fn done(mind: &Mind, verb: &str, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(mind.info())?);
    } else {
        println!(
            "{} Mind \"{}\" {}.",
            Style::new().green().apply_to("✓"),
            mind.name(),
            verb
        );
        if ctx.verbose {
            print_mind(mind, ctx)?;
        }
    }
    Ok(())
}

fn print_mind(mind: &Mind, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(mind.info())?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", Style::new().bold().apply_to(mind.name()));
    if let Some(provider) = mind.provider() {
        println!("  {} {}", dim.apply_to("provider:"), provider);
    }
    if let Some(model) = mind.model_name() {
        println!("  {} {}", dim.apply_to("model:"), model);
    }
    if let Some(template) = mind.prompt_template() {
        println!("  {} {}", dim.apply_to("prompt template:"), template);
    }
    if mind.datasources().is_empty() {
        println!("  {} {}", dim.apply_to("datasources:"), dim.apply_to("(none)"));
    } else {
        println!("  {} {}", dim.apply_to("datasources:"), mind.datasources().join(", "));
    }
    if let Some(ref created) = mind.info().created_at {
        println!("  {} {}", dim.apply_to("created:"), created);
    }
    Ok(())
}

fn print_table(minds: &[Mind]) {
    if minds.is_empty() {
        println!("No minds.");
        return;
    }

    println!("NAME                 PROVIDER     MODEL                DATASOURCES");
    for mind in minds {
        println!(
            "{:<20} {:<12} {:<20} {}",
            mind.name(),
            mind.provider().unwrap_or("-"),
            mind.model_name().unwrap_or("-"),
            mind.datasources().join(", ")
        );
    }
}
