//! Datasources command - manage external data connections.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use minds_client::Datasource;

use super::{Context, parse_key_value};

/// Arguments for the datasources command.
#[derive(Args, Debug)]
pub struct DatasourcesArgs {
    #[command(subcommand)]
    pub command: DatasourcesCommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasourcesCommand {
    /// List all datasources
    List,

    /// Show a datasource
    Get {
        /// Datasource name
        name: String,
    },

    /// Create a datasource
    Create {
        /// Datasource name
        name: String,

        /// Connector type (e.g. postgres, snowflake)
        #[arg(long)]
        engine: String,

        /// Connection parameter as key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, serde_json::Value)>,

        /// Table to expose (repeatable; default all)
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Replace a datasource with the same name
        #[arg(long)]
        replace: bool,
    },

    /// Create the public demo datasource
    CreateExample {
        /// Replace an existing demo datasource
        #[arg(long)]
        replace: bool,
    },

    /// Delete a datasource
    Drop {
        /// Datasource name
        name: String,

        /// Succeed when the datasource does not exist
        #[arg(long)]
        if_exists: bool,
    },
}

/// Run the datasources command.
pub async fn run(args: DatasourcesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect()?;
    let api = client.datasources();

    match args.command {
        DatasourcesCommand::List => {
            let datasources = api.list().await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&datasources)?);
            } else {
                print_table(&datasources);
            }
        }
        DatasourcesCommand::Get { name } => {
            let ds = api.get(&name).await?;
            print_datasource(&ds, ctx)?;
        }
        DatasourcesCommand::Create {
            name,
            engine,
            params,
            tables,
            description,
            replace,
        } => {
            let mut spec = Datasource::new(name, engine).with_tables(tables);
            for (key, value) in params {
                spec = spec.with_connection_param(key, value);
            }
            if let Some(description) = description {
                spec = spec.with_description(description);
            }

            let ds = api.create(&spec, replace).await?;
            created(&ds, replace, ctx)?;
        }
        DatasourcesCommand::CreateExample { replace } => {
            let ds = api.create(&Datasource::example(), replace).await?;
            created(&ds, replace, ctx)?;
        }
        DatasourcesCommand::Drop { name, if_exists } => {
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
                println!("{} Datasource \"{}\" dropped.", Style::new().green().apply_to("✓"), name);
            } else {
                println!("Datasource \"{}\" does not exist.", name);
            }
        }
    }

    Ok(())
}

fn created(ds: &Datasource, replace: bool, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(ds)?);
    } else {
        let verb = if replace { "created or replaced" } else { "created" };
        println!(
            "{} Datasource \"{}\" {}.",
            Style::new().green().apply_to("✓"),
            ds.name,
            verb
        );
    }
    Ok(())
}

fn print_datasource(ds: &Datasource, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(ds)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", Style::new().bold().apply_to(&ds.name));
    println!("  {} {}", dim.apply_to("engine:"), ds.engine);
    if let Some(ref description) = ds.description {
        println!("  {} {}", dim.apply_to("description:"), description);
    }
    if !ds.tables.is_empty() {
        println!("  {} {}", dim.apply_to("tables:"), ds.tables.join(", "));
    }
    if !ds.connection_data.is_empty() {
        println!("  {}", dim.apply_to("connection:"));
        for (key, value) in &ds.connection_data {
            match value.as_str() {
                Some(s) => println!("    {}: {}", key, s),
                None => println!("    {}: {}", key, value),
            }
        }
    }
    Ok(())
}

fn print_table(datasources: &[Datasource]) {
    if datasources.is_empty() {
        println!("No datasources.");
        return;
    }

    println!("NAME                 ENGINE       DESCRIPTION");
    for ds in datasources {
        println!(
            "{:<20} {:<12} {}",
            ds.name,
            ds.engine,
            ds.description.as_deref().unwrap_or("")
        );
    }
}
