//! Config command - client context management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;

use minds_config::{AuthConfig, Context as ClientContext};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved connection and all contexts
    Show,

    /// Show the current context name
    CurrentContext,

    /// List available contexts
    GetContexts,

    /// Switch to a different context
    UseContext {
        /// Context name to switch to
        name: String,
    },

    /// Create or update a context (takes the global --base-url and --project)
    SetContext {
        /// Context name
        name: String,

        /// Environment variable holding the API key
        #[arg(long)]
        key_env: Option<String>,

        /// File holding the API key
        #[arg(long)]
        key_file: Option<std::path::PathBuf>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Delete a context
    DeleteContext {
        /// Context name to delete
        name: String,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx).await,
        ConfigCommand::CurrentContext => cmd_current_context().await,
        ConfigCommand::GetContexts => cmd_get_contexts().await,
        ConfigCommand::UseContext { name } => cmd_use_context(&name).await,
        ConfigCommand::SetContext {
            name,
            key_env,
            key_file,
            timeout,
        } => {
            let auth = match (key_file, key_env) {
                (None, None) => None,
                (key_file, key_env) => Some(AuthConfig::ApiKey { key_file, key_env }),
            };
            let base_url = ctx.overrides.base_url.clone();
            let project = ctx.overrides.project.clone();
            cmd_set_context(&name, base_url, project, auth, timeout).await
        }
        ConfigCommand::DeleteContext { name } => cmd_delete_context(&name).await,
        ConfigCommand::Path => cmd_path().await,
    }
}

async fn cmd_show(ctx: &Context) -> Result<()> {
    let config = minds_config::load_client_config()?;
    let resolved = minds_config::resolve_connection(&config, &ctx.overrides);

    if ctx.json_output {
        let connection = resolved.as_ref().ok().map(|r| {
            serde_json::json!({
                "base_url": r.base_url,
                "project": r.project,
                "timeout": r.timeout,
                "key_source": r.key_source.to_string(),
                "context": r.context,
            })
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "current_context": config.current_context,
                "contexts": config.context_names(),
                "connection": connection,
            }))?
        );
        return Ok(());
    }

    let dim = Style::new().dim();

    println!("# Minds Client Configuration\n");
    match minds_config::client_config_path() {
        Some(path) if path.exists() => println!("Config file: {}\n", path.display()),
        Some(path) => println!(
            "Config file: {} {}\n",
            path.display(),
            dim.apply_to("(not created yet)")
        ),
        None => println!("Config file: {}\n", dim.apply_to("(no config directory)")),
    }

    match resolved {
        Ok(conn) => {
            println!("Connection:");
            println!("  base url: {}", conn.base_url);
            println!("  project:  {}", conn.project);
            println!("  timeout:  {}s", conn.timeout);
            println!("  api key:  from {}", conn.key_source);
            if let Some(ref name) = conn.context {
                println!("  context:  {}", name);
            }
        }
        Err(e) => {
            println!("Connection: {}", Style::new().red().apply_to(e));
        }
    }
    println!();

    if config.contexts.is_empty() {
        println!("No contexts configured.");
    } else {
        println!("Contexts: {}", config.context_names().join(", "));
    }

    if ctx.verbose {
        println!("\n---\nRaw config:\n");
        println!("{}", config.to_yaml()?);
    }

    Ok(())
}

async fn cmd_path() -> Result<()> {
    if let Some(path) = minds_config::client_config_path() {
        println!("{}", path.display());
    } else {
        eprintln!("Could not determine config directory");
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Context Commands
// ─────────────────────────────────────────────────────────────────────────────

async fn cmd_current_context() -> Result<()> {
    let config = minds_config::load_client_config()?;

    match &config.current_context {
        Some(name) => {
            println!("{}", name);
        }
        None => {
            println!("No current context set. Use 'minds config use-context <name>' to set one.");
        }
    }

    Ok(())
}

async fn cmd_get_contexts() -> Result<()> {
    let config = minds_config::load_client_config()?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!();
        println!("Create one with:");
        println!("  minds config set-context cloud --base-url=https://mdb.ai --key-env=MINDS_API_KEY");
        return Ok(());
    }

    let current = config.current_context.as_deref();

    println!("CURRENT   NAME            BASE URL                       PROJECT");
    for ctx in &config.contexts {
        let marker = if current == Some(ctx.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{}         {:<15} {:<30} {}",
            marker,
            ctx.name,
            ctx.base_url,
            ctx.project.as_deref().unwrap_or(&config.defaults.project)
        );
    }

    Ok(())
}

async fn cmd_use_context(name: &str) -> Result<()> {
    let mut config = minds_config::load_client_config()?;

    config.use_context(name)?;
    minds_config::save_client_config(&config)?;

    println!("Switched to context \"{}\".", name);

    Ok(())
}

async fn cmd_set_context(
    name: &str,
    base_url: Option<String>,
    project: Option<String>,
    auth: Option<AuthConfig>,
    timeout: Option<u64>,
) -> Result<()> {
    let mut config = minds_config::load_client_config()?;

    if let Some(ctx) = config.get_context_mut(name) {
        if let Some(url) = base_url {
            ctx.base_url = url;
        }
        if let Some(project) = project {
            ctx.project = Some(project);
        }
        if let Some(auth) = auth {
            ctx.auth = Some(auth);
        }
        if let Some(t) = timeout {
            ctx.timeout = Some(t);
        }

        println!("Context \"{}\" modified.", name);
    } else {
        let mut ctx = ClientContext::new(
            name,
            base_url.unwrap_or_else(|| minds_config::DEFAULT_BASE_URL.to_string()),
        );
        if let Some(project) = project {
            ctx = ctx.with_project(project);
        }
        if let Some(auth) = auth {
            ctx = ctx.with_auth(auth);
        }
        if let Some(t) = timeout {
            ctx = ctx.with_timeout(t);
        }

        config.set_context(ctx);
        println!("Context \"{}\" created.", name);
    }

    // The first context becomes current
    if config.current_context.is_none() && config.contexts.len() == 1 {
        config.current_context = Some(name.to_string());
        println!("Context \"{}\" set as current context.", name);
    }

    minds_config::save_client_config(&config)?;

    Ok(())
}

async fn cmd_delete_context(name: &str) -> Result<()> {
    let mut config = minds_config::load_client_config()?;

    match config.remove_context(name) {
        Some(_) => {
            minds_config::save_client_config(&config)?;
            println!("Context \"{}\" deleted.", name);
            if config.current_context.is_none() {
                println!(
                    "Note: No current context. Use 'minds config use-context <name>' to set one."
                );
            }
        }
        None => {
            anyhow::bail!("context \"{}\" not found", name);
        }
    }

    Ok(())
}
