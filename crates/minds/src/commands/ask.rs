//! Ask command - one-shot question to a mind.

use anyhow::Result;
use clap::Args;
use console::Style;
use futures::StreamExt;
use std::io::Write;

use super::Context;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Mind to ask
    pub mind: String,

    /// The question to send
    #[arg(required = true)]
    pub message: String,

    /// Wait for the full answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect()?;
    let completions = client.completions();

    if ctx.verbose {
        eprintln!(
            "{}",
            Style::new()
                .dim()
                .apply_to(format!("Asking {} at {}", args.mind, client.base_url()))
        );
    }

    if args.no_stream || ctx.json_output {
        let answer = completions.complete(&args.mind, args.message).await?;
        if ctx.json_output {
            println!(
                "{}",
                serde_json::json!({ "mind": args.mind, "answer": answer })
            );
        } else {
            println!("{}", answer);
        }
        return Ok(());
    }

    let mut stream = completions.stream(&args.mind, args.message).await?;
    let mut has_output = false;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                if !chunk.content.is_empty() {
                    print!("{}", chunk.content);
                    std::io::stdout().flush()?;
                    has_output = true;
                }
            }
            Err(e) => {
                if has_output {
                    println!();
                }
                return Err(e.into());
            }
        }
    }

    if has_output {
        println!();
    }

    Ok(())
}
