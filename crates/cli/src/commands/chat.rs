//! `parley chat`: Interactive or single-message persona chat.
//!
//! History lives in memory for the session only.

use std::io::Write;
use parley_agent::{ChatTurn, PersonaChat};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let provider = super::provider(&config)?;
    let notifier = parley_delivery::notifier_from_config(&config);
    let chat = PersonaChat::from_config(&config, provider, notifier.sink);

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = chat.reply(&[], &msg).await?;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    let persona = chat.persona();
    println!();
    println!("  Persona:   {}", persona.name);
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!(
        "  Context:   {} files loaded (~{} tokens)",
        persona.loaded_files.len(),
        persona.estimated_tokens()
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut history: Vec<ChatTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        eprint!("  ...");
        match chat.reply(&history, input).await {
            Ok(reply) => {
                eprint!("\r     \r");
                println!();
                for line in reply.lines() {
                    println!("  {} > {line}", persona.name);
                }
                println!();
                history.push(ChatTurn::user(input));
                history.push(ChatTurn::assistant(reply));
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
