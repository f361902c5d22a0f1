//! `parley research`: Run the research pipeline and print its progress.

use parley_research::{ResearchEvent, ResearchManager};

pub async fn run(query: String) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let provider = super::provider(&config)?;
    let mailer = parley_delivery::mailer_from_config(&config);
    let manager = ResearchManager::from_config(&config, provider, mailer.sink);

    let mut rx = manager.run(query);
    while let Some(item) = rx.recv().await {
        match item? {
            ResearchEvent::Report { report } => {
                println!();
                println!("{}", report.markdown_report);
                if !report.follow_up_questions.is_empty() {
                    println!();
                    println!("Follow-up questions:");
                    for question in &report.follow_up_questions {
                        println!("  - {question}");
                    }
                }
            }
            event => println!("{}", event.text()),
        }
    }

    Ok(())
}
