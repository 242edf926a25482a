// src/cli.rs
use crate::app_log;
use crate::core::{ConfigManager, Repository, SupabaseClient};
use crate::landing::{faqs_by_category, load_faqs, Landing};
use crate::web::start_web_server;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pazzle")]
#[command(about = "Recruiting marketplace API for employers")]
pub struct PazzleCli {
    #[command(subcommand)]
    pub command: Option<PazzleCommand>,
}

#[derive(Subcommand)]
pub enum PazzleCommand {
    /// Start the JSON API server (default)
    Serve {
        /// Overrides ROCKET_PORT and the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the featured workers shown on the public landing page
    Landing,
    /// Print the active FAQs grouped by category
    Faqs,
}

pub async fn handle_command(cli: PazzleCli, mut config: ConfigManager) -> Result<()> {
    match cli.command.unwrap_or(PazzleCommand::Serve { port: None }) {
        PazzleCommand::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            start_web_server(config).await
        }
        PazzleCommand::Landing => {
            let landing = Landing::load(&public_repository(&config)?).await;
            app_log!(info, "Loaded {} featured workers", landing.featured.len());

            for card in &landing.featured {
                let age = card
                    .age
                    .map(|age| format!("{} years", age))
                    .unwrap_or_else(|| "age n/a".to_string());
                println!(
                    "[{}] {} ({}) - {} - {}",
                    card.initials,
                    card.name,
                    age,
                    card.occupation.as_deref().unwrap_or("-"),
                    card.languages.join(", ")
                );
            }
            Ok(())
        }
        PazzleCommand::Faqs => {
            let faqs = load_faqs(&public_repository(&config)?).await;
            for group in faqs_by_category(&faqs) {
                println!("== {} ==", group.category);
                for faq in group.faqs {
                    println!("Q: {}\nA: {}\n", faq.question, faq.answer);
                }
            }
            Ok(())
        }
    }
}

fn public_repository(config: &ConfigManager) -> Result<Repository> {
    let client = SupabaseClient::new(
        &config.supabase.url,
        &config.supabase.anon_key,
        config.supabase.timeout_seconds,
    )?;
    Ok(Repository::new(Arc::new(client)))
}
