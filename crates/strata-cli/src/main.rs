//! Strata CLI
//!
//! Command-line interface for the Strata metadata catalog: fetch and search
//! assets, and run the governance mutations (tags, terms, certificates,
//! announcements) from scripts or a terminal.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use strata_catalog::search::{fields, FluentSearch, Query};
use strata_catalog::{
    Announcement, AnnouncementType, AnyEntity, CatalogClient, CatalogService, CertificateStatus,
    TagAssignment, TermAssignment,
};

mod config;
mod logging;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Client for the Strata metadata catalog", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, search, and delete assets
    Asset {
        #[command(subcommand)]
        action: AssetCommands,
    },

    /// Attach and detach tags
    Tag {
        #[command(subcommand)]
        action: TagCommands,
    },

    /// Assign and remove glossary terms
    Term {
        #[command(subcommand)]
        action: TermCommands,
    },

    /// Set and unset certificates
    Certificate {
        #[command(subcommand)]
        action: CertificateCommands,
    },

    /// Set and unset announcements
    Announcement {
        #[command(subcommand)]
        action: AnnouncementCommands,
    },

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },

    /// Check connectivity to the tenant
    Health,
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Get an asset by GUID or by type + qualifiedName
    Get {
        /// Asset GUID
        #[arg(long, conflicts_with_all = ["type_name", "qualified_name"])]
        guid: Option<String>,

        /// Asset type name, e.g. Table
        #[arg(long, requires = "qualified_name")]
        type_name: Option<String>,

        /// Asset qualifiedName
        #[arg(long, requires = "type_name")]
        qualified_name: Option<String>,
    },

    /// Search for assets
    Search {
        /// Restrict to one asset type
        #[arg(long)]
        type_name: Option<String>,

        /// qualifiedName prefix, e.g. default/postgres/
        #[arg(long)]
        prefix: Option<String>,

        /// Exact name to match
        #[arg(long)]
        name: Option<String>,

        /// Include soft-deleted assets
        #[arg(long)]
        include_deleted: bool,

        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Delete an asset by GUID
    Delete {
        /// Asset GUID
        #[arg(long)]
        guid: String,

        /// Hard-delete instead of soft-delete
        #[arg(long)]
        purge: bool,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Attach a tag to an asset
    Add {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        /// Tag name
        #[arg(long)]
        tag: String,
        /// Propagate the tag to downstream assets
        #[arg(long)]
        propagate: bool,
    },

    /// Detach a tag from an asset
    Remove {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        /// Tag name
        #[arg(long)]
        tag: String,
    },
}

#[derive(Subcommand)]
enum TermCommands {
    /// Assign a glossary term to an asset
    Add {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        /// GUID of the glossary term
        #[arg(long)]
        term_guid: String,
    },

    /// Remove a glossary term from an asset
    Remove {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        /// GUID of the glossary term
        #[arg(long)]
        term_guid: String,
    },
}

#[derive(Subcommand)]
enum CertificateCommands {
    /// Set the certificate on an asset
    Set {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        /// Asset name (required alongside qualifiedName for updates)
        #[arg(long)]
        name: String,
        /// verified, draft, or deprecated
        #[arg(long)]
        status: String,
        /// Optional status message
        #[arg(long)]
        message: Option<String>,
    },

    /// Remove the certificate from an asset
    Unset {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum AnnouncementCommands {
    /// Set the announcement on an asset
    Set {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        #[arg(long)]
        name: String,
        /// information, warning, or issue
        #[arg(long, default_value = "information")]
        kind: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
    },

    /// Remove the announcement from an asset
    Unset {
        #[arg(long)]
        type_name: String,
        #[arg(long)]
        qualified_name: String,
        #[arg(long)]
        name: String,
    },
}

fn parse_certificate_status(s: &str) -> Result<CertificateStatus> {
    match s.to_lowercase().as_str() {
        "verified" => Ok(CertificateStatus::Verified),
        "draft" => Ok(CertificateStatus::Draft),
        "deprecated" => Ok(CertificateStatus::Deprecated),
        _ => bail!("Invalid certificate status: {} (expected verified, draft, or deprecated)", s),
    }
}

fn parse_announcement_type(s: &str) -> Result<AnnouncementType> {
    match s.to_lowercase().as_str() {
        "information" => Ok(AnnouncementType::Information),
        "warning" => Ok(AnnouncementType::Warning),
        "issue" => Ok(AnnouncementType::Issue),
        _ => bail!("Invalid announcement type: {} (expected information, warning, or issue)", s),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => {
            let default_path = PathBuf::from("strata.yaml");
            if default_path.exists() {
                AppConfig::load(&default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn print_entity(entity: &AnyEntity, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entity)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {}",
                entity.type_name.bold(),
                entity.guid.as_deref().unwrap_or("-").dimmed()
            );
            if let Some(qn) = entity.attr_str("qualifiedName") {
                println!("  qualifiedName: {}", qn);
            }
            if let Some(name) = entity.attr_str("name") {
                println!("  name:          {}", name);
            }
            if let Some(status) = &entity.status {
                println!("  status:        {}", status);
            }
            if let Some(description) = entity.attr_str("description") {
                println!("  description:   {}", description);
            }
            if let Some(certificate) = entity.attr_str("certificateStatus") {
                println!("  certificate:   {}", certificate.green());
            }
            if !entity.classifications.is_empty() {
                let tags: Vec<&str> = entity
                    .classifications
                    .iter()
                    .map(|t| t.type_name.as_str())
                    .collect();
                println!("  tags:          {}", tags.join(", ").cyan());
            }
            if !entity.meanings.is_empty() {
                let terms: Vec<String> = entity
                    .meanings
                    .iter()
                    .map(|t| {
                        t.display_text
                            .clone()
                            .unwrap_or_else(|| t.term_guid.clone())
                    })
                    .collect();
                println!("  terms:         {}", terms.join(", "));
            }
        }
    }
    Ok(())
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let format = cli.format;

    // Config display needs no client.
    if let Commands::Config { show_secrets } = &cli.command {
        let shown = if *show_secrets {
            config.clone()
        } else {
            config.redact_secrets()
        };
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
            OutputFormat::Text => println!("{}", serde_yaml::to_string(&shown)?),
        }
        return Ok(());
    }

    let client = CatalogClient::new(config.to_client_config()?)
        .context("Failed to create catalog client")?;

    match cli.command {
        Commands::Config { .. } => unreachable!("handled above"),

        Commands::Health => {
            let health = client.health_check().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                OutputFormat::Text => println!("{:?}", health),
            }
        }

        Commands::Asset { action } => match action {
            AssetCommands::Get {
                guid,
                type_name,
                qualified_name,
            } => {
                let entity = match (guid, type_name, qualified_name) {
                    (Some(guid), _, _) => client.get_by_guid(&guid).await?,
                    (None, Some(type_name), Some(qualified_name)) => {
                        client
                            .get_by_qualified_name(&type_name, &qualified_name)
                            .await?
                    }
                    _ => bail!("Provide either --guid or --type-name with --qualified-name"),
                };
                print_entity(&entity, format)?;
            }

            AssetCommands::Search {
                type_name,
                prefix,
                name,
                include_deleted,
                limit,
            } => {
                let mut search = FluentSearch::new().page_size(limit);
                if let Some(type_name) = type_name {
                    search = search.of_type(type_name);
                }
                if !include_deleted {
                    search = search.active_only();
                }
                if let Some(prefix) = prefix {
                    search = search.where_(Query::prefix(fields::QUALIFIED_NAME, prefix));
                }
                if let Some(name) = name {
                    search = search.where_(Query::term(fields::NAME, name));
                }

                let response = search.execute(&client).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&response.entities)?)
                    }
                    OutputFormat::Text => {
                        println!(
                            "{} of ~{} result(s)",
                            response.entities.len(),
                            response.approximate_count
                        );
                        for entity in &response.entities {
                            println!(
                                "  {:<16} {}",
                                entity.type_name.bold(),
                                entity.attr_str("qualifiedName").unwrap_or("-")
                            );
                        }
                    }
                }
            }

            AssetCommands::Delete { guid, purge } => {
                let response = if purge {
                    client.purge_by_guid(&guid).await?
                } else {
                    client.delete_by_guid(&guid).await?
                };
                let verb = if purge { "Purged" } else { "Deleted" };
                println!(
                    "{} {} asset(s)",
                    verb.red(),
                    response.mutated_entities.delete.len()
                );
            }
        },

        Commands::Tag { action } => match action {
            TagCommands::Add {
                type_name,
                qualified_name,
                tag,
                propagate,
            } => {
                client
                    .add_tags(
                        &type_name,
                        &qualified_name,
                        vec![TagAssignment::new(&tag).with_propagate(propagate)],
                    )
                    .await?;
                println!("Added tag {} to {}", tag.cyan(), qualified_name);
            }

            TagCommands::Remove {
                type_name,
                qualified_name,
                tag,
            } => {
                client.remove_tag(&type_name, &qualified_name, &tag).await?;
                println!("Removed tag {} from {}", tag.cyan(), qualified_name);
            }
        },

        Commands::Term { action } => match action {
            TermCommands::Add {
                type_name,
                qualified_name,
                term_guid,
            } => {
                client
                    .append_terms(
                        &type_name,
                        &qualified_name,
                        vec![TermAssignment::new(&term_guid)],
                    )
                    .await?;
                println!("Assigned term {} to {}", term_guid, qualified_name);
            }

            TermCommands::Remove {
                type_name,
                qualified_name,
                term_guid,
            } => {
                client
                    .remove_terms(&type_name, &qualified_name, vec![term_guid.clone()])
                    .await?;
                println!("Removed term {} from {}", term_guid, qualified_name);
            }
        },

        Commands::Certificate { action } => match action {
            CertificateCommands::Set {
                type_name,
                qualified_name,
                name,
                status,
                message,
            } => {
                let status = parse_certificate_status(&status)?;
                client
                    .update_certificate(&type_name, &qualified_name, &name, status, message)
                    .await?;
                println!("Set certificate {} on {}", status.to_string().green(), qualified_name);
            }

            CertificateCommands::Unset {
                type_name,
                qualified_name,
                name,
            } => {
                client
                    .remove_certificate(&type_name, &qualified_name, &name)
                    .await?;
                println!("Removed certificate from {}", qualified_name);
            }
        },

        Commands::Announcement { action } => match action {
            AnnouncementCommands::Set {
                type_name,
                qualified_name,
                name,
                kind,
                title,
                message,
            } => {
                let kind = parse_announcement_type(&kind)?;
                client
                    .update_announcement(
                        &type_name,
                        &qualified_name,
                        &name,
                        Announcement::new(kind, title, message),
                    )
                    .await?;
                println!("Set announcement on {}", qualified_name);
            }

            AnnouncementCommands::Unset {
                type_name,
                qualified_name,
                name,
            } => {
                client
                    .remove_announcement(&type_name, &qualified_name, &name)
                    .await?;
                println!("Removed announcement from {}", qualified_name);
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init_logging(level, config.logging.json_format);
    tracing::debug!(config = ?config.redact_secrets(), "Loaded configuration");

    run(cli, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_certificate_status() {
        assert_eq!(
            parse_certificate_status("verified").unwrap(),
            CertificateStatus::Verified
        );
        assert_eq!(
            parse_certificate_status("DRAFT").unwrap(),
            CertificateStatus::Draft
        );
        assert!(parse_certificate_status("golden").is_err());
    }

    #[test]
    fn test_parse_announcement_type() {
        assert_eq!(
            parse_announcement_type("warning").unwrap(),
            AnnouncementType::Warning
        );
        assert!(parse_announcement_type("banner").is_err());
    }

    #[test]
    fn test_cli_parses_asset_get() {
        let cli = Cli::try_parse_from([
            "strata",
            "asset",
            "get",
            "--type-name",
            "Table",
            "--qualified-name",
            "default/postgres/1/sales/public/orders",
        ])
        .unwrap();
        match cli.command {
            Commands::Asset {
                action: AssetCommands::Get {
                    guid, type_name, ..
                },
            } => {
                assert!(guid.is_none());
                assert_eq!(type_name.as_deref(), Some("Table"));
            }
            _ => panic!("Parsed into the wrong command"),
        }
    }

    #[test]
    fn test_cli_rejects_guid_with_qualified_name() {
        let result = Cli::try_parse_from([
            "strata",
            "asset",
            "get",
            "--guid",
            "abc",
            "--type-name",
            "Table",
            "--qualified-name",
            "x/y",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_certificate_set() {
        let cli = Cli::try_parse_from([
            "strata",
            "certificate",
            "set",
            "--type-name",
            "Table",
            "--qualified-name",
            "x/y/z",
            "--name",
            "z",
            "--status",
            "verified",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Certificate {
                action: CertificateCommands::Set { .. }
            }
        ));
    }
}
