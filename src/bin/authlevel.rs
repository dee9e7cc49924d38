//! Classification policy CLI
//!
//! Runs the point check and the query rewrite outside of a host, for
//! checking a policy config against concrete users.
//!
//! # Usage
//!
//! ```bash
//! # Point decision
//! authlevel check --user alice --groups ACA-FR --classification MCD_HOFLD
//!
//! # Query rewrite, optionally on top of an existing JSON filter
//! authlevel rewrite --user hq --groups ACA-HO --from Document \
//!     --filter-json '{"eq":{"field":"ecm:primaryType","value":"File"}}'
//!
//! # Alternate rule table
//! AUTHLEVEL_POLICY_CONFIG=policy.yaml authlevel rules
//! ```

use anyhow::Context;
use authlevel_policy::{
    AccessCheck, AuthLevelPolicy, Decision, DocumentRecord, Filter, PolicyConfig, Principal, Query,
    QueryTransformer, SecurityPolicy, StaticDirectory,
};
use std::fmt::Write as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "authlevel")]
#[command(version = "0.1.0")]
#[command(about = "Evaluate classification access decisions and query restrictions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Policy config file; defaults apply when neither this nor the variable is set
    #[arg(long, short, global = true, env = "AUTHLEVEL_POLICY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether a user may read a document with the given classification
    Check {
        #[arg(long)]
        user: String,

        /// Comma-separated group memberships
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,

        /// Classification code (omit for an unclassified document)
        #[arg(long)]
        classification: Option<String>,
    },

    /// Apply the listing restriction to a query
    Rewrite {
        #[arg(long)]
        user: String,

        /// Comma-separated group memberships
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,

        /// Document type to select from
        #[arg(long, default_value = "Document")]
        from: String,

        /// Existing WHERE filter as JSON
        #[arg(long)]
        filter_json: Option<String>,
    },

    /// Print the effective rule table
    Rules,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PolicyConfig> {
    match path {
        Some(path) if !is_blank(path) => PolicyConfig::from_file(path)
            .with_context(|| format!("loading policy config {}", path.display())),
        _ => Ok(PolicyConfig::default()),
    }
}

fn is_blank(path: &Path) -> bool {
    path.to_str().is_some_and(|s| s.trim().is_empty())
}

fn parse_filter_json(filter_json: Option<&str>) -> anyhow::Result<Option<Filter>> {
    filter_json
        .map(serde_json::from_str::<Filter>)
        .transpose()
        .context("parsing --filter-json")
}

fn check_decision(
    config: &PolicyConfig,
    principal: &Principal,
    classification: Option<&str>,
) -> anyhow::Result<Decision> {
    let policy = AuthLevelPolicy::from_config(config, Arc::new(StaticDirectory::new()))?;
    let mut document = DocumentRecord::new("cli");
    if let Some(code) = classification {
        document = document.with_property(policy.classification_field(), code);
    }
    Ok(policy.check_permission(&AccessCheck::new(&document, principal, "Read")))
}

fn rewrite_query(
    config: &PolicyConfig,
    principal: Principal,
    from: &str,
    existing: Option<Filter>,
) -> anyhow::Result<Query> {
    let user = principal.name.clone();
    let directory = StaticDirectory::new().with_principal(principal);
    let policy = AuthLevelPolicy::from_config(config, Arc::new(directory))?;
    let query = Query::select_all(from).with_where(existing);
    Ok(policy.query_transformer("default").transform(&user, &query)?)
}

fn render_rules(config: &PolicyConfig, format: OutputFormat) -> anyhow::Result<String> {
    let table = config.rule_table()?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&table)?),
        OutputFormat::Text => {
            let mut out = format!("field: {}", config.classification_field);
            for rule in table.rules() {
                write!(out, "\n{:<16} {}", rule.code, rule.required_group)?;
            }
            Ok(out)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Check {
            user,
            groups,
            classification,
        } => {
            let principal = Principal::new(user, groups);
            let decision = check_decision(&config, &principal, classification.as_deref())?;
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "user": principal.name,
                        "classification": classification,
                        "decision": decision,
                    })
                ),
                OutputFormat::Text => println!("{}", decision),
            }
        }
        Commands::Rewrite {
            user,
            groups,
            from,
            filter_json,
        } => {
            let existing = parse_filter_json(filter_json.as_deref())?;
            let rewritten = rewrite_query(&config, Principal::new(user, groups), &from, existing)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rewritten)?),
                OutputFormat::Text => println!("{}", rewritten),
            }
        }
        Commands::Rules => println!("{}", render_rules(&config, cli.format)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use authlevel_policy::CONFIG_ENV_VAR;
    use clap::CommandFactory;

    const FIELD: &str = "file_schema:auth_level_cde";

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_arg_reads_env_var() {
        let cmd = Cli::command();
        let config = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new(CONFIG_ENV_VAR)));
    }

    #[test]
    fn test_parse_rewrite_args() {
        let cli = Cli::try_parse_from([
            "authlevel",
            "--config",
            "policy.yaml",
            "rewrite",
            "--user",
            "hq",
            "--groups",
            "ACA-HO,members",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("policy.yaml")));
        match cli.command {
            Commands::Rewrite { user, groups, from, filter_json } => {
                assert_eq!(user, "hq");
                assert_eq!(groups, vec!["ACA-HO", "members"]);
                assert_eq!(from, "Document");
                assert!(filter_json.is_none());
            }
            _ => panic!("expected rewrite"),
        }
    }

    #[test]
    fn test_load_config_blank_path_gives_defaults() {
        let config = load_config(Some(&PathBuf::from(" "))).unwrap();
        assert_eq!(config, PolicyConfig::default());
        assert_eq!(load_config(None).unwrap(), PolicyConfig::default());
    }

    #[test]
    fn test_load_config_missing_file_names_path() {
        let err = load_config(Some(&PathBuf::from("/nonexistent/policy.yaml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/policy.yaml"));
    }

    #[test]
    fn test_check_decisions() {
        let config = PolicyConfig::default();
        let field_user = Principal::new("alice", ["ACA-FR"]);
        assert_eq!(
            check_decision(&config, &field_user, Some("MCD_HOFLD")).unwrap(),
            Decision::Grant
        );
        assert_eq!(
            check_decision(&config, &field_user, Some("MCD_HOONLY")).unwrap(),
            Decision::Deny
        );
        assert_eq!(check_decision(&config, &field_user, None).unwrap(), Decision::Unknown);
    }

    #[test]
    fn test_rewrite_appends_restriction_to_json_filter() {
        let existing =
            parse_filter_json(Some(r#"{"eq":{"field":"ecm:primaryType","value":"File"}}"#)).unwrap();
        let query = rewrite_query(
            &PolicyConfig::default(),
            Principal::new("hq", ["ACA-HO"]),
            "Document",
            existing,
        )
        .unwrap();
        assert_eq!(
            query.to_string(),
            format!(
                "SELECT * FROM Document WHERE ecm:primaryType = 'File' AND \
                 ({FIELD} IS NULL OR {FIELD} IN ('MCD_DEFAULT', 'MCD_HOONLY'))"
            )
        );
    }

    #[test]
    fn test_rewrite_privileged_user_unrestricted() {
        let query = rewrite_query(
            &PolicyConfig::default(),
            Principal::new("Administrator", ["ACA-HO"]),
            "Document",
            None,
        )
        .unwrap();
        assert_eq!(query, Query::select_all("Document"));
    }

    #[test]
    fn test_invalid_filter_json_rejected() {
        let err = parse_filter_json(Some("{not json")).unwrap_err();
        assert!(format!("{:#}", err).contains("--filter-json"));
        assert!(parse_filter_json(None).unwrap().is_none());
    }

    #[test]
    fn test_render_rules_text() {
        let text = render_rules(&PolicyConfig::default(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], format!("field: {FIELD}"));
        assert!(lines[3].starts_with("MCD_HOFLD"));
        assert!(lines[3].ends_with("ACA-FR"));
    }

    #[test]
    fn test_render_rules_json() {
        let json = render_rules(&PolicyConfig::default(), OutputFormat::Json).unwrap();
        assert!(json.contains("MCD_HOCLNT"));
    }
}
