use bson::Bson;
use clap::{Parser, Subcommand};
use nexusquery::config::ServiceConfig;
use nexusquery::envelope::{error_response, success_response};
use nexusquery::query::{ArrayKeying, CompileOptions, FilterTerm, Filters, Policy};
use nexusquery::{ApiError, ParameterSet, Schema};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nexusquery", version, about = "Compile HTTP query strings into storage filters", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, env and defaults are used.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Compile a query string and print the filter descriptor as JSON")]
    Compile {
        #[arg(help = "Query string, e.g. 'status=open&page=2&limit=20'")]
        query: String,
        #[arg(long, default_value = "", help = "Schema declarations, e.g. age=int,tags=array,since=date")]
        schema: String,
        #[arg(long = "extra", value_name = "KEY=VALUE", help = "Trusted string filter merged over the query (repeatable)")]
        extra: Vec<String>,
        #[arg(long, help = "File array predicates under _id when the last element is an identifier")]
        legacy_array_keys: bool,
        #[arg(long, help = "Log and ignore malformed page/limit/offset instead of failing")]
        lenient_pagination: bool,
        #[arg(long, help = "Fail on malformed date fields instead of skipping them")]
        strict_dates: bool,
        #[arg(long, help = "Fail on a malformed id parameter instead of ignoring it")]
        strict_id: bool,
    },
}

fn parse_extra(pairs: &[String]) -> Result<Filters, String> {
    pairs
        .iter()
        .map(|p| {
            let (k, v) = p.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {p:?}"))?;
            Ok((k.to_string(), FilterTerm::Value(Bson::String(v.to_string()))))
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();
    let explicit = ServiceConfig { log_level: cli.log_level.clone(), ..ServiceConfig::default() };
    let cfg = match ServiceConfig::load(explicit, cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => { eprintln!("error: {e}"); std::process::exit(1); }
    };
    if let Err(e) = nexusquery::logger::configure_from_config(&cfg) {
        eprintln!("warning: logging disabled: {e}");
    }

    match cli.command {
        Commands::Compile { query, schema, extra, legacy_array_keys, lenient_pagination, strict_dates, strict_id } => {
            let schema: Schema = match schema.parse() {
                Ok(s) => s,
                Err(e) => { eprintln!("error: {e}"); std::process::exit(2); }
            };
            let extra = match parse_extra(&extra) {
                Ok(f) => f,
                Err(e) => { eprintln!("error: {e}"); std::process::exit(2); }
            };
            let mut opts = CompileOptions::default();
            if legacy_array_keys { opts = opts.with_array_keying(ArrayKeying::LastElement); }
            if lenient_pagination { opts = opts.with_pagination(Policy::Lenient); }
            if strict_dates { opts = opts.with_dates(Policy::Strict); }
            if strict_id { opts = opts.with_base_id(Policy::Strict); }

            let params = ParameterSet::parse(&query);
            let result = nexusquery::compile_with(&params, &schema, &opts)
                .map_err(ApiError::from)
                .and_then(|desc| {
                    let filters = nexusquery::merge(&desc.filters, &extra);
                    let filter = Bson::Document(nexusquery::query::filters_to_document(&filters));
                    success_response(
                        json!({
                            "filter": filter.into_relaxed_extjson(),
                            "projection": desc.projection_document().map(|d| Bson::Document(d).into_relaxed_extjson()),
                            "sort": desc.sort_document().map(|d| Bson::Document(d).into_relaxed_extjson()),
                            "page": desc.page,
                            "limit": desc.limit,
                            "offset": desc.offset,
                            "skip": desc.skip,
                        }),
                        None,
                    )
                });
            match result {
                Ok((_, body)) => println!("{body}"),
                Err(e) => {
                    let (_, body) = error_response(&e, None);
                    eprintln!("{body}");
                    std::process::exit(2);
                }
            }
        }
    }
}
