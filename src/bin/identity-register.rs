use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tracing_subscriber::EnvFilter;

use identity_register::{
    CatalogBackend, RegisterConfig,
    cli_utils::{self, OutputFormat},
    commands::{handle_apply_command, handle_parse_table_command, handle_validate_command},
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Path to a YAML or JSON configuration file")]
    config: Option<String>,
    #[arrrg(optional, "Administration tool to run (default: keystone)")]
    tool: Option<String>,
    #[arrrg(optional, "Catalog backend: sql, kvs or templated (default: sql)")]
    catalog_backend: Option<String>,
    #[arrrg(optional, "Output format for reports: json or yaml (default: json)")]
    output: OutputFormat,
    #[arrrg(flag, "Enable debug logging")]
    verbose: bool,
}

const USAGE: &str = r#"Usage: identity-register [options] <command> [args...]

Options:
  --config <file>            YAML or JSON configuration file
  --tool <name>              Administration tool to run (default: keystone)
  --catalog-backend <mode>   Catalog backend: sql, kvs or templated (default: sql)
  --output <format>          Output format for reports: json or yaml (default: json)
  --verbose                  Enable debug logging

Commands:
  apply <manifest>...        Reconcile every object declared in the manifests
  validate <manifest>...     Check manifests without running the tool
  parse-table [file]         Parse tool output from a file or stdin and print the rows

Environment:
  OS_SERVICE_ENDPOINT        Service endpoint, unless set in the configuration
  OS_SERVICE_TOKEN           Service token, unless set in the configuration
  RUST_LOG                   Log filter, overrides --verbose"#;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(options: &Options) -> RegisterConfig {
    let mut config = match &options.config {
        Some(path) => {
            RegisterConfig::load(path).unwrap_or_else(|e| cli_utils::exit_with_handled(&e))
        }
        None => RegisterConfig::default(),
    }
    .with_environment();

    if let Some(tool) = &options.tool {
        config.tool = tool.clone();
    }
    if let Some(backend) = &options.catalog_backend {
        config.catalog_backend = backend
            .parse::<CatalogBackend>()
            .unwrap_or_else(|e| cli_utils::exit_with_usage_error(&e, USAGE));
    }
    config
}

fn main() {
    let (options, free) =
        Options::from_command_line_relaxed("USAGE: identity-register <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    init_logging(options.verbose);

    match free[0].as_str() {
        "apply" => {
            let config = load_config(&options);
            handle_apply_command(&free, &config, options.output);
        }
        "validate" => {
            handle_validate_command(&free, options.output);
        }
        "parse-table" => {
            handle_parse_table_command(&free, options.output);
        }
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: apply, validate, parse-table",
                free[0]
            ));
        }
    }
}
