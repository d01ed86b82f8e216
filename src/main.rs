//! Command-line interface for xsdmapper

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::Read;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use serde_json::Value as JsonValue;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xsdmapper::converters::select_root;
#[cfg(feature = "cli")]
use xsdmapper::{convert_with_model, ConvertOptions, SchemaModel, SchemaParser, SchemaValidator, SchemaWalker};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdmapper")]
#[command(author, version, about = "Schema-driven JSON to XML conversion", long_about = None)]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a JSON document to XML directed by a schema
    Convert {
        /// Path to the XSD (or WSDL) schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to the JSON input, or `-` for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Root element name
        #[arg(short, long)]
        root: Option<String>,

        /// Indent the output
        #[arg(short, long)]
        pretty: bool,

        /// Validate the input before converting
        #[arg(long)]
        strict: bool,

        /// Omit the XML declaration
        #[arg(long)]
        no_declaration: bool,

        /// JSON file with conversion options; flags override it
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a JSON document against a schema and list every issue
    Validate {
        /// Path to the XSD (or WSDL) schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to the JSON input, or `-` for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Root element name
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Show the resolved schema model
    Inspect {
        /// Path to the XSD (or WSDL) schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output the model as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            schema,
            input,
            root,
            pretty,
            strict,
            no_declaration,
            config,
            output,
        } => cmd_convert(schema, input, root, pretty, strict, no_declaration, config, output),
        Commands::Validate { schema, input, root } => cmd_validate(schema, input, root),
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn read_input(path: &Path) -> CliResult<JsonValue> {
    let text = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

#[cfg(feature = "cli")]
#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    schema_path: PathBuf,
    input: PathBuf,
    root: Option<String>,
    pretty: bool,
    strict: bool,
    no_declaration: bool,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let mut options = match config {
        Some(path) => ConvertOptions::from_json(&fs::read_to_string(path)?)?,
        None => ConvertOptions::new(),
    };
    if root.is_some() {
        options = options.with_root_element(root);
    }
    if pretty {
        options = options.with_pretty_print(true);
    }
    if strict {
        options = options.with_strict(true);
    }
    if no_declaration {
        options = options.with_xml_declaration(false);
    }

    let model = SchemaParser::new().parse(&schema_path, None)?;
    let json = read_input(&input)?;
    let xml = convert_with_model(&json, &model, &options)?;

    match output {
        Some(path) => fs::write(path, &xml)?,
        None => println!("{}", xml),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_validate(schema_path: PathBuf, input: PathBuf, root: Option<String>) -> CliResult<()> {
    let model = SchemaParser::new().parse(&schema_path, None)?;
    let json = read_input(&input)?;
    let options = ConvertOptions::new().with_root_element(root);
    let (root_name, content) = select_root(&json, &model, &options)?;

    let validator = SchemaValidator::new(
        SchemaWalker::new(&model),
        options.attribute_prefix(),
        options.text_node_key(),
    );
    let issues = validator.collect_issues(content, &root_name);

    if issues.is_empty() {
        println!("✓ Input is valid for <{}>", root_name);
        Ok(())
    } else {
        println!("✗ Input is invalid for <{}>", root_name);
        println!();
        println!("Issues:");
        for issue in &issues {
            println!("  - {}", issue);
        }
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, json_output: bool) -> CliResult<()> {
    let model = SchemaParser::new().parse(&schema_path, None)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    print_model_summary(&model);
    Ok(())
}

#[cfg(feature = "cli")]
fn print_model_summary(model: &SchemaModel) {
    println!("xsdmapper v{}", xsdmapper::VERSION);
    println!();
    println!("Schema Information:");
    match &model.target_namespace {
        Some(ns) => println!("  Target Namespace: {}", ns),
        None => println!("  Target Namespace: (none)"),
    }
    if model.root_element.is_empty() {
        println!("  Root Element: (none)");
    } else if model.root_inferred {
        println!("  Root Element: {} (inferred)", model.root_element);
    } else {
        println!("  Root Element: {}", model.root_element);
    }
    println!();
    println!("Statistics:");
    println!("  Global Elements: {}", model.elements.len());
    println!("  Complex Types: {}", model.complex_types.len());
    println!("  Simple Types: {}", model.simple_types.len());

    println!("\n=== Global Elements ===");
    for (name, element) in &model.elements {
        let type_str = match (&element.type_name, &element.inline_complex_type) {
            (Some(type_name), _) => type_name.clone(),
            (None, Some(_)) => "anonymous".to_string(),
            (None, None) => "xs:anyType".to_string(),
        };
        println!("  {} : {}", name, type_str);
    }

    println!("\n=== Complex Types ===");
    for (name, complex_type) in &model.complex_types {
        match &complex_type.extends {
            Some(base) => println!("  {} extends {}", name, base),
            None => println!("  {}", name),
        }
    }

    println!("\n=== Simple Types ===");
    for (name, simple_type) in &model.simple_types {
        match &simple_type.base {
            Some(base) => println!("  {} : {}", name, base),
            None => println!("  {}", name),
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
