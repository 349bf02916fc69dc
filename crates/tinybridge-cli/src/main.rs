use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use tinybridge_core::{
    complete, init_tracing, merge, prune_classes, read_config, resolve_field_types, reverse,
    synthesize_constructors, synthesize_parameter_names, verify_field_types, write_tiny_v2,
    BytecodeInheritanceProvider, CachingInheritanceProvider, CascadingInheritanceProvider,
    ConstructorTable, DirectoryClassBytesProvider, StaticMethodSet, SynthesizerConfig,
    TableInheritanceProvider,
};
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let matches = Command::new("tinybridge")
        .version(tinybridge_core::VERSION)
        .about("Composes namespace mapping tables into a single tiny v2 mapping")
        .arg(
            Arg::new("config")
                .value_name("CONFIG")
                .help("Pipeline config JSON (names the mapping and side-table files)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("classes")
                .long("classes")
                .value_name("DIR")
                .help("Directory of extracted .class files for inheritance context")
                .required(true),
        )
        .arg(
            Arg::new("secondary")
                .long("secondary")
                .value_name("FILE")
                .help("Secondary mapping table sharing the source namespace (carries field types)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .help("Output tiny v2 file")
                .default_value("mappings.tiny"),
        )
        .arg(
            Arg::new("source-ns")
                .long("source-ns")
                .value_name("NAME")
                .help("Shared source namespace label")
                .default_value("official"),
        )
        .arg(
            Arg::new("primary-ns")
                .long("primary-ns")
                .value_name("NAME")
                .help("Primary table's target namespace label")
                .default_value("srg"),
        )
        .arg(
            Arg::new("secondary-ns")
                .long("secondary-ns")
                .value_name("NAME")
                .help("Secondary table's target namespace label")
                .default_value("intermediary"),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Skip the strict field-signature completeness check")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = PathBuf::from(matches.get_one::<String>("config").expect("required"));
    let classes = PathBuf::from(matches.get_one::<String>("classes").expect("required"));
    let secondary_path = PathBuf::from(matches.get_one::<String>("secondary").expect("required"));
    let output = PathBuf::from(matches.get_one::<String>("output").expect("defaulted"));
    let source_ns = matches.get_one::<String>("source-ns").expect("defaulted");
    let primary_ns = matches.get_one::<String>("primary-ns").expect("defaulted");
    let secondary_ns = matches.get_one::<String>("secondary-ns").expect("defaulted");
    let strict = !matches.get_flag("lenient");

    let config_text = fs::read_to_string(&config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    let config_json: serde_json::Value =
        serde_json::from_str(&config_text).context("config is not valid JSON")?;
    let config = read_config(&config_json)?;

    // Side-table paths in the config are relative to the config file
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mappings_text = read_input(base, &config.mappings)?;
    let statics_text = read_input(base, &config.static_methods)?;
    let constructors_text = read_input(base, &config.constructors)?;
    let secondary_text = fs::read_to_string(&secondary_path)
        .with_context(|| format!("reading secondary table {}", secondary_path.display()))?;

    info!("parsing mapping tables");
    let mut primary = tinybridge_core::reader::parse(&mappings_text, source_ns, primary_ns)?;
    let mut secondary = tinybridge_core::reader::parse(&secondary_text, source_ns, secondary_ns)?;
    let static_methods = StaticMethodSet::parse(&statics_text);
    let constructors = ConstructorTable::parse(&constructors_text)?;
    info!(
        statics = static_methods.len(),
        constructors = constructors.len(),
        "parsed side tables"
    );

    if !config.prune.is_empty() {
        prune_classes(&mut primary, &config.prune);
    }

    info!("completing inheritance");
    let mut cascade = CascadingInheritanceProvider::new();
    cascade.install(Box::new(BytecodeInheritanceProvider::new(
        DirectoryClassBytesProvider::new(&classes),
    )));
    cascade.install(Box::new(TableInheritanceProvider::with_platform_roots()));
    let provider = CachingInheritanceProvider::new(cascade);
    complete(&mut primary, &provider)?;
    complete(&mut secondary, &provider)?;

    info!("backfilling field types from the secondary table");
    resolve_field_types(&mut primary, &secondary);

    info!("synthesizing parameter and constructor names");
    let synth_config = SynthesizerConfig::default();
    let primary_reversed = reverse(&primary);
    synthesize_parameter_names(&mut primary, &synth_config);
    synthesize_constructors(&mut primary, &constructors, &primary_reversed, &synth_config)?;

    info!(
        source = primary_ns.as_str(),
        target = secondary_ns.as_str(),
        "composing mapping sets"
    );
    let composed = merge(&reverse(&primary), &secondary);
    if strict {
        verify_field_types(&composed)?;
    }

    let file = fs::File::create(&output)
        .with_context(|| format!("creating output {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    write_tiny_v2(&composed, &mut writer)?;
    info!(output = %output.display(), "wrote composed mappings");

    Ok(())
}

fn read_input(base: &Path, relative: &str) -> Result<String> {
    let path = base.join(relative);
    fs::read_to_string(&path).with_context(|| format!("reading input {}", path.display()))
}
