//! FXForge Tool - Main Entry Point
//!
//! Thin shell over the document model: load a document, print a structural
//! report, strip unresolvable imports, or normalize formatting.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use fxf_om::{remove_imports, FxomDocument, SaveOptions};
use fxf_registry::{toolkit, Import, Registry};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        usage();
        return Ok(());
    };
    match command.as_str() {
        "report" => report(rest),
        "normalize" => normalize(rest),
        "clean-imports" => clean_imports(rest),
        _ => {
            usage();
            bail!("unknown command: {command}");
        }
    }
}

fn usage() {
    eprintln!("usage: fxf-tool <report|normalize|clean-imports> <file>");
}

fn load(path: &Path) -> Result<FxomDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let registry = Arc::new(toolkit::standard_registry());
    FxomDocument::open_with_resources(&text, registry, None, Some(path.to_path_buf()))
        .with_context(|| format!("loading {}", path.display()))
}

fn single_file(args: &[String]) -> Result<&Path> {
    match args {
        [file] => Ok(Path::new(file)),
        _ => bail!("expected exactly one file argument"),
    }
}

/// Print a structural summary of a document
fn report(args: &[String]) -> Result<()> {
    let path = single_file(args)?;
    let doc = load(path)?;

    match doc.root() {
        Some(root) => {
            let classes = doc.collect_declared_classes();
            let ids = doc.collect_ids();
            println!("objects:   {}", doc.descendants(root).len());
            println!("classes:   {}", classes.len());
            for class in &classes {
                println!("  {class}");
            }
            println!("fx:ids:    {}", ids.len());
            for (id, _) in &ids {
                println!("  {id}");
            }
            if let Some(controller) = doc.controller_name() {
                println!("controller: {controller}");
            }
        }
        None => println!("document has no root object"),
    }
    Ok(())
}

/// Re-save with normalized indentation and current imports, to stdout
fn normalize(args: &[String]) -> Result<()> {
    let path = single_file(args)?;
    let mut doc = load(path)?;
    let text = doc.save(&SaveOptions {
        wildcard_imports: false,
        normalize_indentation: true,
    });
    print!("{text}");
    Ok(())
}

/// Strip imports naming types the standard registry cannot resolve
fn clean_imports(args: &[String]) -> Result<()> {
    let path = single_file(args)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let markup = fxf_markup::parse(&text)
        .with_context(|| format!("parsing {}", path.display()))?;

    let registry: Registry = toolkit::standard_registry();
    let unresolved: BTreeSet<String> = markup
        .header_instructions("import")
        .into_iter()
        .filter_map(|(_, directive)| match Import::parse(&directive) {
            Import::Type(qualified) if registry.resolve_qualified(&qualified).is_none() => {
                Some(qualified)
            }
            _ => None,
        })
        .collect();

    let cleaned = remove_imports(&text, &unresolved, |name| {
        eprintln!("removed import: {name}");
    });
    print!("{cleaned}");
    Ok(())
}
