//! wire-compiler - generate Rust sources from `.proto` files

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wire_compiler::{Compiler, CompilerConfig};
use wire_schema::IdentifierSet;

/// Compile protocol buffer schemas into Rust
#[derive(Debug, Parser)]
#[command(name = "wire-compiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched for `.proto` files; repeat for more roots
    #[arg(long = "proto-path", value_name = "DIR")]
    proto_paths: Vec<PathBuf>,

    /// Directory generated sources are written below
    #[arg(long = "rust-out", value_name = "DIR")]
    rust_out: PathBuf,

    /// File listing `.proto` files to compile, one per line
    #[arg(long, value_name = "FILE")]
    files: Option<PathBuf>,

    /// Fully-qualified types (or `Type#member`, `pkg.*`) to keep with their dependencies
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    includes: Vec<String>,

    /// Same as `--includes`
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    roots: Vec<String>,

    /// Types to leave out; takes precedence over `--includes`
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    excludes: Vec<String>,

    /// Do not emit `MESSAGE_OPTIONS` and `FIELD_OPTIONS_*` constants
    #[arg(long)]
    no_options: bool,

    /// Only report warnings and errors
    #[arg(long)]
    quiet: bool,

    /// Print the files that would be generated without writing them
    #[arg(long)]
    dry_run: bool,

    /// Module generated type paths start from
    #[arg(long, default_value = "crate", value_name = "PATH")]
    rust_root: String,

    /// `.proto` files to compile; all files under the roots when none are given
    #[arg(value_name = "FILE")]
    sources: Vec<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<CompilerConfig> {
        let mut source_files = Vec::new();
        if let Some(list) = &self.files {
            let text = fs::read_to_string(list)
                .with_context(|| format!("Error processing argument --files={}", list.display()))?;
            source_files.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }
        source_files.extend(self.sources);

        let identifier_set = IdentifierSet::builder()
            .include_all(self.includes.iter().chain(&self.roots))
            .exclude_all(&self.excludes)
            .build();

        Ok(CompilerConfig {
            proto_paths: self.proto_paths,
            out_dir: self.rust_out,
            source_files,
            identifier_set,
            emit_options: !self.no_options,
            dry_run: self.dry_run,
            rust_root: self.rust_root,
        })
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    let dry_run = config.dry_run;
    let report = Compiler::new(config).compile()?;

    if dry_run {
        for path in report.paths() {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Fatal: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_out_is_required() {
        assert!(Cli::try_parse_from(["wire-compiler", "--proto-path", "protos"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["wire-compiler", "--rust-out", "out", "--android"]).is_err());
    }

    #[test]
    fn test_flags_build_config() {
        let cli = Cli::try_parse_from([
            "wire-compiler",
            "--proto-path",
            "protos",
            "--proto-path",
            "vendor",
            "--rust-out",
            "out",
            "--includes",
            "pkg.A,pkg.B",
            "--roots",
            "pkg.C",
            "--excludes",
            "pkg.B#c",
            "--no-options",
            "--dry-run",
            "a.proto",
            "b.proto",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();

        assert_eq!(
            config.proto_paths,
            vec![PathBuf::from("protos"), PathBuf::from("vendor")]
        );
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert_eq!(config.source_files, vec!["a.proto", "b.proto"]);
        let includes: Vec<&str> = config
            .identifier_set
            .includes()
            .iter()
            .map(|rule| rule.as_str())
            .collect();
        assert_eq!(includes, vec!["pkg.A", "pkg.B", "pkg.C"]);
        assert_eq!(config.identifier_set.excludes().len(), 1);
        assert!(!config.emit_options);
        assert!(config.dry_run);
        assert_eq!(config.rust_root, "crate");
    }

    #[test]
    fn test_files_flag_reads_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("protos.include");
        fs::write(&list, "squareup/person.proto\n\nsquareup/geo.proto\n").unwrap();

        let cli = Cli::try_parse_from([
            "wire-compiler",
            "--rust-out",
            "out",
            "--files",
            list.to_str().unwrap(),
            "extra.proto",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(
            config.source_files,
            vec!["squareup/person.proto", "squareup/geo.proto", "extra.proto"]
        );
    }

    #[test]
    fn test_missing_files_list_is_an_error() {
        let cli = Cli::try_parse_from([
            "wire-compiler",
            "--rust-out",
            "out",
            "--files",
            "/nonexistent/protos.include",
        ])
        .unwrap();
        let err = cli.into_config().unwrap_err();
        assert!(err.to_string().starts_with("Error processing argument --files="));
    }
}
