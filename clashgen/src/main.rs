//! Generate a complete proxy-engine configuration from a base one

use anyhow::{Context, Result};
use clap::Parser;
use clashgen_core::{ConfigLoader, Document, Pipeline, Profile};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clashgen",
    about = "Generate a complete proxy-engine configuration from a base one",
    version
)]
struct Args {
    /// Base configuration (YAML); `-` or absent reads stdin
    #[arg(long, short = 'i', value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output path; `-` or absent writes stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Profile file (TOML), merged on top of the built-in profile
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Validate the profile and transformation without writing output
    #[arg(long)]
    check: bool,
}

/// Treat `-` the same as an absent path
fn file_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match file_path(path) {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read base configuration from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match file_path(path) {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write configuration to stdout")
        }
    }
}

/// Transform a base document with the given profile
fn generate(profile: &Profile, input: &str) -> Result<String> {
    let mut doc = Document::from_yaml_str(input).context("Invalid base configuration")?;
    Pipeline::new(profile)
        .run(&mut doc)
        .context("Failed to generate configuration")?;
    Ok(doc.to_yaml_string()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = if args.verbose {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    // Load and validate profile
    let config = ConfigLoader::load_or_builtin(args.config).context("Failed to load profile")?;
    let profile = Profile::from_config(config).context("Invalid profile")?;

    let input = read_input(args.input.as_deref())?;
    let output = generate(&profile, &input)?;

    if args.check {
        tracing::info!("Profile and base configuration are valid");
        return Ok(());
    }

    write_output(args.output.as_deref(), &output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_means_stdio() {
        assert!(file_path(None).is_none());
        assert!(file_path(Some(Path::new("-"))).is_none());
        assert_eq!(file_path(Some(Path::new("base.yaml"))), Some(Path::new("base.yaml")));
    }

    #[test]
    fn test_generate_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("base.yaml");
        let output = dir.path().join("full.yaml");
        fs::write(
            &input,
            "proxies:\n  - { name: \"HK-01\", type: ss, server: a.example.com, port: 1 }\n",
        )
        .unwrap();

        let profile = Profile::builtin().unwrap();
        let generated = generate(&profile, &read_input(Some(&input)).unwrap()).unwrap();
        write_output(Some(&output), &generated).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("proxy-groups:"));
        assert!(written.contains("MATCH,漏网之鱼"));
        assert!(written.contains("🇭🇰 香港 - 自动选择"));
    }

    #[test]
    fn test_generate_rejects_non_mapping() {
        let profile = Profile::builtin().unwrap();
        assert!(generate(&profile, "- just\n- a list\n").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let args =
            Args::try_parse_from(["clashgen", "-i", "in.yaml", "-c", "p.toml", "--check"])
                .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("in.yaml")));
        assert_eq!(args.config, Some(PathBuf::from("p.toml")));
        assert!(args.check);
        assert!(args.output.is_none());
    }
}
