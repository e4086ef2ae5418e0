use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Args;
use restkit::{EndpointDescriptor, EndpointRegistry, RestkitConfig};
use serde_json::Value;

/// Catalog files named on the command line.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Contract catalog files (YAML), loaded after those listed in the config
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl CatalogArgs {
    fn registry(&self, config: Option<&Path>) -> anyhow::Result<EndpointRegistry> {
        let mut config = RestkitConfig::load(config).context("failed to load configuration")?;
        config.contracts.extend(self.files.iter().cloned());
        if config.contracts.is_empty() {
            bail!("no contract catalogs given");
        }

        let catalog = config
            .load_catalog()
            .context("failed to load contract catalogs")?;
        tracing::info!(
            files = config.contracts.len(),
            contracts = catalog.len(),
            "catalog loaded"
        );
        Ok(EndpointRegistry::from_config(&config, catalog))
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
}

impl ValidateArgs {
    pub fn run(&self, config: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
        let registry = self.catalog.registry(config)?;
        let names: Vec<String> = registry
            .catalog()
            .contracts()
            .map(|contract| contract.name.clone())
            .collect();

        let mut failed = 0usize;
        for name in &names {
            match registry.descriptors(name) {
                Ok(descriptors) => {
                    writeln!(out, "ok     {name} ({} operations)", descriptors.len())?;
                }
                Err(err) => {
                    failed += 1;
                    writeln!(out, "error  {name}: {err}")?;
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} contracts failed validation", names.len());
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Only describe this contract
    #[arg(long)]
    contract: Option<String>,

    /// Output descriptors as JSON
    #[arg(long)]
    json: bool,
}

impl DescribeArgs {
    pub fn run(&self, config: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
        let registry = self.catalog.registry(config)?;
        let names: Vec<String> = match &self.contract {
            Some(name) => vec![name.clone()],
            None => registry
                .catalog()
                .contracts()
                .map(|contract| contract.name.clone())
                .collect(),
        };

        let mut descriptors = Vec::new();
        for name in &names {
            descriptors.extend(
                registry
                    .descriptors(name)
                    .with_context(|| format!("contract {name}"))?,
            );
        }

        if self.json {
            let json: Vec<Value> = descriptors.iter().map(|d| d.to_json()).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
            return Ok(());
        }

        for descriptor in &descriptors {
            write_descriptor(out, descriptor)?;
        }
        Ok(())
    }
}

fn write_descriptor(out: &mut impl Write, descriptor: &EndpointDescriptor) -> std::io::Result<()> {
    writeln!(out, "{}", descriptor.key())?;
    writeln!(out, "  {} {}", descriptor.method(), descriptor.path())?;
    if let Some(version) = descriptor.version() {
        writeln!(out, "  version: {version}")?;
    }
    for header in descriptor.headers() {
        writeln!(out, "  header {}: {}", header.name(), header.value())?;
    }
    for binding in descriptor.parameters() {
        writeln!(
            out,
            "  #{} {} {} : {}",
            binding.position(),
            binding.kind(),
            binding.name().unwrap_or("-"),
            binding.value_type()
        )?;
    }
    writeln!(out, "  returns {}", descriptor.return_type())
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Contract the operation is invoked through
    #[arg(long)]
    contract: String,

    /// Operation name
    #[arg(long)]
    operation: String,

    /// Argument value, in declaration order (JSON, or a plain string)
    #[arg(long = "arg", value_name = "VALUE", action = clap::ArgAction::Append)]
    args: Vec<String>,

    /// Output the request as JSON
    #[arg(long)]
    json: bool,
}

impl ExpandArgs {
    pub fn run(&self, config: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
        let registry = self.catalog.registry(config)?;
        let args: Vec<Value> = self.args.iter().map(|raw| parse_arg(raw)).collect();
        let request = registry
            .request(&self.contract, &self.operation, &args)
            .with_context(|| format!("{}::{}", self.contract, self.operation))?;

        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&request.to_json())?)?;
            return Ok(());
        }

        writeln!(out, "{} {}", request.method(), request.uri())?;
        for (name, value) in request.headers() {
            writeln!(out, "{name}: {}", String::from_utf8_lossy(value.as_bytes()))?;
        }
        if let Some(body) = request.body() {
            writeln!(out)?;
            writeln!(out, "{}", serde_json::to_string_pretty(body)?)?;
        }
        Ok(())
    }
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
