use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{anyhow, bail, Context, Result};
use girgen::filter::NamespaceGenerator;
use girgen::preprocess::apply_preprocessors;
use girgen::{write_repository, GenerationConfig, LinkMode, Repositories, TrampolineBuilder, RUNTIME_LINK_ENV};
use tracing::info;

const USAGE: &str = "gir-generate

Usage:
  gir-generate help
  gir-generate <config.toml>

Loads the repository documents named in the configuration, applies the
configured preprocessors, filters every configured namespace and writes
into its output directory:
  <Namespace>-<version>.json   the corrected, filtered repository
  trampolines.rs               extern \"C\" callback trampolines

Environment:
  GIRGEN_RUNTIME_LINK=1        experimental: omit #[link] attributes and
                               resolve native symbols at load time
";

fn main() {
    if let Err(err) = real_main() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.first().map(String::as_str) {
        None | Some("help" | "-h" | "--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(config) if args.len() == 1 => generate(Path::new(config)),
        Some(_) => bail!("expected a single configuration file\n\n{}", USAGE),
    }
}

fn generate(config_path: &Path) -> Result<()> {
    let config = GenerationConfig::load(config_path)?;
    let plan = config
        .build()
        .map_err(|errors| anyhow!("{errors}"))
        .with_context(|| format!("invalid configuration {}", config_path.display()))?;

    let mut repos = Repositories::new();
    for path in &plan.repositories {
        repos
            .load(path)
            .with_context(|| format!("loading repository {}", path.display()))?;
    }
    info!(repositories = repos.len(), "loaded repositories");

    apply_preprocessors(&mut repos, &plan.preprocessors)
        .map_err(|errors| anyhow!("{errors}"))
        .context("preprocessing failed; discard any output of this run")?;

    let link_mode = LinkMode::from_env();
    if link_mode == LinkMode::Runtime {
        eprintln!("warning: {RUNTIME_LINK_ENV}=1 selects experimental runtime linking");
    }
    let trampolines = TrampolineBuilder::builder().link_mode(link_mode).build();

    for namespace in plan.namespaces {
        let repo = repos
            .find_repository(&namespace.name)
            .ok_or_else(|| anyhow!("namespace {} is not loaded", namespace.name))?;
        let generator = NamespaceGenerator::new(&repos, repo.namespace.clone(), namespace.filters);
        let retained = generator
            .retained_repository()
            .ok_or_else(|| anyhow!("namespace {} is not loaded", namespace.name))?;

        fs::create_dir_all(&namespace.output)
            .with_context(|| format!("creating output directory {}", namespace.output.display()))?;
        let model_path = namespace
            .output
            .join(format!("{}-{}.json", retained.namespace.name, retained.namespace.version));
        write_repository(&model_path, &retained)?;

        let file = trampolines.generate(&repos, &retained);
        let trampoline_path: PathBuf = namespace.output.join("trampolines.rs");
        file.write(&trampoline_path)?;

        println!(
            "{}: {} of {} types retained, {} trampolines ({} callbacks skipped) -> {}",
            namespace.name,
            retained.nodes.len(),
            repo.nodes.len(),
            file.generated().len(),
            file.skipped().len(),
            namespace.output.display()
        );
    }
    Ok(())
}
