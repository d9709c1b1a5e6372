//! Walks through binding, composing, and inline invocation of decorators.

use anyhow::{Context, Result};
use prompt_decorators::catalog::builtin_registry;
use prompt_decorators::config::EngineConfig;
use prompt_decorators::engine::CompositionEngine;
use prompt_decorators::telemetry::{TelemetryConfig, init_tracing};
use prompt_decorators::{DecoratorInstance, Registry};
use serde_json::{Map, Value, json};
use tracing::info;

const CONFIG_ENV: &str = "DECORATOR_CONFIG";

fn main() -> Result<()> {
    init_tracing(&TelemetryConfig::default())?;

    println!("=== Prompt Decorators: Composition Demo ===\n");

    let registry = builtin_registry().context("bundled catalog failed to load")?;
    info!(decorators = registry.len(), "catalog ready");

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => EngineConfig::from_path(&path)
            .with_context(|| format!("reading {}", path.to_string_lossy()))?,
        None => EngineConfig::default(),
    };
    let engine = CompositionEngine::with_config(&registry, config);

    list_catalog(&registry);
    compose_programmatically(&engine)?;
    apply_inline(&engine)?;
    show_rejection(&engine);

    Ok(())
}

fn list_catalog(registry: &Registry) {
    println!("--- Catalog ---\n");
    for category in registry.categories() {
        let names: Vec<_> = registry
            .by_category(category)
            .into_iter()
            .map(|definition| definition.name().to_string())
            .collect();
        println!("{category:>10}: {}", names.join(", "));
    }
    println!();
}

fn bind<'r>(registry: &'r Registry, name: &str, parameters: Value) -> Result<DecoratorInstance<'r>> {
    let raw: Map<String, Value> = serde_json::from_value(parameters)?;
    let definition = registry.lookup(name, None)?;
    Ok(DecoratorInstance::bind(definition, &raw)?)
}

fn compose_programmatically(engine: &CompositionEngine<'_>) -> Result<()> {
    println!("--- Binding and composing ---\n");

    let registry = engine.registry();
    let instances = [
        bind(registry, "Reasoning", json!({"depth": "basic"}))?,
        bind(registry, "Audience", json!({"level": "beginner"}))?,
        bind(registry, "OutputFormat", json!({"format": "markdown"}))?,
    ];
    for instance in &instances {
        println!("{instance}");
    }

    let prompt = engine.compose(&instances, "Explain photosynthesis.")?;
    println!("\n{prompt}\n");
    Ok(())
}

fn apply_inline(engine: &CompositionEngine<'_>) -> Result<()> {
    println!("--- Inline invocations ---\n");

    let text = "+++Version(standard=1.0.0)\n\
                +++Priority(decorators=[Concise, Detailed], mode=override)\n\
                +++Concise(maxWords=80)\n\
                +++Detailed\n\
                +++Summary\n\
                How does TLS establish a session?";
    println!("{text}\n\n=>\n");
    println!("{}\n", engine.apply(text)?);
    Ok(())
}

fn show_rejection(engine: &CompositionEngine<'_>) {
    println!("--- Rejected request ---\n");

    match engine.apply("+++Academic\n+++ELI5\nWhat is entropy?") {
        Ok(prompt) => println!("unexpectedly composed:\n{prompt}"),
        Err(err) => println!("error: {err}"),
    }
}
