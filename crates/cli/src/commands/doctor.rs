//! `ragloop doctor` — Diagnose configuration and upstream reachability.

use std::path::Path;

use ragloop_agent::AgentRuntime;
use ragloop_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 ragloop doctor");
    println!("=================\n");

    let mut issues = 0;

    let default_path = AppConfig::config_dir().join("config.toml");
    let shown = config_path.unwrap_or(default_path.as_path());
    if shown.exists() {
        println!("  ✅ Config file found at {}", shown.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", shown.display());
    }

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running further checks.");
            return Ok(());
        }
    };

    let credentials = match config.credentials() {
        Ok(credentials) => {
            println!("  ✅ Credentials present");
            credentials
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!("\n  ⚠️  Set the missing environment variables and re-run.");
            return Ok(());
        }
    };

    let runtime = match AgentRuntime::build(&config, &credentials) {
        Ok(runtime) => runtime,
        Err(e) => {
            println!("  ❌ Could not build runtime: {e}");
            return Ok(());
        }
    };

    match runtime.chat_provider.health_check().await {
        Ok(true) => println!("  ✅ Model endpoint reachable ({})", config.llm.api_url),
        Ok(false) => {
            println!("  ❌ Model endpoint rejected the request ({})", config.llm.api_url);
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Model endpoint unreachable: {e}");
            issues += 1;
        }
    }

    match runtime.embedder.health_check().await {
        Ok(true) => println!("  ✅ Embedding endpoint reachable ({})", config.embedding.api_url),
        Ok(false) => {
            println!("  ⚠️  Embedding endpoint answered with an error ({})", config.embedding.api_url);
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Embedding endpoint unreachable: {e}");
            issues += 1;
        }
    }

    match runtime.preflight().await {
        Ok(()) => println!("  ✅ Collection '{}' exists", config.vector_store.collection),
        Err(e) => {
            println!("  ❌ Vector store check failed: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
