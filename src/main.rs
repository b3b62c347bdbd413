use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opsramp_cloner::client::{build_http_client, OpsRampClient};
use opsramp_cloner::config::{self, Config};
use opsramp_cloner::models::{IntegrationRecord, TemplateRecord};
use opsramp_cloner::store::output::{ArtifactKind, OutputStore};
use opsramp_cloner::workflow::{TemplateRequest, Workflow};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var("OPSRAMP_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "opsramp_cloner=info".into()),
        ))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Run { template_file }) => {
            let path = template_file.unwrap_or_else(|| cfg.template_file.clone());
            let names = config::load_template_names(&path)?;
            let requests: Vec<TemplateRequest> = names.into_iter().map(TemplateRequest::new).collect();
            run_workflow(&cfg, &requests).await
        }
        Some(cli::Commands::Clone { name, new_name }) => {
            let request = match new_name {
                Some(new_name) => TemplateRequest::renamed(name, new_name),
                None => TemplateRequest::new(name),
            };
            run_workflow(&cfg, &[request]).await
        }
        Some(cli::Commands::Auth { pod }) => handle_auth(&cfg, pod).await,
        Some(cli::Commands::Integrations { pod, app }) => {
            handle_integrations(&cfg, pod, app.as_deref()).await
        }
        Some(cli::Commands::Globals {
            pod,
            app,
            with_clones,
        }) => handle_globals(&cfg, pod, &app, with_clones).await,
        Some(cli::Commands::Clones { pod, template }) => handle_clones(&cfg, pod, &template).await,
        Some(cli::Commands::Customizations { pod, template }) => {
            handle_customizations(&cfg, pod, &template).await
        }
        None => {
            let names = config::load_template_names(&cfg.template_file)?;
            let requests: Vec<TemplateRequest> = names.into_iter().map(TemplateRequest::new).collect();
            run_workflow(&cfg, &requests).await
        }
    };

    // anyhow's Debug output (message plus cause chain) is printed by the runtime.
    result
}

fn pod_client(cfg: &Config, number: u8) -> anyhow::Result<OpsRampClient> {
    let pod = config::pod(number).with_context(|| format!("POD{} configuration", number))?;
    let http = build_http_client(cfg.request_timeout, cfg.insecure_tls)?;
    Ok(OpsRampClient::for_pod(&pod, http)?)
}

async fn run_workflow(cfg: &Config, requests: &[TemplateRequest]) -> anyhow::Result<()> {
    // Both credential sets must exist before anything touches the network.
    let source = pod_client(cfg, 1)?;
    let target = pod_client(cfg, 2)?;
    let output = OutputStore::from_url(&cfg.output_url)?;

    tracing::info!(
        source = %source.base_url(),
        target = %target.base_url(),
        templates = requests.len(),
        artifacts = output.is_enabled(),
        "Configuration loaded"
    );

    let report = Workflow::new(&source, &target, &output).run(requests).await;
    println!("{}", report);
    Ok(())
}

async fn handle_auth(cfg: &Config, pod: u8) -> anyhow::Result<()> {
    let client = pod_client(cfg, pod)?;
    let token = client.authenticate().await?;
    let prefix: String = token.access_token.chars().take(20).collect();
    println!(
        "{} authenticated:\n  Base URL:   {}\n  Tenant:     {}\n  Token:      {}...\n  Type:       {}\n  Scope:      {}\n  Expires in: {}s\n  Expires at: {}",
        client.label(),
        client.base_url(),
        client.tenant_id(),
        prefix,
        token.token_type,
        token.scope,
        token.expires_in,
        token.expires_at.to_rfc3339()
    );
    Ok(())
}

async fn handle_integrations(cfg: &Config, pod: u8, app: Option<&str>) -> anyhow::Result<()> {
    let client = pod_client(cfg, pod)?;
    let integrations = client.integrations(app).await?;
    print_integrations(&integrations);
    Ok(())
}

async fn handle_globals(cfg: &Config, pod: u8, app: &str, with_clones: bool) -> anyhow::Result<()> {
    let client = pod_client(cfg, pod)?;
    let integrations = client.integrations(Some(app)).await?;
    if integrations.is_empty() {
        println!("No integrations found for '{}'.", app);
        return Ok(());
    }

    let mut globals = Vec::new();
    for integration in &integrations {
        globals.extend(client.global_templates_for(integration).await);
    }

    if !with_clones {
        print_templates(&globals);
        return Ok(());
    }

    let families = client.cloned_templates_for(&globals).await;
    let total: usize = families.iter().map(|f| f.clones.len()).sum();
    println!("Total cloned templates: {}", total);
    for family in families.iter().filter(|f| !f.clones.is_empty()) {
        println!(
            "\n{} ({})\n  App: {} | Type: {} | Version: {}",
            family.global.name,
            family.global.id,
            family.global.app_name,
            family.global.native_type,
            family.global.version
        );
        for clone in &family.clones {
            println!("  - {:<38} {:<16} {}", clone.id, clone.scope, clone.name);
        }
    }
    Ok(())
}

async fn handle_clones(cfg: &Config, pod: u8, template: &str) -> anyhow::Result<()> {
    let client = pod_client(cfg, pod)?;
    let Some(global) = client.global_template_by_name(template).await? else {
        println!("No global template named '{}'.", template);
        return Ok(());
    };

    let clones = client.cloned_templates_by_parent(&global.id).await?;
    println!("Global template {} ({})", global.name, global.id);
    if clones.is_empty() {
        println!("No cloned templates found.");
    } else {
        print_templates(&clones);
    }
    Ok(())
}

async fn handle_customizations(cfg: &Config, pod: u8, template: &str) -> anyhow::Result<()> {
    let client = pod_client(cfg, pod)?;
    let output = OutputStore::from_url(&cfg.output_url)?;

    let global = client
        .global_template_by_name(template)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no global template named '{}'", template))?;
    let clone = client
        .cloned_template_by_parent(&global.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("global template {} has no clone", global.id))?;

    let payload = client.customizations(&clone.id).await?;
    println!(
        "Customizations of {} ({}): {} top-level fields",
        clone.name,
        clone.id,
        payload.len()
    );
    match output
        .save_json(ArtifactKind::Customizations, template, Some(&clone.id), &payload)
        .await?
    {
        Some(key) => println!("Saved to {}", key),
        None => println!("{}", serde_json::to_string_pretty(&payload)?),
    }
    Ok(())
}

fn print_integrations(integrations: &[IntegrationRecord]) {
    println!("Found {} integration(s)", integrations.len());
    for (idx, info) in integrations.iter().enumerate() {
        println!("\n[{}] App: {}", idx + 1, info.app_name);
        println!("    Version: {}", info.version);
        if !info.persona.is_empty() {
            println!("    Persona: {}", info.persona);
        }
        println!("    Native Types ({}):", info.native_types.len());
        for nt in &info.native_types {
            println!("      - {}", nt);
        }
    }
}

fn print_templates(templates: &[TemplateRecord]) {
    if templates.is_empty() {
        println!("No templates found.");
        return;
    }
    println!(
        "{:<38} {:<16} {:<24} {:<8} {}",
        "ID", "SCOPE", "NATIVE TYPE", "VERSION", "NAME"
    );
    for t in templates {
        println!(
            "{:<38} {:<16} {:<24} {:<8} {}",
            t.id, t.scope, t.native_type, t.version, t.name
        );
    }
}
