use clap::Parser;
use mcpup::cli::{Args, Commands, ConfigDiscovery, ResolvedConfig, prompt};
use mcpup::container::{LivenessPolicy, ProvisionError, Provisioner, container_name_for};
use mcpup::generate::{GenerateError, GeneratedServer, GenerationClient};
use mcpup::workspace::WorkspaceManager;
use mcpup::{clients, env};
use rand::Rng;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("mcpup=info").init();

    // Pick up MCPUP_API_KEY and friends from a local .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Commands::Up {
            name,
            port,
            urls,
            local,
            docker,
            client,
            verbose,
        } => run_up(UpOptions {
            name,
            port,
            urls,
            local,
            docker,
            client,
            verbose,
        })
        .await,
        Commands::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
    }
}

struct UpOptions {
    name: Option<String>,
    port: Option<u16>,
    urls: Vec<String>,
    local: bool,
    docker: bool,
    client: Option<clients::ConnectedClient>,
    verbose: bool,
}

async fn run_up(opts: UpOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigDiscovery::discover_config()?.resolve();
    let api_key = config.api_key.clone().ok_or_else(|| {
        format!(
            "API key not found. Set {} in the environment or a .env file, or add api_key to your config file.",
            env::API_KEY_ENV_VAR
        )
    })?;

    let urls = if opts.urls.is_empty() {
        prompt::prompt_urls()?
    } else {
        prompt::validate_urls(&opts.urls)
    };
    if urls.is_empty() {
        return Err("No valid documentation URLs provided.".into());
    }

    let generation = GenerationClient::new(config.api_url.clone(), api_key);

    println!("\nFetching page data...");
    let pages = match generation.fetch_pages(&urls).await {
        Ok(pages) => pages,
        Err(e) => return Err(present_generate_error(e)),
    };

    let name = match opts.name {
        Some(name) => name,
        None => prompt::prompt_name()?,
    };
    let port = opts
        .port
        .unwrap_or_else(|| rand::rng().random_range(1024..=9999));

    println!("\nGenerating server code...");
    let generated = match generation.generate(&pages.pages, &name, port).await {
        Ok(generated) => generated,
        Err(e) => return Err(present_generate_error(e)),
    };

    if opts.verbose {
        println!(
            "Generated artifacts for '{}' ({} env vars required)",
            name,
            generated.env_vars.len()
        );
    }

    let local = if opts.local {
        true
    } else if opts.docker {
        false
    } else {
        prompt::prompt_local_deployment()?
    };

    // The ctrl-c arm is polled first, so from the moment the workspace hits
    // the disk an interrupt at any later stage (env-value prompts included)
    // drops the launch future and its guard rolls the directory back.
    tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; rolling back workspace '{}'", name);
            return Err("interrupted".into());
        }
        result = launch(&config, &name, port, &generated, local) => result?,
    }

    let client = match opts.client {
        Some(client) => client,
        None => prompt::prompt_client()?,
    };
    println!("\n{}", clients::connection_snippet(client, &name, port));

    if local {
        // Snippet assumes the server is reachable; remind how to start it.
        println!("\nStart the server before connecting a client.");
    }

    if let Some(urls_left) = pages.urls_left {
        println!("\nYou have {} URLs remaining in your quota.", urls_left);
    }

    Ok(())
}

/// Materialize the workspace and bring the server up, locally or in Docker.
///
/// The rollback guard lives inside this future: cancelling it at any stage
/// destroys the workspace unless the stage that makes it permanent has
/// already disarmed the guard.
async fn launch(
    config: &ResolvedConfig,
    name: &str,
    port: u16,
    generated: &GeneratedServer,
    local: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = WorkspaceManager::new(config.servers_dir.clone());
    let guard = manager.rollback_guard(name);
    let workspace = manager.create(name, &generated.files())?;

    // The prompts block on stdin; running them on the blocking pool keeps
    // this future cancellable while they wait.
    let env_names = generated.env_vars.clone();
    let env_values =
        tokio::task::spawn_blocking(move || prompt::collect_env_values(&env_names)).await??;

    if local {
        manager.write_config(name, &env_values)?;
        guard.disarm();
        print_local_instructions(config, name);
        return Ok(());
    }

    let provisioner = Provisioner::new(LivenessPolicy::default()).await?;
    let container_name = container_name_for(name);

    println!("\nBuilding and starting Docker container...");
    match provisioner
        .provision(&workspace, port, &container_name, &env_values)
        .await
    {
        Ok(server) => {
            guard.disarm();
            info!(
                "Container {} running on port {}",
                server.container_name, server.port
            );
            println!(
                "\nDocker container started successfully on port {}\n",
                server.port
            );
            Ok(())
        }
        Err(ProvisionError::HealthCheck { stdout, stderr }) => {
            eprintln!("\nContainer failed to start. Logs:");
            eprintln!("{}", stdout);
            eprintln!("{}", stderr);
            Err("container did not come up; workspace rolled back".into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_local_instructions(config: &ResolvedConfig, name: &str) {
    println!("\nTo run the server locally:");
    println!("1. cd {}", config.servers_dir.join(name).display());
    println!("2. pip3 install -r {}", env::files::DEPENDENCY_MANIFEST);
    println!("3. python3 {}", env::files::SERVER_SOURCE);
}

fn present_generate_error(error: GenerateError) -> Box<dyn std::error::Error> {
    if let GenerateError::Api {
        ref failed_urls, ..
    } = error
    {
        if !failed_urls.is_empty() {
            eprintln!("\nFailed URLs:");
            for url in failed_urls {
                eprintln!("- {}", url);
            }
        }
    }
    error.into()
}
