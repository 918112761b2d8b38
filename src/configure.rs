use crate::cli::ConfigureArgs;
use crate::client::OcrClient;
use crate::config::{ConfigLocation, ConfigResolver, Configuration};
use anyhow::{bail, Context, Result};
use std::path::Path;

const USAGE: &str = "Usage: paddleocr-cli configure --server-url URL --token TOKEN [-s SCOPE]

Options:
  --server-url URL   Set the server URL (required)
  --token TOKEN      Set the access token (required)
  -s, --scope SCOPE  Installation scope (default: user)
                     user    - ~/.config/paddleocr_cli/
                     project - project root (alongside .claude/)
                     local   - current directory
  --show             Show current configuration
  --test             Test connection";

pub fn configure(args: &ConfigureArgs) -> Result<()> {
    let resolver = ConfigResolver::from_env();

    if args.locations {
        print!("{}", format_locations(&resolver.list_locations()));
        return Ok(());
    }

    let found = resolver.find_config();
    let mut config = resolver
        .load(found.as_deref())
        .context("Error loading config")?;

    if args.show {
        print!("{}", format_config(found.as_deref(), &config));
        return Ok(());
    }

    if args.test {
        return test_connection(config);
    }

    if args.token.is_none() && args.server_url.is_none() {
        bail!("{}", USAGE);
    }

    apply_overrides(&mut config, args);

    let save_path = resolver.resolve_save_path(args.scope)?;
    let written = resolver
        .save(&config, Some(&save_path))
        .context("Failed to save config")?;

    println!("Configuration saved to: {}", written.display());
    Ok(())
}

fn apply_overrides(config: &mut Configuration, args: &ConfigureArgs) {
    if let Some(token) = &args.token {
        config.access_token = token.clone();
    }
    if let Some(url) = &args.server_url {
        config.server_url = url.clone();
    }
}

fn test_connection(config: Configuration) -> Result<()> {
    if !config.is_configured() {
        bail!(
            "server_url and access_token must be configured first.\n\
             Run: paddleocr-cli configure --server-url URL --token TOKEN"
        );
    }

    println!("Testing connection to PaddleOCR server...");
    let (ok, message) = OcrClient::new(config).test_connection();
    if ok {
        println!("  [OK] {}", message);
        Ok(())
    } else {
        println!("  [FAILED] {}", message);
        bail!("Connection test failed")
    }
}

fn format_locations(locations: &[ConfigLocation]) -> String {
    let mut out = String::from("Configuration file search locations:\n\n");
    for loc in locations {
        let status = if loc.exists { "[FOUND]" } else { "[not found]" };
        out.push_str(&format!("  {:<12} {}\n", status, loc.description));
        out.push_str(&format!("             {}\n\n", loc.path));
    }
    out
}

fn format_config(path: Option<&Path>, config: &Configuration) -> String {
    let file = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none found)".to_string());
    let server = if config.server_url.is_empty() {
        "(not set)"
    } else {
        config.server_url.as_str()
    };
    let token = config
        .masked_token()
        .unwrap_or_else(|| "(not set)".to_string());

    format!(
        "Current configuration:\n\n  Config file: {}\n\n  Server URL:   {}\n  Access token: {}\n",
        file, server, token
    )
}
