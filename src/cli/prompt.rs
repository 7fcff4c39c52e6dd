//! Interactive prompting.
//!
//! Stdin-based prompts for the pieces the user did not supply as flags:
//! documentation URLs, the server name, the deployment mode, the client to
//! connect, and the values for the environment variables the generated
//! server needs.
//! Environment variables are checked before prompting, and empty values are
//! rejected here so the core never sees them.

use crate::clients::ConnectedClient;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing::warn;
use url::Url;

/// Print a prompt and read one trimmed line from stdin.
fn prompt_line(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Validate a list of URL strings, keeping the well-formed ones.
pub fn validate_urls(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter_map(|candidate| {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                return None;
            }
            match Url::parse(candidate) {
                Ok(_) => Some(candidate.to_string()),
                Err(e) => {
                    warn!("Skipping invalid URL {:?}: {}", candidate, e);
                    None
                }
            }
        })
        .collect()
}

/// Read documentation URLs from stdin, one per line, until an empty line.
pub fn prompt_urls() -> io::Result<Vec<String>> {
    println!("Paste your REST API documentation URLs below (submit with an empty line):");

    let mut raw = Vec::new();
    loop {
        let line = prompt_line("")?;
        if line.is_empty() {
            break;
        }
        raw.push(line);
    }

    Ok(validate_urls(&raw))
}

/// Prompt for a server name until a non-empty one is entered.
pub fn prompt_name() -> io::Result<String> {
    loop {
        let name = prompt_line("\nEnter a name for your server: ")?;
        if !name.is_empty() {
            return Ok(name);
        }
        println!("Name is required.");
    }
}

/// Prompt for the deployment mode. Returns true for a local run.
pub fn prompt_local_deployment() -> io::Result<bool> {
    println!("\nHow would you like to deploy the server?");
    println!("  1. Docker container");
    println!("  2. Local server");

    loop {
        let choice = prompt_line("Enter a number: ")?;
        match choice.as_str() {
            "1" => return Ok(false),
            "2" => return Ok(true),
            _ => println!("Please enter 1 or 2."),
        }
    }
}

/// Prompt for the client to print a connection snippet for.
pub fn prompt_client() -> io::Result<ConnectedClient> {
    println!("\nWhich client would you like to connect with?");
    for (i, client) in ConnectedClient::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, client);
    }

    loop {
        let choice = prompt_line("Enter a number: ")?;
        if let Ok(index) = choice.parse::<usize>() {
            if (1..=ConnectedClient::ALL.len()).contains(&index) {
                return Ok(ConnectedClient::ALL[index - 1]);
            }
        }
        println!("Please enter a number between 1 and {}.", ConnectedClient::ALL.len());
    }
}

/// Collect values for the named environment variables.
///
/// Each variable is resolved from the process environment first; missing
/// ones are prompted for. Empty values are rejected, so the value set
/// handed to the pipeline only ever contains non-empty entries.
pub fn collect_env_values(names: &[String]) -> io::Result<HashMap<String, String>> {
    collect_env_values_from(&mut io::stdin().lock(), names)
}

fn collect_env_values_from<R: BufRead>(
    reader: &mut R,
    names: &[String],
) -> io::Result<HashMap<String, String>> {
    let mut values = HashMap::new();

    for name in names {
        if let Ok(value) = std::env::var(name) {
            if !value.is_empty() {
                values.insert(name.clone(), value);
                continue;
            }
        }

        let label = if name == "BEARER_AUTH" {
            format!("{} (API key)", name)
        } else {
            name.clone()
        };

        print!("Enter value for {}: ", label);
        io::stdout().flush()?;
        let mut input = String::new();
        reader.read_line(&mut input)?;

        let value = input.trim().to_string();
        if value.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("value for {} cannot be empty", name),
            ));
        }
        values.insert(name.clone(), value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_urls_filters_garbage() {
        let raw = vec![
            "https://docs.example.com/api".to_string(),
            "not a url".to_string(),
            "".to_string(),
            "  https://other.example.com  ".to_string(),
        ];

        let urls = validate_urls(&raw);
        assert_eq!(
            urls,
            vec![
                "https://docs.example.com/api".to_string(),
                "https://other.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_collect_env_values_reads_environment() {
        // SAFETY: unique variable name, no concurrent reader.
        unsafe { std::env::set_var("MCPUP_TEST_COLLECT_VAR", "from-env") };

        let values = collect_env_values(&["MCPUP_TEST_COLLECT_VAR".to_string()]).unwrap();
        assert_eq!(values["MCPUP_TEST_COLLECT_VAR"], "from-env");

        unsafe { std::env::remove_var("MCPUP_TEST_COLLECT_VAR") };
    }

    #[test]
    fn test_collect_env_values_empty_list() {
        let values = collect_env_values(&[]).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_collect_env_values_prompts_for_missing() {
        let mut input = io::Cursor::new(&b"super-secret\n"[..]);
        let values =
            collect_env_values_from(&mut input, &["MCPUP_TEST_PROMPTED_VAR".to_string()]).unwrap();
        assert_eq!(values["MCPUP_TEST_PROMPTED_VAR"], "super-secret");
    }

    #[test]
    fn test_collect_env_values_rejects_empty_value() {
        let mut input = io::Cursor::new(&b"\n"[..]);
        let err = collect_env_values_from(&mut input, &["MCPUP_TEST_EMPTY_VAR".to_string()])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
