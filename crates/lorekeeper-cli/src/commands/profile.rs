//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
pub fn execute_profile(args: ProfileArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, name, formatter),
        ProfileAction::Set {
            name,
            url,
            model,
            key,
        } => set_profile(config, name, url, model, key, formatter),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter),
    }
}

/// Show enough of a key to recognise it.
fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "****".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}

fn print_profile(profile: &Profile, indent: &str) {
    println!("{}URL: {}", indent, profile.api_url);
    println!("{}Model: {}", indent, profile.model);
    println!("{}Key: {}", indent, mask_key(profile.api_key.as_deref()));
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");
    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile; omitted fields keep their current value.
fn set_profile(
    config: &mut Config,
    name: String,
    url: Option<String>,
    model: Option<String>,
    key: Option<String>,
    formatter: &Formatter,
) -> Result<()> {
    let existing = config.profiles.get(&name).cloned();
    let action = if existing.is_some() { "Updated" } else { "Created" };

    let mut profile = existing.unwrap_or_default();
    if let Some(url) = url {
        profile.api_url = url;
    }
    if let Some(model) = model {
        profile.model = model;
    }
    if let Some(key) = key {
        profile.api_key = Some(key).filter(|k| !k.trim().is_empty());
    }

    config.set_profile(name.clone(), profile);
    config.save()?;

    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );
    Ok(())
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_some() {
        config.save()?;
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config::load_from(dir.path().join("config.toml")).unwrap()
    }

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    #[test]
    fn test_set_and_switch_profile() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);

        set_profile(
            &mut config,
            "local".to_string(),
            Some("http://localhost:8080/v1/chat/completions".to_string()),
            None,
            Some("sk-local".to_string()),
            &formatter(),
        )
        .unwrap();
        switch_profile(&mut config, "local".to_string(), &formatter()).unwrap();

        let reloaded = config_in(&dir);
        assert_eq!(reloaded.active_profile, "local");
        let profile = reloaded.get_active_profile().unwrap();
        assert_eq!(profile.api_url, "http://localhost:8080/v1/chat/completions");
        assert_eq!(profile.model, Profile::default().model);
        assert_eq!(profile.api_key.as_deref(), Some("sk-local"));
    }

    #[test]
    fn test_set_keeps_unspecified_fields() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        set_profile(
            &mut config,
            "default".to_string(),
            None,
            Some("small-model".to_string()),
            Some("sk-one".to_string()),
            &formatter(),
        )
        .unwrap();
        set_profile(
            &mut config,
            "default".to_string(),
            None,
            None,
            None,
            &formatter(),
        )
        .unwrap();

        let profile = config.get_active_profile().unwrap();
        assert_eq!(profile.model, "small-model");
        assert_eq!(profile.api_key.as_deref(), Some("sk-one"));
    }

    #[test]
    fn test_delete_active_profile() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);

        let result = delete_profile(&mut config, "default".to_string(), &formatter());
        assert!(matches!(result, Err(CliError::NotPermitted(_))));
        assert!(config.profiles.contains_key("default"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(None), "(not set)");
        assert_eq!(mask_key(Some("short")), "****");
        assert_eq!(mask_key(Some("sk-abcdefgh1234")), "****1234");
    }
}
