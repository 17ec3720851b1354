use std::path::PathBuf;

use anyhow::Result;
use dirs::home_dir;
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};

use crate::{
    config::{
        AugmentConfig, ChannelsConfig, CompletionConfig, FifiConfig, HTTPChannelConfig,
        ModelConfig, PersonaConfig, StorageConfig,
    },
    constant::API_KEY_ENV,
    error::FifiError,
};

pub async fn onboard() -> Result<()> {
    let home = home_dir().ok_or_else(|| FifiError::Config("cannot resolve home directory".into()))?;
    let default_workspace = format!("{}/.fifi", home.display());

    let workspace = Text::new("fifi workspace directory: ")
        .with_default(&default_workspace)
        .prompt()?;

    let provider_opts = vec!["openrouter", "ollama"];
    let provider = Select::new("your llm provider: ", provider_opts).prompt()?;

    let mut base_url = "".to_string();
    let mut api_key = "".to_string();
    let default_model = if provider == "ollama" {
        base_url = Text::new("Ollama base url: ")
            .with_default("http://localhost:11434")
            .prompt()?;

        "llama3.1"
    } else {
        api_key = Password::new(&format!("{} api key: ", provider))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_help_message(&format!("leave empty to read it from {API_KEY_ENV}"))
            .prompt()?;

        "openai/gpt-4"
    };

    let name = Text::new("llm model: ")
        .with_default(default_model)
        .prompt()?;

    let history_window = CustomType::<usize>::new("turns of history sent per request: ")
        .with_default(10)
        .with_help_message("0 sends the whole conversation")
        .prompt()?;

    let enable_http = Confirm::new("Do you want to serve the http api: ")
        .with_default(true)
        .prompt()?;

    let http = if enable_http {
        let port = CustomType::<u32>::new("http port: ")
            .with_default(8080)
            .with_formatter(&|i| format!("{i}"))
            .prompt()?;

        Some(HTTPChannelConfig::new(port))
    } else {
        None
    };

    let fifi = FifiConfig {
        model: ModelConfig {
            provider: provider.into(),
            name,
            api_key,
            base_url,
        },
        completion: CompletionConfig {
            history_window,
            ..Default::default()
        },
        persona: PersonaConfig::default(),
        augment: AugmentConfig::default(),
        storage: StorageConfig {
            workspace: workspace.clone(),
        },
        channels: ChannelsConfig { http },
    };

    let mut path = PathBuf::from(&workspace);
    path.push("config.toml");
    fifi.save(path, COMMENTED_CONFIGS.to_string())?;

    println!(
        r#"
🎉 Your configuration has been created at: {}/config.toml

🤰 Conversations and accounts are stored in {}/fifi.db
        "#,
        workspace, workspace,
    );
    println!(
        "to run: `{}`",
        if workspace == default_workspace {
            "fifi chat".to_string()
        } else {
            format!("fifi chat --config {}/config.toml", workspace)
        }
    );

    Ok(())
}

const COMMENTED_CONFIGS: &str = r#"
# sampling penalties forwarded to the provider, set under [fifi.completion]
# presence_penalty = 0.0
# frequency_penalty = 0.0
"#;
