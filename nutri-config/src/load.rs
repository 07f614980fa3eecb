use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use config::builder::{ConfigBuilder, DefaultState};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory holding the configuration files, relative to the application root.
const CONFIGURATION_DIR: &str = "configuration";

/// Extensions tried, in order, for every configuration file.
const CONFIG_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "APP";

const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator of nested keys in environment variable overrides, as in `APP_APPLICATION__PORT`.
const ENV_SEPARATOR: &str = "__";

const LIST_SEPARATOR: &str = ",";

/// Trait implemented by top level configuration structures.
pub trait Config {
    /// Keys whose environment variable overrides are comma separated lists.
    const LIST_PARSE_KEYS: &'static [&'static str];
}

/// The configuration layer a file belongs to.
#[derive(Debug, Clone, Copy)]
enum ConfigLayer {
    Base,
    Environment(Environment),
}

impl ConfigLayer {
    fn file_stem(&self) -> &'static str {
        match self {
            ConfigLayer::Base => "base",
            ConfigLayer::Environment(environment) => environment.as_str(),
        }
    }
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLayer::Base => f.write_str("base configuration"),
            ConfigLayer::Environment(environment) => {
                write!(f, "{environment} environment configuration")
            }
        }
    }
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("configuration directory `{0}` does not exist")]
    MissingConfigurationDirectory(PathBuf),

    #[error("could not locate the {layer} in `{directory}`; attempted: {attempted}")]
    ConfigurationFileMissing {
        layer: String,
        directory: PathBuf,
        attempted: String,
    },

    #[error("failed to load the {layer} from `{path}`: {source}")]
    ConfigurationFileLoad {
        layer: String,
        path: PathBuf,
        source: config::ConfigError,
    },

    #[error("failed to determine the runtime environment: {0}")]
    Environment(#[source] io::Error),

    #[error("failed to build the configuration: {0}")]
    Builder(#[source] config::ConfigError),

    #[error("failed to deserialize the configuration: {0}")]
    Deserialization(#[source] config::ConfigError),
}

/// Loads the configuration of the application running in the current directory.
///
/// See [`load_config_from`] for the layering rules.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    let root = std::env::current_dir().map_err(LoadConfigError::CurrentDir)?;
    let environment = Environment::load().map_err(LoadConfigError::Environment)?;

    load_config_from(&root, environment)
}

/// Loads the configuration of the application rooted at `root` for `environment`.
///
/// `configuration/base.(yaml|yml|json)` is loaded first, then
/// `configuration/{environment}.(yaml|yml|json)` and finally `APP_`-prefixed environment
/// variables, each layer overriding the previous ones.
pub fn load_config_from<T>(root: &Path, environment: Environment) -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    let directory = root.join(CONFIGURATION_DIR);
    if !directory.is_dir() {
        return Err(LoadConfigError::MissingConfigurationDirectory(directory));
    }

    let mut builder = config::Config::builder();
    for layer in [ConfigLayer::Base, ConfigLayer::Environment(environment)] {
        let path = find_configuration_file(&directory, layer)?;
        builder = builder.add_source(config::File::from(path.clone()));

        // Building each layer on its own pins parse errors to the file that caused them.
        check_layer(&builder, layer, &path)?;
    }

    let builder = builder.add_source(environment_overrides::<T>());
    let settings = builder.build().map_err(LoadConfigError::Builder)?;

    settings
        .try_deserialize::<T>()
        .map_err(LoadConfigError::Deserialization)
}

fn environment_overrides<T: Config>() -> config::Environment {
    let mut source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR);

    if !T::LIST_PARSE_KEYS.is_empty() {
        source = source.try_parsing(true).list_separator(LIST_SEPARATOR);
        for key in T::LIST_PARSE_KEYS {
            source = source.with_list_parse_key(key);
        }
    }

    source
}

/// Returns the first existing file of `layer` in `directory`.
fn find_configuration_file(
    directory: &Path,
    layer: ConfigLayer,
) -> Result<PathBuf, LoadConfigError> {
    let candidates: Vec<PathBuf> = CONFIG_FILE_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{}.{extension}", layer.file_stem())))
        .collect();

    if let Some(path) = candidates.iter().find(|path| path.is_file()) {
        return Ok(path.clone());
    }

    let attempted = candidates
        .iter()
        .map(|path| format!("`{}`", path.display()))
        .collect::<Vec<_>>()
        .join(", ");

    Err(LoadConfigError::ConfigurationFileMissing {
        layer: layer.to_string(),
        directory: directory.to_path_buf(),
        attempted,
    })
}

fn check_layer(
    builder: &ConfigBuilder<DefaultState>,
    layer: ConfigLayer,
    path: &Path,
) -> Result<(), LoadConfigError> {
    builder
        .clone()
        .build()
        .map(|_| ())
        .map_err(|source| LoadConfigError::ConfigurationFileLoad {
            layer: layer.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::shared::WorkerPoolConfig;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        name: String,
        port: u16,
        workers: WorkerPoolConfig,
    }

    impl Config for TestConfig {
        const LIST_PARSE_KEYS: &'static [&'static str] = &[];
    }

    fn write(root: &Path, file: &str, content: &str) {
        let directory = root.join(CONFIGURATION_DIR);
        std::fs::create_dir_all(&directory).unwrap();
        std::fs::write(directory.join(file), content).unwrap();
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "base.yaml", "name: nutri\nport: 8000\nworkers: {}\n");
        write(root.path(), "prod.json", r#"{"port": 80, "workers": {"num_workers": 4}}"#);

        let config: TestConfig = load_config_from(root.path(), Environment::Prod).unwrap();

        assert_eq!(config.name, "nutri");
        assert_eq!(config.port, 80);
        assert_eq!(config.workers.num_workers, Some(4));
    }

    #[test]
    fn test_missing_environment_file_is_reported() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "base.yaml", "name: nutri\nport: 8000\nworkers: {}\n");

        let err = load_config_from::<TestConfig>(root.path(), Environment::Dev).unwrap_err();

        assert!(matches!(err, LoadConfigError::ConfigurationFileMissing { .. }));
    }

    #[test]
    fn test_missing_configuration_directory_is_reported() {
        let root = tempfile::tempdir().unwrap();

        let err = load_config_from::<TestConfig>(root.path(), Environment::Dev).unwrap_err();

        assert!(matches!(err, LoadConfigError::MissingConfigurationDirectory(_)));
    }
}
