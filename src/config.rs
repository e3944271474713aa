use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

pub const DECISION_TREE_FILE: &str = "penguin_decision_tree.json";
pub const RANDOM_FOREST_FILE: &str = "penguin_random_forest.json";

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub model_dir: PathBuf,
    pub decision_tree_path: PathBuf,
    pub random_forest_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from an arbitrary key lookup. Unset or
    /// unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("SERVER_ADDR")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT));

        let model_dir = lookup("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_model_dir);

        let decision_tree_path = lookup("DT_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| model_dir.join(DECISION_TREE_FILE));
        let random_forest_path = lookup("RF_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| model_dir.join(RANDOM_FOREST_FILE));

        Self {
            listen_addr,
            model_dir,
            decision_tree_path,
            random_forest_path,
        }
    }

    /// Configuration pointing both artifacts at `dir`, listening on an
    /// ephemeral localhost port.
    pub fn with_model_dir(dir: impl AsRef<Path>) -> Self {
        let model_dir = dir.as_ref().to_path_buf();
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            decision_tree_path: model_dir.join(DECISION_TREE_FILE),
            random_forest_path: model_dir.join(RANDOM_FOREST_FILE),
            model_dir,
        }
    }
}

/// `Modelos` next to the directory holding the running binary. Falls back to
/// a relative `Modelos` when the executable path can't be resolved.
fn default_model_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(sibling_model_dir))
        .unwrap_or_else(|| PathBuf::from("Modelos"))
}

fn sibling_model_dir(service_dir: &Path) -> PathBuf {
    service_dir
        .parent()
        .unwrap_or(service_dir)
        .join("Modelos")
}
