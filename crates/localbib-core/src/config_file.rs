use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accordion::ExpandPolicy;
use crate::authors::AuthorOptions;
use crate::group::GroupMode;
use crate::sort::SortOrder;
use crate::view::ViewOptions;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub view: Option<ViewConfig>,
    pub authors: Option<AuthorsConfig>,
    pub render: Option<RenderConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub group_mode: Option<String>,
    pub expand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorsConfig {
    pub highlight: Option<Vec<String>>,
    pub split_on_comma: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub title: Option<String>,
    pub allow_note_markup: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub source: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/localbib/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("localbib").join("config.toml"))
}

/// Load config by cascading CWD `.localbib.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".localbib.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config");
            None
        }
    }
}

/// Load a config the user named explicitly. Unlike [`load_from_path`],
/// a missing or invalid file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bv = base.view.unwrap_or_default();
    let ov = overlay.view.unwrap_or_default();
    let ba = base.authors.unwrap_or_default();
    let oa = overlay.authors.unwrap_or_default();
    let br = base.render.unwrap_or_default();
    let or = overlay.render.unwrap_or_default();
    let bs = base.server.unwrap_or_default();
    let os = overlay.server.unwrap_or_default();

    ConfigFile {
        view: Some(ViewConfig {
            sort_by: ov.sort_by.or(bv.sort_by),
            order: ov.order.or(bv.order),
            group_mode: ov.group_mode.or(bv.group_mode),
            expand: ov.expand.or(bv.expand),
        }),
        authors: Some(AuthorsConfig {
            highlight: oa.highlight.or(ba.highlight),
            split_on_comma: oa.split_on_comma.or(ba.split_on_comma),
        }),
        render: Some(RenderConfig {
            title: or.title.or(br.title),
            allow_note_markup: or.allow_note_markup.or(br.allow_note_markup),
        }),
        server: Some(ServerConfig {
            bind: os.bind.or(bs.bind),
            source: os.source.or(bs.source),
        }),
    }
}

impl ConfigFile {
    /// Resolve view options, falling back to defaults for missing or
    /// unrecognized values.
    pub fn view_options(&self) -> ViewOptions {
        let defaults = ViewOptions::default();
        let view = self.view.clone().unwrap_or_default();
        let authors = self.authors.clone().unwrap_or_default();

        ViewOptions {
            sort_by: view
                .sort_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.sort_by),
            order: parse_or(view.order.as_deref(), "order", defaults.order, |s| {
                s.parse::<SortOrder>()
            }),
            group_mode: parse_or(
                view.group_mode.as_deref(),
                "group_mode",
                defaults.group_mode,
                |s| s.parse::<GroupMode>().map_err(|e| e.to_string()),
            ),
            expand: parse_or(view.expand.as_deref(), "expand", defaults.expand, |s| {
                s.parse::<ExpandPolicy>()
            }),
            authors: AuthorOptions {
                highlight: authors.highlight.unwrap_or_default(),
                split_on_comma: authors.split_on_comma.unwrap_or(false),
            },
        }
    }

    pub fn allow_note_markup(&self) -> bool {
        self.render
            .as_ref()
            .and_then(|r| r.allow_note_markup)
            .unwrap_or(true)
    }

    pub fn title(&self) -> Option<&str> {
        self.render.as_ref().and_then(|r| r.title.as_deref())
    }

    pub fn bind(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.bind.as_deref())
    }

    pub fn source(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.source.as_deref())
    }
}

fn parse_or<T, F>(value: Option<&str>, key: &str, default: T, parse: F) -> T
where
    F: FnOnce(&str) -> Result<T, String>,
{
    match value {
        None => default,
        Some(v) => parse(v).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "invalid config value, using default");
            default
        }),
    }
}
