//! Button files on disk
//!
//! A file holds a single button object, an array of buttons, or an object
//! with a `buttons` array. Saving keeps the layout the file already had.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::warn;
use walkdir::WalkDir;

use crate::domain::button::ButtonConfig;

/// Skip files larger than this when scanning
const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileLayout {
    Single,
    List,
    Wrapped,
}

/// A button together with the file it was read from
#[derive(Debug, Clone)]
pub struct StoredButton {
    pub path: PathBuf,
    pub config: ButtonConfig,
}

#[derive(Debug, Default)]
pub struct ButtonLibrary {
    buttons: Vec<StoredButton>,
    /// Files that could not be read while scanning
    pub errors: Vec<String>,
}

impl ButtonLibrary {
    /// Open a button file, or scan a directory of them
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self::scan(path))
        } else {
            Self::load_file(path)
        }
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (_, buttons) = read_file(path)?;
        Ok(Self {
            buttons: buttons
                .into_iter()
                .map(|config| StoredButton {
                    path: path.to_path_buf(),
                    config,
                })
                .collect(),
            errors: Vec::new(),
        })
    }

    /// Load every `*.json` file under `root`; unreadable files are recorded in `errors`
    pub fn scan(root: impl AsRef<Path>) -> Self {
        let mut library = Self::default();

        for entry in WalkDir::new(root.as_ref())
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    library.errors.push(err.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if entry.metadata().map(|meta| meta.len() > MAX_FILE_BYTES).unwrap_or(true) {
                continue;
            }

            match Self::load_file(path) {
                Ok(loaded) => library.buttons.extend(loaded.buttons),
                Err(err) => {
                    warn!(path = %path.display(), "skipping button file: {err:#}");
                    library.errors.push(format!("{}: {err:#}", path.display()));
                }
            }
        }

        library
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Find a button by name; without a name the library must hold exactly one
    pub fn find(&self, name: Option<&str>) -> Result<&StoredButton> {
        match name {
            Some(name) => self
                .buttons
                .iter()
                .find(|button| button.config.name == name)
                .with_context(|| format!("no button named '{name}'")),
            None => match self.buttons.as_slice() {
                [only] => Ok(only),
                [] => bail!("no buttons found"),
                many => bail!("{} buttons found; pick one with --name", many.len()),
            },
        }
    }

    /// Write `updated` back to `path`, replacing the button with the same name
    pub fn save(path: impl AsRef<Path>, updated: &ButtonConfig) -> Result<()> {
        let path = path.as_ref();
        let (layout, mut buttons) = read_file(path)?;
        let slot = buttons
            .iter_mut()
            .find(|button| button.name == updated.name)
            .with_context(|| format!("button '{}' not in {}", updated.name, path.display()))?;
        *slot = updated.clone();

        let value = match layout {
            FileLayout::Single => serde_json::to_value(&buttons[0])?,
            FileLayout::List => serde_json::to_value(&buttons)?,
            FileLayout::Wrapped => serde_json::json!({ "buttons": buttons }),
        };
        let mut content = serde_json::to_string_pretty(&value)?;
        content.push('\n');
        fs::write(path, content).with_context(|| format!("write {}", path.display()))
    }
}

fn read_file(path: &Path) -> Result<(FileLayout, Vec<ButtonConfig>)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;

    let (layout, items) = match value {
        Value::Array(items) => (FileLayout::List, items),
        Value::Object(mut map) if map.get("buttons").is_some_and(Value::is_array) => {
            let Some(Value::Array(items)) = map.remove("buttons") else {
                bail!("{}: `buttons` is not an array", path.display());
            };
            (FileLayout::Wrapped, items)
        }
        object @ Value::Object(_) => (FileLayout::Single, vec![object]),
        _ => bail!("{}: expected a button object or array", path.display()),
    };

    let buttons = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ButtonConfig>(item)
                .with_context(|| format!("{}: button #{index}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((layout, buttons))
}
