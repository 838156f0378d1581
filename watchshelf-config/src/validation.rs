use std::fmt;

use url::Url;
use watchshelf_core::catalog::{CatalogKind, ListStatus};
use watchshelf_core::library::library_ids_match;

use crate::models::ShelfConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{} ({})", self.message, hint),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(&mut self, message: S, hint: H) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

impl ShelfConfig {
    /// Non-fatal sanity checks. A config is never rejected; the importer and
    /// the remote client report their own errors at runtime.
    pub fn validate(&self) -> ConfigWarnings {
        let mut warnings = ConfigWarnings::default();

        if self.simkl.client_id.trim().is_empty() {
            warnings.push_with_hint(
                "simkl.client_id is empty",
                "register an app on simkl.com and set its client id",
            );
        }
        if Url::parse(&self.simkl.api_base).is_err() {
            warnings.push(format!(
                "simkl.api_base '{}' is not a valid URL",
                self.simkl.api_base
            ));
        }
        if self.simkl.list_status.parse::<ListStatus>().is_err() {
            warnings.push(format!(
                "simkl.list_status '{}' is unknown, plantowatch will be used",
                self.simkl.list_status
            ));
        }

        if !CatalogKind::ALL
            .iter()
            .any(|kind| self.targets.get(*kind).is_configured())
        {
            warnings.push_with_hint(
                "no import target is configured",
                "set targets.movies.path or targets.movies.library_id",
            );
        }
        for kind in CatalogKind::ALL {
            let Some(id) = self.targets.get(kind).library_id.as_deref() else {
                continue;
            };
            let known = self
                .host
                .libraries
                .iter()
                .any(|library| library_ids_match(&library.id, id));
            if !known {
                warnings.push(format!(
                    "{} target references unknown library '{}'",
                    kind, id
                ));
            }
        }

        if !self.stubs.dir.is_dir() {
            warnings.push_with_hint(
                format!("stub directory {} does not exist", self.stubs.dir.display()),
                "add files such as 90min.mkv to it",
            );
        }

        if let Some(url) = self.host.rescan_url.as_deref()
            && Url::parse(url).is_err()
        {
            warnings.push(format!("host.rescan_url '{}' is not a valid URL", url));
        }

        if self.schedule.enabled && self.schedule.interval.is_zero() {
            warnings.push("schedule.interval is zero, scheduled imports are disabled");
        }
        if self.schedule.max_runtime.is_zero() {
            warnings.push("schedule.max_runtime is zero, scheduled imports will time out at once");
        }

        warnings
    }
}
