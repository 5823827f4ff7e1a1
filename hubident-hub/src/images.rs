use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One selectable image: either just the image reference, or a table with
/// a collaboration switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Image(String),
    Detailed {
        image: String,
        #[serde(default = "default_allow_collab")]
        allow_collab: bool,
    },
}

fn default_allow_collab() -> bool {
    true
}

impl ImageEntry {
    pub fn image(&self) -> &str {
        match self {
            Self::Image(image) | Self::Detailed { image, .. } => image,
        }
    }

    pub fn allow_collab(&self) -> bool {
        match self {
            Self::Image(_) => true,
            Self::Detailed { allow_collab, .. } => *allow_collab,
        }
    }
}

/// Images users may pick, keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageCatalog(BTreeMap<String, ImageEntry>);

impl ImageCatalog {
    pub fn insert(&mut self, name: impl Into<String>, entry: ImageEntry) {
        self.0.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ImageEntry> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the entry with this image reference allows collaboration.
    /// Unknown images never do.
    pub fn allows_collab(&self, image: &str) -> bool {
        self.0
            .values()
            .find(|entry| entry.image() == image)
            .is_some_and(ImageEntry::allow_collab)
    }
}

impl FromIterator<(String, ImageEntry)> for ImageCatalog {
    fn from_iter<T: IntoIterator<Item = (String, ImageEntry)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
