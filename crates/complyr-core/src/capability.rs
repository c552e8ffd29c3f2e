//! Capability keys and the resolved capability set.

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Toggleable platform capability. The set is closed; adding a key is a
/// deployment-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKey {
    CmsAccess,
    BlockEditor,
    StorytellingBlocks,
    InteractionBlocks,
    StylingControls,
    Publishing,
}

impl CapabilityKey {
    pub const ALL: [CapabilityKey; 6] = [
        CapabilityKey::CmsAccess,
        CapabilityKey::BlockEditor,
        CapabilityKey::StorytellingBlocks,
        CapabilityKey::InteractionBlocks,
        CapabilityKey::StylingControls,
        CapabilityKey::Publishing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKey::CmsAccess => "cms_access",
            CapabilityKey::BlockEditor => "block_editor",
            CapabilityKey::StorytellingBlocks => "storytelling_blocks",
            CapabilityKey::InteractionBlocks => "interaction_blocks",
            CapabilityKey::StylingControls => "styling_controls",
            CapabilityKey::Publishing => "publishing",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| anyhow!("unknown capability key '{normalized}'"))
    }

    fn index(self) -> usize {
        match self {
            CapabilityKey::CmsAccess => 0,
            CapabilityKey::BlockEditor => 1,
            CapabilityKey::StorytellingBlocks => 2,
            CapabilityKey::InteractionBlocks => 3,
            CapabilityKey::StylingControls => 4,
            CapabilityKey::Publishing => 5,
        }
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete mapping from every [`CapabilityKey`] to a boolean.
///
/// Every key always has a value, so a partially resolved set cannot exist.
/// Outside this crate the set is read-only; inside it can only be narrowed
/// with [`ResolvedCapabilities::deny`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedCapabilities {
    flags: [bool; 6],
}

impl ResolvedCapabilities {
    /// Every capability denied.
    pub fn none() -> Self {
        Self { flags: [false; 6] }
    }

    pub(crate) fn from_fn(mut grant: impl FnMut(CapabilityKey) -> bool) -> Self {
        let mut caps = Self::none();
        for key in CapabilityKey::ALL {
            caps.flags[key.index()] = grant(key);
        }
        caps
    }

    pub fn get(&self, key: CapabilityKey) -> bool {
        self.flags[key.index()]
    }

    /// Force `key` off. Nothing turns a key back on.
    pub(crate) fn deny(&mut self, key: CapabilityKey) {
        self.flags[key.index()] = false;
    }

    /// Logical AND with `other`.
    pub fn intersect(&self, other: &ResolvedCapabilities) -> ResolvedCapabilities {
        Self::from_fn(|key| self.get(key) && other.get(key))
    }

    /// `true` when every capability granted here is also granted by `other`.
    pub fn is_subset_of(&self, other: &ResolvedCapabilities) -> bool {
        CapabilityKey::ALL
            .into_iter()
            .all(|key| !self.get(key) || other.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CapabilityKey, bool)> + '_ {
        CapabilityKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    pub fn granted(&self) -> Vec<CapabilityKey> {
        self.iter().filter(|(_, on)| *on).map(|(key, _)| key).collect()
    }
}

impl Serialize for ResolvedCapabilities {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(CapabilityKey::ALL.len()))?;
        for (key, on) in self.iter() {
            map.serialize_entry(key.as_str(), &on)?;
        }
        map.end()
    }
}
