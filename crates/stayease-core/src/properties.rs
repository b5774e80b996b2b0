use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Moderation status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Active,
    Pending,
    Flagged,
    Inactive,
}

impl PropertyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Active => "active",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Flagged => "flagged",
            PropertyStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PropertyStatus::Active),
            "pending" => Ok(PropertyStatus::Pending),
            "flagged" => Ok(PropertyStatus::Flagged),
            "inactive" => Ok(PropertyStatus::Inactive),
            _ => Err(CoreError::InvalidPropertyStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureUrl {
    pub picture_url: String,
}

/// Photo references stored on a property.
///
/// Older listings carry a map of hosted picture URLs; newer ones carry ids
/// into the photo store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyPhotos {
    Ids(Vec<String>),
    Urls(BTreeMap<String, PictureUrl>),
}

impl Default for PropertyPhotos {
    fn default() -> Self {
        PropertyPhotos::Ids(Vec::new())
    }
}

impl PropertyPhotos {
    /// Ids into the photo store; empty for URL-map listings.
    #[must_use]
    pub fn photo_ids(&self) -> &[String] {
        match self {
            PropertyPhotos::Ids(ids) => ids,
            PropertyPhotos::Urls(_) => &[],
        }
    }

    /// Resolve every reference to a fetchable URL.
    ///
    /// Store ids become `{api_base}/api/property-photos/{id}/image`. Map
    /// entries are ordered by the number trailing their key, so
    /// `pictureUrl2` comes before `pictureUrl10`.
    #[must_use]
    pub fn resolve_urls(&self, api_base: &str) -> Vec<String> {
        let base = api_base.trim_end_matches('/');
        match self {
            PropertyPhotos::Ids(ids) => ids
                .iter()
                .map(|id| format!("{base}/api/property-photos/{id}/image"))
                .collect(),
            PropertyPhotos::Urls(map) => {
                let mut entries: Vec<(&String, &PictureUrl)> = map.iter().collect();
                entries.sort_by_key(|(key, _)| (trailing_number(key), (*key).clone()));
                entries
                    .into_iter()
                    .map(|(_, v)| v.picture_url.clone())
                    .filter(|url| !url.trim().is_empty())
                    .collect()
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyPhotos::Ids(ids) => ids.is_empty(),
            PropertyPhotos::Urls(map) => map.is_empty(),
        }
    }
}

fn trailing_number(key: &str) -> u64 {
    let digits: String = key
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().unwrap_or(u64::MAX)
}

/// Social profile links keyed by platform name.
pub type SocialLinks = BTreeMap<String, String>;
