use serde::{Deserialize, Serialize};
use url::Url;

/// Social media links attached to a directory entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl SocialLinks {
    /// Non-empty links as (label, url) pairs
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", self.facebook.as_deref()),
            ("LinkedIn", self.linkedin.as_deref()),
            ("Instagram", self.instagram.as_deref()),
            ("Other", self.other.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, link)| link.filter(|l| !l.trim().is_empty()).map(|l| (label, l)))
        .collect()
    }
}

/// A directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub contact: String,
    pub category: String,
    #[serde(rename = "isMember", default)]
    pub is_member: bool,
    /// Presentation assumes this implies `is_member`; not enforced
    #[serde(rename = "isBoardMember", default)]
    pub is_board_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        rename = "socialMedia",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub social_media: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl Record {
    /// Minimal record with every optional attribute unset
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            owner: None,
            contact: String::new(),
            category: category.into(),
            is_member: false,
            is_board_member: false,
            address: None,
            social_media: None,
            is_featured: None,
            website_url: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    /// Stable identifier, falling back to the display name.
    ///
    /// Two records sharing a name and lacking an id collide here; the catalog
    /// warns about such collisions at ingestion.
    pub fn key(&self) -> &str {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured.unwrap_or(false)
    }

    /// First parseable http(s) link among `website_url` and `contact`
    pub fn contact_url(&self) -> Option<Url> {
        [self.website_url.as_deref(), Some(self.contact.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .find_map(|s| {
                Url::parse(s)
                    .ok()
                    .filter(|u| matches!(u.scheme(), "http" | "https"))
            })
    }

    /// Shorten the description for list cards
    pub fn description_preview(&self, max_len: usize) -> String {
        let text = self.description.trim();

        if max_len == 0 {
            return String::new();
        }

        if text.len() <= max_len {
            text.to_string()
        } else {
            let mut end = 0;
            for (idx, ch) in text.char_indices() {
                let next = idx + ch.len_utf8();
                if next > max_len {
                    break;
                }
                end = next;
            }
            format!("{}...", &text[..end])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserializes_original_field_names() {
        let r = record(
            r#"{
                "name": "Jones Strategy and Consulting Group",
                "owner": "Darren Jones",
                "contact": "https://www.jonesscg.com/",
                "description": "Management consulting",
                "isMember": true,
                "isBoardMember": true,
                "category": "Consulting",
                "socialMedia": { "linkedin": "https://linkedin.com/in/dj" }
            }"#,
        );
        assert!(r.is_member);
        assert!(r.is_board_member);
        assert_eq!(r.owner.as_deref(), Some("Darren Jones"));
        assert_eq!(
            r.social_media.unwrap().entries(),
            vec![("LinkedIn", "https://linkedin.com/in/dj")]
        );
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let mut r = record(r#"{"name": "Acme Tacos", "category": "Food & Beverage"}"#);
        assert_eq!(r.key(), "Acme Tacos");

        r.id = Some(String::new());
        assert_eq!(r.key(), "Acme Tacos");

        r.id = Some("biz-7".to_string());
        assert_eq!(r.key(), "biz-7");
    }

    #[test]
    fn test_contact_url() {
        let mut r = record(r#"{"name": "A", "category": "Retail", "contact": ""}"#);
        assert!(r.contact_url().is_none());

        r.contact = "call 555-0100".to_string();
        assert!(r.contact_url().is_none());

        r.contact = "http://www.asilboutique.com/".to_string();
        assert_eq!(
            r.contact_url().unwrap().host_str(),
            Some("www.asilboutique.com")
        );

        r.website_url = Some("https://asil.example".to_string());
        assert_eq!(r.contact_url().unwrap().host_str(), Some("asil.example"));
    }

    #[test]
    fn test_description_preview_respects_char_boundaries() {
        let r = record(r#"{"name": "A", "category": "Retail", "description": "Café crème brûlée"}"#);
        assert_eq!(r.description_preview(4), "Caf...");
        assert_eq!(r.description_preview(100), "Café crème brûlée");
        assert_eq!(r.description_preview(0), "");
    }
}
