//! Expertise domains and the tolerant `domaines` decoding.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Fixed expertise vocabulary offered by the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Economie,
    Environnement,
    Sante,
    Education,
    TechnologiesNumeriques,
    GouvernancePolitique,
    Autre,
}

impl Domain {
    /// All domains in form display order.
    pub const ALL: [Domain; 7] = [
        Domain::Economie,
        Domain::Environnement,
        Domain::Sante,
        Domain::Education,
        Domain::TechnologiesNumeriques,
        Domain::GouvernancePolitique,
        Domain::Autre,
    ];

    /// Label as stored by the API.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Economie => "Économie",
            Domain::Environnement => "Environnement",
            Domain::Sante => "Santé",
            Domain::Education => "Éducation",
            Domain::TechnologiesNumeriques => "Technologies Numériques",
            Domain::GouvernancePolitique => "Gouvernance/Politique",
            Domain::Autre => "Autre",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered list of domain labels attached to a panelist.
///
/// The API stores the list as a JSON-encoded array and may hand it back
/// either still encoded (a string) or already decoded (an array). Both
/// shapes, and `null`, deserialize into this type. Labels outside the
/// fixed vocabulary are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains(Vec<String>);

impl Domains {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON array text, as sent in the `domaines` multipart field.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decode the string form. A string that is not a JSON array is kept as
    /// a single raw label; a blank string is an empty list.
    pub fn from_encoded(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Vec<String>>(trimmed) {
            Ok(labels) => Self(labels),
            Err(_) => Self(vec![raw.to_string()]),
        }
    }
}

impl From<&[Domain]> for Domains {
    fn from(domains: &[Domain]) -> Self {
        Self(domains.iter().map(|d| d.label().to_string()).collect())
    }
}

impl<'a> IntoIterator for &'a Domains {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Domains {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Domains {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DomainsVisitor;

        impl<'de> Visitor<'de> for DomainsVisitor {
            type Value = Domains;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of domains or its JSON-encoded string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Domains, E> {
                Ok(Domains::from_encoded(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Domains, A::Error> {
                let mut labels = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(label) = seq.next_element::<String>()? {
                    labels.push(label);
                }
                Ok(Domains(labels))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Domains, E> {
                Ok(Domains::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Domains, E> {
                Ok(Domains::default())
            }
        }

        deserializer.deserialize_any(DomainsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        domaines: Domains,
    }

    fn decode(json: &str) -> Domains {
        serde_json::from_str::<Wrapper>(json).unwrap().domaines
    }

    #[test]
    fn test_decode_array() {
        let d = decode(r#"{"domaines": ["Santé", "Éducation"]}"#);
        assert_eq!(d.as_slice(), ["Santé", "Éducation"]);
    }

    #[test]
    fn test_decode_encoded_string_matches_array() {
        let from_string = decode(r#"{"domaines": "[\"Santé\",\"Éducation\"]"}"#);
        let from_array = decode(r#"{"domaines": ["Santé", "Éducation"]}"#);
        assert_eq!(from_string, from_array);
    }

    #[test]
    fn test_decode_null_and_missing() {
        assert!(decode(r#"{"domaines": null}"#).is_empty());
        assert!(decode("{}").is_empty());
        assert!(decode(r#"{"domaines": ""}"#).is_empty());
    }

    #[test]
    fn test_decode_raw_string_kept() {
        let d = decode(r#"{"domaines": "Santé publique"}"#);
        assert_eq!(d.as_slice(), ["Santé publique"]);
    }

    #[test]
    fn test_to_json() {
        let d = Domains::from(&[Domain::Sante, Domain::Autre][..]);
        assert_eq!(d.to_json(), r#"["Santé","Autre"]"#);
    }
}
