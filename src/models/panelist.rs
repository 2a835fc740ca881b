//! Panelist records as returned by the API, and the create payload.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::domain::Domains;
use crate::error::{AppError, Result};

/// Maximum accepted photo size (5 MB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Panelist as listed by `GET /api/panelistes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panelist {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub poste: String,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub domaines: Domains,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub autre_domaine: Option<String>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience: u32,
    /// Stored photo reference (path or URL), opaque to the client.
    #[serde(default)]
    pub photo: Option<String>,
}

impl Panelist {
    /// "nom prénom", as shown in the table and summary card.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom)
    }

    /// "prénom nom", as written to exports.
    pub fn export_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    /// Domain column for on-screen display.
    ///
    /// At most three labels are listed; extra ones collapse into a
    /// "... (+N)" suffix. The custom domain is appended when present.
    pub fn domains_summary(&self) -> String {
        let labels = self.domaines.as_slice();
        let mut text = labels.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        if labels.len() > 3 {
            text.push_str(&format!("... (+{})", labels.len() - 3));
        }
        if let Some(other) = &self.autre_domaine {
            text.push_str(&format!(", {other}"));
        }
        text
    }

    /// Full domain column for exports: every label plus the custom domain.
    pub fn domains_full(&self) -> String {
        self.domaines
            .iter()
            .map(String::as_str)
            .chain(self.autre_domaine.as_deref())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn experience_label(&self) -> String {
        format!("{} ans", self.experience)
    }
}

/// Validated registration, ready for `POST /api/submit-form`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPanelist {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub contact: String,
    pub poste: String,
    pub organisation: String,
    pub domaines: Domains,
    pub autre_domaine: String,
    pub experience: u32,
    pub photo: Photo,
}

impl NewPanelist {
    /// Text parts of the multipart payload, in submission order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nom", self.nom.clone()),
            ("prenom", self.prenom.clone()),
            ("email", self.email.clone()),
            ("contact", self.contact.clone()),
            ("poste", self.poste.clone()),
            ("organisation", self.organisation.clone()),
            ("domaines", self.domaines.to_json()),
            ("autreDomaine", self.autre_domaine.clone()),
            ("experience", self.experience.to_string()),
        ]
    }
}

/// Image attached to a registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Photo {
    /// Read a photo from disk, enforcing type and size limits.
    pub fn load(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation("Nom de fichier invalide"))?
            .to_string();

        // Check the size before reading the whole file into memory.
        let len = std::fs::metadata(path)?.len();
        if len > MAX_PHOTO_BYTES as u64 {
            return Err(AppError::validation("La photo ne doit pas dépasser 5MB"));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(file_name, bytes)
    }

    /// Build a photo from in-memory bytes, enforcing type and size limits.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name)
            .ok_or_else(|| AppError::validation("Formats acceptés: JPEG, PNG (max 5MB)"))?;
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(AppError::validation("La photo ne doit pas dépasser 5MB"));
        }
        Ok(Self { file_name, mime, bytes })
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Years of experience arrive as a number or a numeric string.
fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    struct YearsVisitor;

    impl<'de> Visitor<'de> for YearsVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative number of years")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u32, E> {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u32, E> {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u32, E> {
            if v.is_finite() && v >= 0.0 && v <= u32::MAX as f64 {
                Ok(v as u32)
            } else {
                Err(E::custom(format!("invalid experience: {v}")))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<u32, E> {
            v.trim().parse().map_err(E::custom)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<u32, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(YearsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panelist(domaines: &[&str], autre: Option<&str>) -> Panelist {
        Panelist {
            id: 1,
            nom: "Koné".to_string(),
            prenom: "Awa".to_string(),
            email: "awa@example.ci".to_string(),
            contact: "0700000000".to_string(),
            poste: "Directrice".to_string(),
            organisation: "MTND".to_string(),
            domaines: Domains::new(domaines.iter().map(|s| s.to_string()).collect()),
            autre_domaine: autre.map(str::to_string),
            experience: 12,
            photo: None,
        }
    }

    #[test]
    fn test_decode_api_record() {
        let json = r#"{
            "id": 7,
            "nom": "Koné",
            "prenom": "Awa",
            "email": "awa@example.ci",
            "contact": "0700000000",
            "poste": "Directrice",
            "organisation": "MTND",
            "domaines": "[\"Santé\",\"Autre\"]",
            "autre_domaine": "IA",
            "experience": "12",
            "photo": "uploads/awa.png"
        }"#;
        let p: Panelist = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.domaines.as_slice(), ["Santé", "Autre"]);
        assert_eq!(p.autre_domaine.as_deref(), Some("IA"));
        assert_eq!(p.experience, 12);
    }

    #[test]
    fn test_decode_blank_autre_and_numeric_experience() {
        let json = r#"{"id": 1, "nom": "A", "prenom": "B", "email": "a@b.ci",
            "domaines": ["Santé"], "autre_domaine": "", "experience": 3}"#;
        let p: Panelist = serde_json::from_str(json).unwrap();
        assert_eq!(p.autre_domaine, None);
        assert_eq!(p.experience, 3);
    }

    #[test]
    fn test_domains_summary_caps_at_three() {
        let p = panelist(&["Économie", "Environnement", "Santé", "Éducation", "Autre"], Some("IA"));
        assert_eq!(p.domains_summary(), "Économie, Environnement, Santé... (+2), IA");
    }

    #[test]
    fn test_domains_full_lists_everything() {
        let p = panelist(&["Économie", "Environnement", "Santé", "Éducation", "Autre"], Some("IA"));
        assert_eq!(p.domains_full(), "Économie, Environnement, Santé, Éducation, Autre, IA");
    }

    #[test]
    fn test_names() {
        let p = panelist(&[], None);
        assert_eq!(p.display_name(), "Koné Awa");
        assert_eq!(p.export_name(), "Awa Koné");
        assert_eq!(p.experience_label(), "12 ans");
    }

    #[test]
    fn test_photo_rejects_large_file() {
        let err = Photo::from_bytes("big.png", vec![0; MAX_PHOTO_BYTES + 1]).unwrap_err();
        assert_eq!(err.user_message(), "La photo ne doit pas dépasser 5MB");
    }

    #[test]
    fn test_photo_rejects_other_types() {
        assert!(Photo::from_bytes("cv.pdf", vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_photo_mime() {
        assert_eq!(Photo::from_bytes("a.JPG", vec![1]).unwrap().mime, "image/jpeg");
        assert_eq!(Photo::from_bytes("a.png", vec![1]).unwrap().mime, "image/png");
    }

    #[test]
    fn test_photo_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.jpeg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let photo = Photo::load(&path).unwrap();
        assert_eq!(photo.file_name, "portrait.jpeg");
        assert_eq!(photo.bytes.len(), 3);
    }
}
