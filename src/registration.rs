//! Public registration flow: local checks, duplicate-email check, submission.

use tracing::{info, warn};

use crate::client::PanelistApi;
use crate::error::{AppError, Result};
use crate::models::{Domain, Domains, NewPanelist, Photo};

/// Editable state of the registration form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub nom: String,
    pub prenom: String,
    pub contact: String,
    pub email: String,
    pub poste: String,
    pub organisation: String,
    /// Checked domains, in the order they were ticked.
    pub domaines: Vec<Domain>,
    pub autre_domaine: String,
    pub experience: String,
    pub photo: Option<Photo>,
}

impl RegistrationForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_checked(&self, domain: Domain) -> bool {
        self.domaines.contains(&domain)
    }

    /// Tick or untick a domain, keeping tick order.
    pub fn set_domain(&mut self, domain: Domain, checked: bool) {
        if checked {
            if !self.is_checked(domain) {
                self.domaines.push(domain);
            }
        } else {
            self.domaines.retain(|d| *d != domain);
        }
    }

    /// Whether the custom-domain field is shown and required.
    pub fn wants_autre(&self) -> bool {
        self.is_checked(Domain::Autre)
    }

    /// Check the form locally and build the submission payload.
    ///
    /// The experience check runs first; none of these checks touch the network.
    pub fn validate(&self) -> Result<NewPanelist> {
        let experience = parse_experience(&self.experience)?;

        let required = [
            ("Nom", &self.nom),
            ("Prénoms", &self.prenom),
            ("Contact", &self.contact),
            ("e-mail", &self.email),
            ("Poste occupé", &self.poste),
            ("Organisation/Structure/Institution", &self.organisation),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("Le champ {label} est obligatoire")));
            }
        }

        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err(AppError::validation("Veuillez entrer une adresse e-mail valide"));
        }

        if self.domaines.is_empty() {
            return Err(AppError::validation("Veuillez choisir au moins un domaine d'expertise"));
        }

        let autre_domaine = if self.wants_autre() {
            let text = self.autre_domaine.trim();
            if text.is_empty() {
                return Err(AppError::validation("Veuillez préciser votre domaine (Autre)"));
            }
            text.to_string()
        } else {
            String::new()
        };

        let photo = self
            .photo
            .clone()
            .ok_or_else(|| AppError::validation("Veuillez joindre une photo (JPEG/PNG)"))?;

        Ok(NewPanelist {
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            email: email.to_string(),
            contact: self.contact.trim().to_string(),
            poste: self.poste.trim().to_string(),
            organisation: self.organisation.trim().to_string(),
            domaines: Domains::from(self.domaines.as_slice()),
            autre_domaine,
            experience,
            photo,
        })
    }
}

/// Registration screen state: the form, or the confirmation panel once sent.
#[derive(Debug, Default)]
pub struct FormState {
    pub form: RegistrationForm,
    /// Confirmation panel shown instead of the form.
    pub submitted: bool,
    /// Request in flight.
    pub sending: bool,
    pub error: Option<String>,
}

impl FormState {
    /// Record a local failure (validation, photo selection) without sending.
    pub fn fail(&mut self, error: &AppError) {
        self.error = Some(error.user_message());
    }

    pub fn start_sending(&mut self) {
        self.sending = true;
        self.error = None;
    }

    /// Apply the outcome of [`submit_registration`].
    pub fn finish(&mut self, result: Result<()>) {
        self.sending = false;
        match result {
            Ok(()) => {
                self.form.reset();
                self.error = None;
                self.submitted = true;
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Leave the confirmation panel for a fresh form.
    pub fn start_over(&mut self) {
        *self = Self::default();
    }
}

/// Years of experience: a non-negative whole number.
pub fn parse_experience(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| AppError::validation("Veuillez entrer un nombre valide pour les années d'expérience"))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Validate, check for a duplicate email, then create the panelist.
///
/// The create call is never made when validation fails or when the email is
/// already registered.
pub async fn submit_registration<A: PanelistApi>(api: &A, form: &RegistrationForm) -> Result<()> {
    let panelist = form.validate()?;

    if api.check_email(&panelist.email).await? {
        warn!("Registration refused: {} already registered", panelist.email);
        return Err(AppError::DuplicateEmail(panelist.email));
    }

    api.submit_form(&panelist).await?;
    info!("Registered panelist {} {}", panelist.prenom, panelist.nom);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockApi;

    fn filled_form() -> RegistrationForm {
        RegistrationForm {
            nom: "Koné".to_string(),
            prenom: "Awa".to_string(),
            contact: "0700000000".to_string(),
            email: "awa@example.ci".to_string(),
            poste: "Directrice".to_string(),
            organisation: "MTND".to_string(),
            domaines: vec![Domain::Sante],
            autre_domaine: String::new(),
            experience: "12".to_string(),
            photo: Some(Photo::from_bytes("awa.png", vec![0x89, 0x50, 0x4E, 0x47]).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_bad_experience_makes_no_call() {
        for value in ["", "  ", "douze", "3.5", "-1"] {
            let api = MockApi::default();
            let mut form = filled_form();
            form.experience = value.to_string();

            let err = submit_registration(&api, &form).await.unwrap_err();
            assert_eq!(
                err.user_message(),
                "Veuillez entrer un nombre valide pour les années d'expérience",
                "value {value:?}"
            );
            assert!(api.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_experience_checked_before_other_fields() {
        let api = MockApi::default();
        let form = RegistrationForm::default();

        let err = submit_registration(&api, &form).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Veuillez entrer un nombre valide pour les années d'expérience"
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_never_submits() {
        let api = MockApi {
            existing_emails: vec!["awa@example.ci".to_string()],
            ..Default::default()
        };

        let err = submit_registration(&api, &filled_form()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail(_)));
        assert_eq!(api.calls(), ["check_email:awa@example.ci"]);
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let api = MockApi::default();

        submit_registration(&api, &filled_form()).await.unwrap();
        assert_eq!(
            api.calls(),
            ["check_email:awa@example.ci", "submit_form:awa@example.ci"]
        );
    }

    #[tokio::test]
    async fn test_server_rejection_is_generic() {
        let api = MockApi {
            submit_status: Some(500),
            ..Default::default()
        };

        let err = submit_registration(&api, &filled_form()).await.unwrap_err();
        assert_eq!(err.user_message(), "Erreur lors de la soumission du formulaire");
    }

    #[tokio::test]
    async fn test_success_shows_confirmation_and_clears_form() {
        let api = MockApi::default();
        let mut state = FormState {
            form: filled_form(),
            ..Default::default()
        };

        state.start_sending();
        let result = submit_registration(&api, &state.form).await;
        state.finish(result);

        assert!(state.submitted);
        assert!(!state.sending);
        assert!(state.error.is_none());
        assert!(state.form.nom.is_empty());
        assert!(state.form.email.is_empty());
        assert!(state.form.domaines.is_empty());
        assert!(state.form.experience.is_empty());
        assert!(state.form.photo.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_shows_connection_error() {
        let api = MockApi {
            transport_down: true,
            ..Default::default()
        };
        let mut state = FormState {
            form: filled_form(),
            ..Default::default()
        };

        state.start_sending();
        let result = submit_registration(&api, &state.form).await;
        assert!(matches!(result, Err(AppError::Http(_))));
        state.finish(result);

        let shown = state.error.as_deref().unwrap_or_default();
        assert!(shown.starts_with("Erreur de connexion au serveur: "), "{shown}");
        assert_ne!(shown, "Erreur lors de la soumission du formulaire");
        assert_eq!(state.form.nom, "Koné");
        assert_eq!(api.calls(), ["check_email:awa@example.ci"]);
    }

    #[test]
    fn test_failure_keeps_form() {
        let mut state = FormState {
            form: filled_form(),
            ..Default::default()
        };
        state.start_sending();
        state.finish(Err(AppError::DuplicateEmail("awa@example.ci".to_string())));

        assert!(!state.submitted);
        assert_eq!(state.error.as_deref(), Some("Cet email est déjà enregistré"));
        assert_eq!(state.form.nom, "Koné");
    }

    #[test]
    fn test_autre_requires_text() {
        let mut form = filled_form();
        form.set_domain(Domain::Autre, true);
        assert!(form.validate().is_err());

        form.autre_domaine = "IA".to_string();
        let panelist = form.validate().unwrap();
        assert_eq!(panelist.domaines.as_slice(), ["Santé", "Autre"]);
        assert_eq!(panelist.autre_domaine, "IA");
    }

    #[test]
    fn test_autre_text_dropped_when_unchecked() {
        let mut form = filled_form();
        form.autre_domaine = "IA".to_string();
        assert_eq!(form.validate().unwrap().autre_domaine, "");
    }

    #[test]
    fn test_requires_domain_and_photo() {
        let mut form = filled_form();
        form.domaines.clear();
        assert!(form.validate().is_err());

        let mut form = filled_form();
        form.photo = None;
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_required_text_field() {
        let mut form = filled_form();
        form.organisation = " ".to_string();
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.user_message(),
            "Le champ Organisation/Structure/Institution est obligatoire"
        );
    }

    #[test]
    fn test_invalid_email() {
        let mut form = filled_form();
        form.email = "awa.example.ci".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_set_domain_keeps_order_and_dedups() {
        let mut form = RegistrationForm::default();
        form.set_domain(Domain::Education, true);
        form.set_domain(Domain::Economie, true);
        form.set_domain(Domain::Education, true);
        assert_eq!(form.domaines, [Domain::Education, Domain::Economie]);

        form.set_domain(Domain::Education, false);
        assert_eq!(form.domaines, [Domain::Economie]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = filled_form();
        form.reset();
        assert!(form.nom.is_empty());
        assert!(form.domaines.is_empty());
        assert!(form.photo.is_none());
    }

    #[test]
    fn test_text_fields_payload() {
        let fields = filled_form().validate().unwrap().text_fields();
        let names: Vec<_> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            [
                "nom",
                "prenom",
                "email",
                "contact",
                "poste",
                "organisation",
                "domaines",
                "autreDomaine",
                "experience"
            ]
        );
        assert_eq!(fields[6].1, r#"["Santé"]"#);
        assert_eq!(fields[8].1, "12");
    }
}
