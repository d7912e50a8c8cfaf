//! Creation form state machine: `Editing -> Submitting -> {Success | Failed}`.
//!
//! Coordinates only ever come from a map click. The address lookup feeds a
//! suggestion (used to re-center the map) and never moves the marker.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};

use super::api::ApiClient;
use super::debounce::AddressLookup;
use super::geocoding::AddressMatch;
use super::{ClientError, Orphanage};

/// The `about` input caps its length client-side only.
pub const ABOUT_MAX_CHARS: usize = 300;
/// Where the client navigates after a successful submission.
pub const SUCCESS_REDIRECT: &str = "/app";
pub const DEFAULT_MAP_CENTER: Position = Position {
    latitude: -27.2092052,
    longitude: -49.6401092,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Locally held copy of every field being submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanageDraft {
    pub name: String,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
    pub position: Option<Position>,
    pub images: Vec<ImageAttachment>,
}

impl Default for OrphanageDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            about: String::new(),
            instructions: String::new(),
            opening_hours: String::new(),
            // The server column defaults to false; the form starts on "yes"
            open_on_weekends: true,
            position: None,
            images: Vec::new(),
        }
    }
}

impl OrphanageDraft {
    /// Text parts of the multipart payload, in submission order. Coordinates
    /// are left out until a point has been picked on the map.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("about", self.about.clone()),
        ];
        if let Some(position) = self.position {
            fields.push(("latitude", position.latitude.to_string()));
            fields.push(("longitude", position.longitude.to_string()));
        }
        fields.push(("instructions", self.instructions.clone()));
        fields.push(("opening_hours", self.opening_hours.clone()));
        fields.push(("open_on_weekends", self.open_on_weekends.to_string()));
        fields
    }

    pub fn to_multipart(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }
        for image in &self.images {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }
        Ok(form)
    }
}

/// Why a submission did not go through, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl From<&ClientError> for SubmitFailure {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Api { body, .. } => Self {
                message: body.error.clone(),
                field_errors: body.errors.clone(),
            },
            other => Self {
                message: other.to_string(),
                field_errors: BTreeMap::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Editing,
    Submitting,
    Success(Orphanage),
    Failed(SubmitFailure),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("this form was already submitted")]
    AlreadySubmitted,
    #[error("submission failed: {}", .0.message)]
    Rejected(SubmitFailure),
}

/// Successful submission: the stored record and where to go next.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub orphanage: Orphanage,
    pub redirect_to: &'static str,
}

pub struct CreateOrphanageForm {
    draft: OrphanageDraft,
    address: String,
    state: FormState,
    lookup: AddressLookup,
}

impl CreateOrphanageForm {
    pub fn new(lookup: AddressLookup) -> Self {
        Self {
            draft: OrphanageDraft::default(),
            address: String::new(),
            state: FormState::Editing,
            lookup,
        }
    }

    pub fn draft(&self) -> &OrphanageDraft {
        &self.draft
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
        self.touch();
    }

    /// Truncates to [`ABOUT_MAX_CHARS`] characters, like the input's max length.
    pub fn set_about(&mut self, about: &str) {
        self.draft.about = about.chars().take(ABOUT_MAX_CHARS).collect();
        self.touch();
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.draft.instructions = instructions.into();
        self.touch();
    }

    pub fn set_opening_hours(&mut self, opening_hours: impl Into<String>) {
        self.draft.opening_hours = opening_hours.into();
        self.touch();
    }

    pub fn set_open_on_weekends(&mut self, open: bool) {
        self.draft.open_on_weekends = open;
        self.touch();
    }

    /// Updates the address text and reschedules the debounced lookup.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
        self.lookup.on_address_change(&self.address);
        self.touch();
    }

    /// The only way coordinates enter the draft.
    pub fn handle_map_click(&mut self, latitude: f64, longitude: f64) {
        self.draft.position = Some(Position {
            latitude,
            longitude,
        });
        self.touch();
    }

    /// Replaces the selected images.
    pub fn select_images(&mut self, images: Vec<ImageAttachment>) {
        self.draft.images = images;
        self.touch();
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageAttachment> {
        if index >= self.draft.images.len() {
            return None;
        }
        let removed = self.draft.images.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn suggestion(&self) -> Option<AddressMatch> {
        self.lookup.suggestion()
    }

    /// Marker position, present once the user has clicked the map.
    pub fn marker(&self) -> Option<Position> {
        self.draft.position
    }

    /// Where the map should be centered: the address suggestion if there is one.
    pub fn map_center(&self) -> Position {
        self.suggestion()
            .map(|found| Position {
                latitude: found.lat,
                longitude: found.lon,
            })
            .unwrap_or(DEFAULT_MAP_CENTER)
    }

    /// Sends the draft to the API and moves the form to `Success` or `Failed`.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<SubmitOutcome, FormError> {
        match self.state {
            FormState::Submitting => return Err(FormError::AlreadySubmitting),
            FormState::Success(_) => return Err(FormError::AlreadySubmitted),
            FormState::Editing | FormState::Failed(_) => {}
        }

        let in_flight = InFlight::begin(&mut self.state);
        match api.create_orphanage(&self.draft).await {
            Ok(orphanage) => {
                tracing::info!(id = orphanage.id, "Orphanage registered");
                in_flight.finish(FormState::Success(orphanage.clone()));
                Ok(SubmitOutcome {
                    orphanage,
                    redirect_to: SUCCESS_REDIRECT,
                })
            }
            Err(err) => {
                tracing::error!(error = %err, "Orphanage submission failed");
                let failure = SubmitFailure::from(&err);
                in_flight.finish(FormState::Failed(failure.clone()));
                Err(FormError::Rejected(failure))
            }
        }
    }

    // Editing after a failure starts a new attempt
    fn touch(&mut self) {
        if matches!(self.state, FormState::Failed(_)) {
            self.state = FormState::Editing;
        }
    }
}

/// Holds the form in `Submitting` while a request is pending. Dropping it
/// without a result (the submit future was cancelled) returns to `Editing`.
struct InFlight<'a> {
    state: &'a mut FormState,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut FormState) -> Self {
        *state = FormState::Submitting;
        Self { state }
    }

    fn finish(self, outcome: FormState) {
        *self.state = outcome;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if matches!(self.state, FormState::Submitting) {
            *self.state = FormState::Editing;
        }
    }
}
