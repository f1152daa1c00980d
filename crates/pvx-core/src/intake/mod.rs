//! Form-intake collaborator: validate, pre-check capacity, dispatch, acknowledge.
//!
//! The acknowledgment is synchronous and says nothing about whether provisioning succeeds;
//! the outcome is only observable through the returned handle and the logs.
mod validate;
pub use validate::{TripAdvisorValidator, Validator};

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use pvx_model::{ProvisionRequest, TargetType};

use crate::{
    config::ProvisionerConfig,
    error::CoreError,
    provisioner::Provisioner,
    supervisor::{Dispatcher, ProvisionHandle},
};

pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_INVALID_URL: &str = "Invalid URL";
pub const MSG_BUSY: &str = "Sorry, we are currently busy. Please try again later";
pub const MSG_SUBMITTED: &str =
    "Your request has been submitted. Please check the following link for your data:";

/// What the submitter is told right away.
#[derive(Debug)]
pub struct Acknowledgment {
    pub message: String,
    /// Where the result file will appear, for accepted requests.
    pub output_url: Option<String>,
    pub handle: Option<ProvisionHandle>,
}

impl Acknowledgment {
    fn refused(message: &str) -> Self {
        Self {
            message: message.to_string(),
            output_url: None,
            handle: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.handle.is_some()
    }
}

pub struct Intake {
    provisioner: Provisioner,
    dispatcher: Arc<dyn Dispatcher>,
    validator: Arc<dyn Validator>,
    storage_base_url: String,
}

impl Intake {
    pub fn new(
        provisioner: Provisioner,
        dispatcher: Arc<dyn Dispatcher>,
        validator: Arc<dyn Validator>,
        cfg: &ProvisionerConfig,
    ) -> Self {
        Self {
            provisioner,
            dispatcher,
            validator,
            storage_base_url: cfg.storage_base_url.clone(),
        }
    }

    /// Predicted location of the result file of `request_id`.
    pub fn output_url(&self, request_id: Uuid, target_name: &str) -> String {
        format!("{}{request_id}-0_{target_name}.csv", self.storage_base_url)
    }

    /// Accept a hotel scrape request.
    ///
    /// Errors only on infrastructure failure during the capacity pre-check or dispatch.
    /// The pre-check is advisory: the dispatched request runs its own admission.
    #[instrument(level = "info", skip(self, email))]
    pub async fn submit(&self, email: &str, url: &str) -> Result<Acknowledgment, CoreError> {
        if !self.validator.is_valid_email(email) {
            return Ok(Acknowledgment::refused(MSG_INVALID_EMAIL));
        }
        if !self.validator.is_valid_target_url(url) {
            return Ok(Acknowledgment::refused(MSG_INVALID_URL));
        }
        let name = self.validator.extract_target_name(url);
        if name.is_empty() {
            return Ok(Acknowledgment::refused(MSG_INVALID_URL));
        }
        if let Some(busy) = self.provisioner.admit().await? {
            info!(%busy, "submission refused");
            return Ok(Acknowledgment::refused(MSG_BUSY));
        }

        let request_id = Uuid::new_v4();
        let output_url = self.output_url(request_id, &name);

        let req = ProvisionRequest::new(request_id, TargetType::Hotel, url.trim(), name);
        let handle = self.dispatcher.dispatch(req).await?;
        info!(request = %request_id, output = %output_url, "submission accepted");

        Ok(Acknowledgment {
            message: MSG_SUBMITTED.to_string(),
            output_url: Some(output_url),
            handle: Some(handle),
        })
    }
}
