//! Validation state of the whole form.

use crate::{FormField, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest result per field. A missing entry means the field has not been
/// validated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationState {
    results: BTreeMap<FormField, ValidationResult>,
}

/// Why a form cannot be completed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum FormProblem {
    /// Field has no result yet.
    Unvalidated {
        /// The field.
        field: FormField,
    },
    /// Field is still being checked.
    Pending {
        /// The field.
        field: FormField,
    },
    /// Field was rejected.
    Rejected {
        /// The field.
        field: FormField,
        /// Rejection message.
        message: Box<str>,
    },
}

impl ValidationState {
    /// Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result for `field`, if any.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&ValidationResult> {
        self.results.get(&field)
    }

    /// Replace the result for `field`. Returns true if the stored value changed.
    pub fn set(&mut self, field: FormField, result: ValidationResult) -> bool {
        if self.results.get(&field) == Some(&result) {
            return false;
        }
        self.results.insert(field, result);
        true
    }

    /// Results in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &ValidationResult)> {
        self.results.iter().map(|(field, result)| (*field, result))
    }

    /// True when every field has been validated and is `Valid`.
    #[must_use]
    pub fn is_form_valid(&self) -> bool {
        self.first_problem().is_none()
    }

    /// First field, in form order, that blocks completion.
    #[must_use]
    pub fn first_problem(&self) -> Option<FormProblem> {
        FormField::ALL
            .into_iter()
            .find_map(|field| match self.results.get(&field) {
                None => Some(FormProblem::Unvalidated { field }),
                Some(ValidationResult::Checking) => Some(FormProblem::Pending { field }),
                Some(ValidationResult::Invalid(message)) => Some(FormProblem::Rejected {
                    field,
                    message: message.clone(),
                }),
                Some(ValidationResult::Valid) => None,
            })
    }
}
