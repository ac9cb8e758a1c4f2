//! Booking form validation.
//!
//! Advisory only: it decides whether the form may be sent and which field
//! gets focus. The server does not repeat these shape checks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Minimum length of a trimmed name
pub const MIN_NAME_LEN: usize = 2;

/// Fields that are checked, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Message,
}

impl FormField {
    pub const ORDER: [FormField; 3] = [FormField::Name, FormField::Email, FormField::Message];
}

/// Current values of the booking form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// Outcome of checking the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormCheck {
    /// Invalid fields in focus order
    pub invalid: Vec<FormField>,
}

impl FormCheck {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Field that should receive focus after a rejected submit
    pub fn focus(&self) -> Option<FormField> {
        self.invalid.first().copied()
    }

    pub fn is_invalid(&self, field: FormField) -> bool {
        self.invalid.contains(&field)
    }
}

impl LeadForm {
    pub fn name_ok(&self) -> bool {
        self.name.trim().chars().count() >= MIN_NAME_LEN
    }

    pub fn email_ok(&self) -> bool {
        EMAIL_SHAPE.is_match(self.email.trim())
    }

    pub fn message_ok(&self) -> bool {
        !self.message.trim().is_empty()
    }

    fn field_ok(&self, field: FormField) -> bool {
        match field {
            FormField::Name => self.name_ok(),
            FormField::Email => self.email_ok(),
            FormField::Message => self.message_ok(),
        }
    }

    pub fn check(&self) -> FormCheck {
        FormCheck {
            invalid: FormField::ORDER
                .into_iter()
                .filter(|f| !self.field_ok(*f))
                .collect(),
        }
    }

    /// Whether the send button is enabled
    pub fn can_submit(&self, sending: bool) -> bool {
        !sending && self.check().is_valid()
    }
}

/// Form state with error display tracking.
///
/// Errors for a field only show after it was touched, or after a submit
/// attempt.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub form: LeadForm,
    pub sending: bool,
    show_errors: bool,
    touched: Vec<FormField>,
}

/// What a submit click leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// Send the request
    Send,
    /// Stay on the form and focus this field
    Focus(FormField),
    /// A request is already in flight
    Busy,
}

impl FormState {
    pub fn new(form: LeadForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    /// Mark a field as visited (on blur)
    pub fn touch(&mut self, field: FormField) {
        if !self.touched.contains(&field) {
            self.touched.push(field);
        }
    }

    /// Whether an error is displayed for `field`
    pub fn shows_error(&self, field: FormField) -> bool {
        (self.show_errors || self.touched.contains(&field)) && self.form.check().is_invalid(field)
    }

    /// Handle a submit click
    pub fn submit(&mut self) -> SubmitAction {
        if self.sending {
            return SubmitAction::Busy;
        }

        match self.form.check().focus() {
            Some(field) => {
                self.show_errors = true;
                SubmitAction::Focus(field)
            }
            None => {
                self.sending = true;
                SubmitAction::Send
            }
        }
    }

    /// Settle the in-flight request.
    ///
    /// A delivered request clears the form for the next lead; a failed one
    /// keeps the values so the visitor can retry.
    pub fn finish(&mut self, delivered: bool) {
        self.sending = false;
        if delivered {
            self.form = LeadForm::default();
            self.show_errors = false;
            self.touched.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> LeadForm {
        LeadForm {
            name: "Mario Rossi".to_string(),
            email: "mario@acme.it".to_string(),
            company: String::new(),
            message: "Need an MVP".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let form = valid_form();
        assert!(form.check().is_valid());
        assert!(form.can_submit(false));
        assert!(!form.can_submit(true));
    }

    #[test]
    fn test_name_rules() {
        let mut form = valid_form();
        form.name = "  A ".to_string();
        assert!(!form.name_ok());
        form.name = " Al ".to_string();
        assert!(form.name_ok());
    }

    #[test]
    fn test_email_shape() {
        let mut form = valid_form();
        for bad in ["", "mario", "mario@acme", "mario @acme.it", "@acme.it", "a@b@c.it"] {
            form.email = bad.to_string();
            assert!(!form.email_ok(), "accepted {:?}", bad);
        }
        form.email = "  mario.rossi@acme.co.uk ".to_string();
        assert!(form.email_ok());
    }

    #[test]
    fn test_focus_order() {
        let form = LeadForm {
            name: "M".to_string(),
            email: "nope".to_string(),
            company: String::new(),
            message: "   ".to_string(),
        };

        let check = form.check();
        assert_eq!(
            check.invalid,
            vec![FormField::Name, FormField::Email, FormField::Message]
        );
        assert_eq!(check.focus(), Some(FormField::Name));

        let form = LeadForm {
            name: "Mario".to_string(),
            ..form
        };
        assert_eq!(form.check().focus(), Some(FormField::Email));
    }

    #[test]
    fn test_errors_hidden_until_touched_or_submitted() {
        let mut state = FormState::new(LeadForm {
            message: "hi".to_string(),
            ..LeadForm::default()
        });

        assert!(!state.shows_error(FormField::Name));

        state.touch(FormField::Email);
        assert!(state.shows_error(FormField::Email));
        assert!(!state.shows_error(FormField::Name));

        assert_eq!(state.submit(), SubmitAction::Focus(FormField::Name));
        assert!(state.shows_error(FormField::Name));
        assert!(!state.shows_error(FormField::Message));
        assert!(!state.sending);
    }

    #[test]
    fn test_submit_sends_once() {
        let mut state = FormState::new(valid_form());
        assert_eq!(state.submit(), SubmitAction::Send);
        assert_eq!(state.submit(), SubmitAction::Busy);
        state.finish(false);
        assert_eq!(state.submit(), SubmitAction::Send);
    }

    #[test]
    fn test_finish_resets_after_delivery() {
        let mut state = FormState::new(LeadForm {
            company: "Acme".to_string(),
            ..valid_form()
        });
        state.touch(FormField::Email);
        assert_eq!(state.submit(), SubmitAction::Send);

        state.finish(false);
        assert_eq!(state.form.name, "Mario Rossi");
        assert_eq!(state.form.company, "Acme");

        assert_eq!(state.submit(), SubmitAction::Send);
        state.finish(true);
        assert!(!state.sending);
        assert_eq!(state.form, LeadForm::default());
        for field in FormField::ORDER {
            assert!(!state.shows_error(field));
        }
    }
}
