//! Contact form and its client-side checks.

use std::collections::BTreeMap;
use std::fmt;

use heavyline_core::{DeliveryType, Email, PaymentMethod};

use crate::models::AuthSession;

/// Fields of the checkout form that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutField {
    FullName,
    Email,
    Phone,
    City,
    PaymentMethod,
    DeliveryType,
}

impl CheckoutField {
    /// Field label as shown on the form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "ФИО",
            Self::Email => "Email",
            Self::Phone => "Телефон",
            Self::City => "Город",
            Self::PaymentMethod => "Способ оплаты",
            Self::DeliveryType => "Способ доставки",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidEmail,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("обязательное поле"),
            Self::InvalidEmail => f.write_str("некорректный адрес"),
        }
    }
}

/// Per-field validation errors, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<CheckoutField, FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    fn insert(&mut self, field: CheckoutField, error: FieldError) {
        self.0.insert(field, error);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Validated contact details as they go into an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub city: String,
    pub company_name: Option<String>,
    pub message: Option<String>,
}

/// The checkout form as the user is filling it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub company_name: String,
    pub message: String,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_type: Option<DeliveryType>,
}

/// Everything needed to submit, once the form passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    pub contact: ContactDetails,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
}

impl CheckoutForm {
    /// Copy the user's name and email into fields that are still blank.
    pub fn prefill_from(&mut self, session: &AuthSession) {
        if self.full_name.trim().is_empty()
            && let Some(name) = &session.name
        {
            self.full_name.clone_from(name);
        }
        if self.email.trim().is_empty() {
            self.email.clone_from(&session.email);
        }
    }

    /// Check required fields and the email shape.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<ValidForm, FieldErrors> {
        let mut errors = FieldErrors::default();

        let full_name = required(&self.full_name, CheckoutField::FullName, &mut errors);
        let phone = required(&self.phone, CheckoutField::Phone, &mut errors);
        let city = required(&self.city, CheckoutField::City, &mut errors);
        let email = required(&self.email, CheckoutField::Email, &mut errors).and_then(|raw| {
            Email::parse(&raw)
                .inspect_err(|_| errors.insert(CheckoutField::Email, FieldError::InvalidEmail))
                .ok()
        });
        if self.payment_method.is_none() {
            errors.insert(CheckoutField::PaymentMethod, FieldError::Required);
        }
        if self.delivery_type.is_none() {
            errors.insert(CheckoutField::DeliveryType, FieldError::Required);
        }

        match (full_name, email, phone, city, self.payment_method, self.delivery_type) {
            (Some(full_name), Some(email), Some(phone), Some(city), Some(payment_method), Some(delivery_type))
                if errors.is_empty() =>
            {
                Ok(ValidForm {
                    contact: ContactDetails {
                        full_name,
                        email,
                        phone,
                        city,
                        company_name: optional(&self.company_name),
                        message: optional(&self.message),
                    },
                    payment_method,
                    delivery_type,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required(value: &str, field: CheckoutField, errors: &mut FieldErrors) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, FieldError::Required);
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
