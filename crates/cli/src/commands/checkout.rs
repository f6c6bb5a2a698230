//! The checkout command.

use clap::Args;
use heavyline_core::{DeliveryType, PaymentMethod};
use heavyline_storefront::services::checkout::CheckoutError;
use heavyline_storefront::storage::FileStore;
use heavyline_storefront::{AppError, Storefront};

use super::{CliError, say};

/// Contact details for the order. Name and email default to the signed-in
/// user's.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Full name of the contact person
    #[arg(long)]
    full_name: Option<String>,

    /// Contact email
    #[arg(long)]
    email: Option<String>,

    /// Contact phone
    #[arg(long, default_value = "")]
    phone: String,

    /// Delivery city
    #[arg(long, default_value = "")]
    city: String,

    /// Payment method: card, sbp or cash
    #[arg(long)]
    payment: Option<PaymentMethod>,

    /// Delivery type: pickup or delivery
    #[arg(long)]
    delivery: Option<DeliveryType>,

    /// Company name
    #[arg(long)]
    company: Option<String>,

    /// Comment for the manager
    #[arg(long)]
    message: Option<String>,
}

pub async fn run(storefront: &mut Storefront<FileStore>, args: CheckoutArgs) -> Result<(), CliError> {
    storefront.begin_checkout()?;

    let form = storefront.checkout_form_mut();
    if let Some(full_name) = args.full_name {
        form.full_name = full_name;
    }
    if let Some(email) = args.email {
        form.email = email;
    }
    form.phone = args.phone;
    form.city = args.city;
    form.payment_method = args.payment;
    form.delivery_type = args.delivery;
    form.company_name = args.company.unwrap_or_default();
    form.message = args.message.unwrap_or_default();

    match storefront.submit_order().await {
        Ok(receipt) => {
            say(format_args!(
                "Заявка №{} оформлена ({})",
                receipt.request_id, receipt.status
            ))?;
            Ok(())
        }
        Err(AppError::Checkout(CheckoutError::Invalid(errors))) => {
            for (field, error) in errors.iter() {
                say(format_args!("{field}: {error}"))?;
            }
            Err(AppError::Checkout(CheckoutError::Invalid(errors)).into())
        }
        Err(e) => Err(e.into()),
    }
}
