//! Session commands.

use heavyline_storefront::Storefront;
use heavyline_storefront::storage::FileStore;
use secrecy::SecretString;

use super::{CliError, say};

pub async fn login(
    storefront: &mut Storefront<FileStore>,
    email: &str,
    password: String,
) -> Result<(), CliError> {
    let password = SecretString::from(password);
    let session = storefront.login(email, &password).await?;
    say(format_args!("Вы вошли как {}", session.display_name()))?;
    Ok(())
}

pub async fn logout(storefront: &mut Storefront<FileStore>) -> Result<(), CliError> {
    storefront.logout().await?;
    say("Вы вышли из аккаунта")?;
    Ok(())
}

pub async fn whoami(storefront: &mut Storefront<FileStore>) -> Result<(), CliError> {
    let session = storefront.whoami().await?;
    say(format_args!("{} <{}>", session.display_name(), session.email))?;
    if session.is_admin {
        say("Администратор")?;
    }
    Ok(())
}

pub async fn orders(storefront: &mut Storefront<FileStore>) -> Result<(), CliError> {
    let orders = storefront.my_orders().await?;
    if orders.is_empty() {
        say("Заявок пока нет")?;
        return Ok(());
    }
    for order in orders {
        say(format_args!(
            "#{}  {}  {}",
            order.request_id,
            order.request_date.as_deref().unwrap_or("-"),
            order.status
        ))?;
    }
    Ok(())
}
