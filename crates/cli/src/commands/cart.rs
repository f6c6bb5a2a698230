//! Cart commands.

use heavyline_core::QuantityUpdate;
use heavyline_storefront::Storefront;
use heavyline_storefront::storage::FileStore;

use super::{CliError, parse_id, say};

/// Print every line and the totals.
pub fn show(storefront: &Storefront<FileStore>) -> Result<(), CliError> {
    let cart = storefront.cart();
    if cart.is_empty() {
        say("Корзина пуста")?;
        return Ok(());
    }

    for line in cart.lines() {
        say(format_args!(
            "{:>6}  {}  {} x {} = {}",
            line.product_id,
            line.title,
            line.quantity,
            line.unit_price,
            line.line_total()
        ))?;
    }
    say(format_args!(
        "Товаров: {}, итого: {}",
        storefront.item_count(),
        storefront.total_price()
    ))?;
    Ok(())
}

pub async fn add(storefront: &mut Storefront<FileStore>, id: &str) -> Result<(), CliError> {
    let id = parse_id(id)?;
    let product = storefront.add_to_cart(id).await?;
    tracing::info!(product_id = %id, "Added to cart");
    say(format_args!(
        "Добавлено: {} ({}), в корзине {} шт.",
        product.title,
        product.unit_price,
        storefront.item_count()
    ))?;
    Ok(())
}

pub fn remove(storefront: &mut Storefront<FileStore>, id: &str) -> Result<(), CliError> {
    let id = parse_id(id)?;
    if storefront.remove_from_cart(id)? {
        say(format_args!("Удалено: {id}"))?;
    } else {
        say(format_args!("Позиции {id} нет в корзине"))?;
    }
    Ok(())
}

pub fn set(storefront: &mut Storefront<FileStore>, id: &str, quantity: i64) -> Result<(), CliError> {
    let id = parse_id(id)?;
    match storefront.set_quantity(id, quantity)? {
        QuantityUpdate::Updated => say(format_args!("Количество {id}: {quantity}"))?,
        QuantityUpdate::Rejected => {
            say("Количество не изменено: нужно не меньше 1, а сумма корзины слишком велика")?;
        }
        QuantityUpdate::NotFound => say(format_args!("Позиции {id} нет в корзине"))?,
    }
    Ok(())
}

pub fn clear(storefront: &mut Storefront<FileStore>) -> Result<(), CliError> {
    storefront.clear_cart()?;
    say("Корзина очищена")?;
    Ok(())
}
