//! Cart and checkout commands.

use tracing::{info, warn};
use xaudi_core::{CartError, CartItem, CartManager, CatalogStore, Category, ProductId, Storage};

/// Log the cart as the cart page shows it.
fn log_cart<S: Storage>(cart: &CartManager<S>) {
    let lines = cart.lines();
    if lines.is_empty() {
        info!("Your cart is empty.");
        return;
    }
    for line in &lines {
        info!(
            "{:<12} {:<28} {} each  x{}  = {}",
            line.id.as_str(),
            line.title,
            line.price,
            line.qty,
            line.line_total()
        );
    }
    info!("{} item(s), total {}", cart.count(), cart.total());
}

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the cart cannot be written.
pub fn add<S: Storage + Copy>(
    storage: S,
    category: Category,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = CatalogStore::new(storage);
    let product = store
        .find(category, &ProductId::new(id))
        .ok_or_else(|| format!("no {category} product with id {id}"))?;

    let cart = CartManager::new(storage);
    cart.add(CartItem::from(&product))?;
    info!("Added {} to cart ({} item(s))", product.title, cart.count());
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn remove<S: Storage>(storage: S, id: &str) -> Result<(), CartError> {
    let cart = CartManager::new(storage);
    cart.remove(&ProductId::new(id))?;
    log_cart(&cart);
    Ok(())
}

/// Change a line's quantity.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn set_quantity<S: Storage>(storage: S, id: &str, qty: i64) -> Result<(), CartError> {
    let cart = CartManager::new(storage);
    cart.set_quantity(&ProductId::new(id), qty)?;
    log_cart(&cart);
    Ok(())
}

/// Show the cart.
pub fn show<S: Storage>(storage: S) {
    log_cart(&CartManager::new(storage));
}

/// Simulated payment.
///
/// # Errors
///
/// Returns [`CartError::Empty`] when there is nothing to buy.
pub fn checkout<S: Storage>(storage: S) -> Result<(), CartError> {
    let cart = CartManager::new(storage);
    let receipt = match cart.checkout() {
        Ok(receipt) => receipt,
        Err(e @ CartError::Empty) => {
            warn!("Checkout unavailable: cart is empty");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    info!("Demo payment successful!");
    info!("Receipt {}", receipt.reference);
    for line in &receipt.lines {
        info!("  {} x{} @ {} = {}", line.title, line.qty, line.price, line.line_total);
    }
    info!("Total paid: {}", receipt.total);
    Ok(())
}
