//! Checkout handoff: chat-app order messages and deep links.
//!
//! Sokoni does not process payments. Checkout hands each seller's order
//! over to the seller in a chat message: the buyer opens a deep link of the
//! form `https://wa.me/<digits>?text=<message>` in a new browsing context
//! and the conversation takes it from there. Nothing is read back.

use url::Url;

use crate::cart::SellerOrder;
use crate::types::PhoneNumber;

/// Default chat deep-link domain.
pub const DEFAULT_CHAT_DOMAIN: &str = "wa.me";

/// Build the order message for one seller's group.
///
/// One line per item (`- {name} (x{qty}) - {CUR} {line_total}`), then a
/// trailing total line. Amounts use thousands separators and no decimal
/// places.
///
/// ```
/// use sokoni_core::cart::{Cart, CartItem};
/// use sokoni_core::checkout::order_message;
/// # use sokoni_core::{Money, ProductId, SellerName};
///
/// let mut cart = Cart::empty();
/// cart.add(CartItem {
///     id: ProductId::new("1"),
///     shop: SellerName::new("A"),
///     name: "Pen".to_owned(),
///     price: Money::new(2000),
///     img: None,
///     quantity: 1,
/// });
/// cart.set_quantity(&ProductId::new("1"), 2);
///
/// let groups = cart.by_seller();
/// assert_eq!(
///     order_message(&groups[0], "UGX"),
///     "- Pen (x2) - UGX 4,000\nTotal for this order: UGX 4,000"
/// );
/// ```
#[must_use]
pub fn order_message(order: &SellerOrder, currency: &str) -> String {
    let mut lines: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "- {} (x{}) - {} {}",
                item.name,
                item.quantity,
                currency,
                item.line_total().grouped()
            )
        })
        .collect();
    lines.push(format!(
        "Total for this order: {} {}",
        currency,
        order.subtotal().grouped()
    ));
    lines.join("\n")
}

/// Build the chat deep link carrying one seller's order message.
///
/// The message is percent-encoded into the `text` query parameter and the
/// path is the digits-only form of the seller's registered number.
///
/// # Errors
///
/// Returns [`url::ParseError`] if `chat_domain` does not form a valid URL
/// host.
pub fn checkout_link(
    chat_domain: &str,
    seller_phone: &PhoneNumber,
    order: &SellerOrder,
    currency: &str,
) -> Result<Url, url::ParseError> {
    let message = order_message(order, currency);
    let link = format!(
        "https://{}/{}?text={}",
        chat_domain,
        seller_phone.digits(),
        urlencoding::encode(&message)
    );
    Url::parse(&link)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{Cart, CartItem};
    use crate::types::{Money, ProductId, SellerName};

    fn order() -> SellerOrder {
        let mut cart = Cart::empty();
        cart.add(CartItem {
            id: ProductId::new("1"),
            shop: SellerName::new("A"),
            name: "Pen".to_owned(),
            price: Money::new(2000),
            img: None,
            quantity: 1,
        });
        cart.set_quantity(&ProductId::new("1"), 2);
        cart.add(CartItem {
            id: ProductId::new("3"),
            shop: SellerName::new("A"),
            name: "Leather Bag".to_owned(),
            price: Money::new(120_000),
            img: None,
            quantity: 1,
        });
        cart.by_seller().into_iter().next().unwrap()
    }

    #[test]
    fn test_order_message_format() {
        let message = order_message(&order(), "UGX");
        assert_eq!(
            message,
            "- Pen (x2) - UGX 4,000\n\
             - Leather Bag (x1) - UGX 120,000\n\
             Total for this order: UGX 124,000"
        );
    }

    #[test]
    fn test_message_lines_preserve_numeric_identity() {
        let order = order();
        let message = order_message(&order, "UGX");
        for item in &order.items {
            let expected = format!(
                "- {} (x{}) - UGX {}",
                item.name,
                item.quantity,
                item.price.times(item.quantity).grouped()
            );
            assert!(message.contains(&expected), "missing line: {expected}");
        }
        assert!(message.ends_with(&format!(
            "Total for this order: UGX {}",
            order.subtotal().grouped()
        )));
    }

    #[test]
    fn test_checkout_link_shape() {
        let phone = PhoneNumber::parse("+256 772 123456").unwrap();
        let url = checkout_link(DEFAULT_CHAT_DOMAIN, &phone, &order(), "UGX").unwrap();

        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/256772123456");

        let text = url
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(text, order_message(&order(), "UGX"));
    }

    #[test]
    fn test_checkout_link_is_percent_encoded() {
        let phone = PhoneNumber::parse("+256772123456").unwrap();
        let url = checkout_link(DEFAULT_CHAT_DOMAIN, &phone, &order(), "UGX").unwrap();
        let raw_query = url.query().unwrap();

        // Spaces and newlines never appear raw in the link.
        assert!(!raw_query.contains(' '));
        assert!(!raw_query.contains('\n'));
        assert!(raw_query.starts_with("text=-%20Pen%20%28x2%29"));
    }
}
