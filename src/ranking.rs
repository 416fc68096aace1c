// Client-side top-N selection. Used when the backend is asked for an
// unsorted page, and to double check the order of a server-sorted one.

use crate::models::Product;
use std::cmp::Ordering;

/// Highest-priced `n` products, most expensive first. Equal prices keep
/// their input order. NaN prices rank below every real price.
pub fn top_n(products: &[Product], n: usize) -> Vec<Product> {
    let mut ranked: Vec<&Product> = products.iter().collect();
    // `sort_by` is stable, which is what keeps ties in input order.
    ranked.sort_by(|a, b| by_price_desc(a.price, b.price));
    ranked.into_iter().take(n).cloned().collect()
}

/// Whether `products` already looks like the output of `top_n(.., n)`.
pub fn is_ranked(products: &[Product], n: usize) -> bool {
    products.len() <= n
        && products
            .windows(2)
            .all(|w| by_price_desc(w[0].price, w[1].price) != Ordering::Greater)
}

fn by_price_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
