//! Product tile shared by listings, search, the home page and the wishlist.

use crate::api::types::Product;

/// Product tile display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub href: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    /// Struck-through list price, only when marked down.
    pub list_price: Option<String>,
    pub discount: u32,
    pub image: Option<String>,
    pub image_alt: String,
    pub hover_image: Option<String>,
    /// One decimal, `None` for unrated products.
    pub rating: Option<String>,
    /// Sizes that can be ordered right now, as `(code, label)`.
    pub sizes: Vec<(String, String)>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let image_alt = product
            .primary_image()
            .map(|i| i.alt.clone())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| product.product_name.clone());
        Self {
            id: product.id.to_string(),
            href: format!("/product/{}", urlencoding::encode(product.id.as_str())),
            name: product.product_name.clone(),
            brand: product.brand.clone(),
            price: product.price.to_string(),
            list_price: product
                .has_markdown()
                .then(|| product.list_price().to_string()),
            discount: product.discount,
            image: product.primary_image().map(|i| i.url.clone()),
            image_alt,
            hover_image: product.hover_image().map(|i| i.url.clone()),
            rating: (product.rating > 0.0).then(|| format!("{:.1}", product.rating)),
            sizes: product
                .sizes
                .iter()
                .filter(|s| s.is_available())
                .map(|s| (s.size.clone(), s.label().to_owned()))
                .collect(),
        }
    }
}

/// Cards for a product slice.
#[must_use]
pub fn cards(products: &[Product]) -> Vec<ProductCard> {
    products.iter().map(ProductCard::from).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_from_marked_down_product() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p 1",
            "productName": "Linen Shirt",
            "price": 1299,
            "originalPrice": 1999,
            "discount": 35,
            "rating": 4.26,
            "images": [{"url": "/a.jpg", "alt": ""}, {"url": "/b.jpg"}],
            "sizes": [
                {"size": "M", "sizeLabel": "Medium", "inStock": true, "count": 3},
                {"size": "L", "inStock": false, "count": 0}
            ]
        }))
        .unwrap();

        let card = ProductCard::from(&product);
        assert_eq!(card.href, "/product/p%201");
        assert_eq!(card.price, "₹1,299");
        assert_eq!(card.list_price.as_deref(), Some("₹1,999"));
        assert_eq!(card.image_alt, "Linen Shirt");
        assert_eq!(card.hover_image.as_deref(), Some("/b.jpg"));
        assert_eq!(card.rating.as_deref(), Some("4.3"));
        assert_eq!(card.sizes, vec![("M".to_string(), "Medium".to_string())]);
    }

    #[test]
    fn test_card_without_markdown_or_rating() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p2", "productName": "Tee", "price": 499})).unwrap();
        let card = ProductCard::from(&product);
        assert!(card.list_price.is_none());
        assert!(card.rating.is_none());
        assert!(card.image.is_none());
    }
}
