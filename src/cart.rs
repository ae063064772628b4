pub const EMPTY_CART_MESSAGE: &str = "your cart is empty (for now)";

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub flavor: String,
    pub kind: String,
    pub price: f64,
}

impl Product {
    pub fn new(flavor: &str, kind: &str, price: f64) -> Self {
        Self {
            flavor: flavor.to_string(),
            kind: kind.to_string(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub flavor: String,
    pub kind: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flavor: &str, kind: &str, price: f64) {
        self.items.push(CartItem {
            flavor: flavor.to_string(),
            kind: kind.to_string(),
            price,
        });
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // Total is recomputed from the items on every call, never cached.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn formatted_total(&self) -> String {
        format!("{:.2}", self.total())
    }

    pub fn render_lines(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec![EMPTY_CART_MESSAGE.to_string()];
        }
        self.items
            .iter()
            .map(|item| format!("{} - {} : {:.2}", item.flavor, item.kind, item.price))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_totals_zero_and_renders_placeholder() {
        let cart = Cart::new();
        assert_eq!(cart.total(), 0.0);
        assert_eq!(cart.formatted_total(), "0.00");
        assert_eq!(cart.render_lines(), vec![EMPTY_CART_MESSAGE.to_string()]);
    }

    #[test]
    fn add_appends_in_order_and_allows_duplicates() {
        let mut cart = Cart::new();
        cart.add("Mango", "Smoothie", 5.50);
        cart.add("Lime", "Soda", 3.25);
        cart.add("Mango", "Smoothie", 5.50);
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.items()[0].flavor, "Mango");
        assert_eq!(cart.items()[1].kind, "Soda");
        assert_eq!(cart.items()[2], cart.items()[0].clone());
    }

    #[test]
    fn total_matches_the_menu() {
        let mut cart = Cart::new();
        cart.add("Mango", "Smoothie", 5.50);
        cart.add("Lime", "Soda", 3.25);
        assert_eq!(cart.total(), 8.75);
        assert_eq!(cart.formatted_total(), "8.75");
        assert_eq!(
            cart.render_lines(),
            vec!["Mango - Smoothie : 5.50", "Lime - Soda : 3.25"]
        );
    }

    #[test]
    fn prices_are_taken_as_given() {
        let mut cart = Cart::new();
        cart.add("", "", -2.0);
        cart.add("Cola", "Classic", 0.0);
        assert_eq!(cart.total(), -2.0);
        assert_eq!(cart.render_lines()[0], " -  : -2.00");
    }

    #[test]
    fn clear_empties_and_resets_total() {
        let mut cart = Cart::new();
        cart.add("Açaí", "Smoothie", 6.75);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert_eq!(cart.render_lines(), vec![EMPTY_CART_MESSAGE.to_string()]);
    }
}
