//! Read access to the commerce platform.

use std::collections::HashMap;

use conduit_config::{CommerceSection, CustomerEntry, OrderEntry};
use serde::Serialize;

/// A commerce customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub customer_id: i64,
    /// Host platform account linked to this customer.
    pub account_id: Option<i64>,
    pub email: String,
}

impl From<&CustomerEntry> for Customer {
    fn from(entry: &CustomerEntry) -> Self {
        Self {
            customer_id: entry.customer_id,
            account_id: entry.account_id,
            email: entry.email.clone(),
        }
    }
}

/// A commerce order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: i64,
    /// `None` for guest checkouts.
    pub customer_id: Option<i64>,
    pub total: f64,
    pub status: String,
}

impl From<&OrderEntry> for Order {
    fn from(entry: &OrderEntry) -> Self {
        Self {
            order_id: entry.order_id,
            customer_id: entry.customer_id,
            total: entry.total,
            status: entry.status.clone(),
        }
    }
}

/// The commerce platform as seen by the integration.
///
/// Every method is a read-only query. [`CommercePlatform::is_active`] is the
/// capability probe run before registration.
pub trait CommercePlatform: Send + Sync {
    /// Whether the commerce platform is installed and running.
    fn is_active(&self) -> bool;

    /// Store currency code.
    fn currency(&self) -> &str;

    /// Order statuses, in display order.
    fn order_statuses(&self) -> &[String];

    fn payment_methods(&self) -> &[String];

    fn shipping_methods(&self) -> &[String];

    /// The customer linked to a host platform account.
    fn find_customer_by_account(&self, account_id: i64) -> Option<Customer>;

    fn find_customer(&self, customer_id: i64) -> Option<Customer>;

    fn find_order(&self, order_id: i64) -> Option<Order>;
}

/// In-memory commerce platform, built from configuration or by hand in tests.
#[derive(Debug, Clone)]
pub struct StaticCommercePlatform {
    active: bool,
    currency: String,
    order_statuses: Vec<String>,
    payment_methods: Vec<String>,
    shipping_methods: Vec<String>,
    customers: HashMap<i64, Customer>,
    /// account id -> customer id
    accounts: HashMap<i64, i64>,
    orders: HashMap<i64, Order>,
}

impl StaticCommercePlatform {
    /// An active platform with the default order statuses and no records.
    pub fn new(currency: impl Into<String>) -> Self {
        let defaults = CommerceSection::default();
        Self {
            active: true,
            currency: currency.into(),
            order_statuses: defaults.order_statuses,
            payment_methods: Vec::new(),
            shipping_methods: Vec::new(),
            customers: HashMap::new(),
            accounts: HashMap::new(),
            orders: HashMap::new(),
        }
    }

    /// Build from a validated `[integrations.commerce]` section.
    pub fn from_config(section: &CommerceSection) -> Self {
        let mut platform = Self::new(section.currency.clone()).with_active(section.enabled);
        platform.order_statuses = section.order_statuses.clone();
        platform.payment_methods = section.payment_methods.clone();
        platform.shipping_methods = section.shipping_methods.clone();
        for customer in &section.customers {
            platform = platform.with_customer(customer.into());
        }
        for order in &section.orders {
            platform = platform.with_order(order.into());
        }
        platform
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_payment_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.payment_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shipping_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.shipping_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Add a customer. A later customer with the same id replaces it, and a
    /// later customer with the same account takes over that account.
    pub fn with_customer(mut self, customer: Customer) -> Self {
        if let Some(previous) = self.customers.get(&customer.customer_id)
            && let Some(account_id) = previous.account_id
            && self.accounts.get(&account_id) == Some(&customer.customer_id)
        {
            self.accounts.remove(&account_id);
        }
        if let Some(account_id) = customer.account_id {
            self.accounts.insert(account_id, customer.customer_id);
        }
        self.customers.insert(customer.customer_id, customer);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.insert(order.order_id, order);
        self
    }
}

impl CommercePlatform for StaticCommercePlatform {
    fn is_active(&self) -> bool {
        self.active
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    fn order_statuses(&self) -> &[String] {
        &self.order_statuses
    }

    fn payment_methods(&self) -> &[String] {
        &self.payment_methods
    }

    fn shipping_methods(&self) -> &[String] {
        &self.shipping_methods
    }

    fn find_customer_by_account(&self, account_id: i64) -> Option<Customer> {
        self.accounts
            .get(&account_id)
            .and_then(|id| self.customers.get(id))
            .cloned()
    }

    fn find_customer(&self, customer_id: i64) -> Option<Customer> {
        self.customers.get(&customer_id).cloned()
    }

    fn find_order(&self, order_id: i64) -> Option<Order> {
        self.orders.get(&order_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(customer_id: i64, account_id: Option<i64>) -> Customer {
        Customer {
            customer_id,
            account_id,
            email: format!("c{}@example.com", customer_id),
        }
    }

    #[test]
    fn test_account_lookup() {
        let platform = StaticCommercePlatform::new("USD")
            .with_customer(customer(1, Some(42)))
            .with_customer(customer(2, None));

        assert_eq!(platform.find_customer_by_account(42).unwrap().customer_id, 1);
        assert!(platform.find_customer_by_account(7).is_none());
        assert!(platform.find_customer(2).is_some());
    }

    #[test]
    fn test_replacing_customer_unlinks_old_account() {
        let platform = StaticCommercePlatform::new("USD")
            .with_customer(customer(1, Some(42)))
            .with_customer(customer(1, Some(43)));

        assert!(platform.find_customer_by_account(42).is_none());
        assert_eq!(platform.find_customer_by_account(43).unwrap().customer_id, 1);
    }

    #[test]
    fn test_replacing_customer_keeps_account_taken_over_by_another() {
        let platform = StaticCommercePlatform::new("USD")
            .with_customer(customer(1, Some(42)))
            .with_customer(customer(2, Some(42)))
            .with_customer(customer(1, None));

        assert_eq!(platform.find_customer_by_account(42).unwrap().customer_id, 2);
    }

    #[test]
    fn test_from_config() {
        let section = conduit_config::ConduitConfig::from_toml(
            r#"
[integrations.commerce]
enabled = false
currency = "EUR"
order_statuses = ["pending", "completed"]
payment_methods = ["card"]

[[integrations.commerce.customers]]
customer_id = 7
account_id = 42
email = "ada@example.com"

[[integrations.commerce.orders]]
order_id = 100
total = 9.99
status = "completed"
"#,
        )
        .unwrap()
        .commerce();

        let platform = StaticCommercePlatform::from_config(&section);
        assert!(!platform.is_active());
        assert_eq!(platform.currency(), "EUR");
        assert_eq!(platform.order_statuses().len(), 2);
        assert_eq!(platform.payment_methods().to_vec(), vec!["card".to_string()]);
        assert_eq!(platform.find_customer_by_account(42).unwrap().email, "ada@example.com");
        assert_eq!(platform.find_order(100).unwrap().customer_id, None);
    }
}
