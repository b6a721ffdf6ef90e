//! Builders for store inputs with test-friendly defaults.

#![allow(dead_code)]

use karat::store::{NewLot, NewManufacturer, NewOrder, NewSku};
use karat::{LotKind, OrderLine};

pub struct SkuBuilder {
    inner: NewSku,
}

impl SkuBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            inner: NewSku {
                code: code.to_string(),
                name: format!("Design {}", code),
                category: "ring".to_string(),
                metal: "18k yellow gold".to_string(),
                stone_count: 1,
                diamond_count: 10,
            },
        }
    }

    pub fn stones(mut self, n: i64) -> Self {
        self.inner.stone_count = n;
        self
    }

    pub fn diamonds(mut self, n: i64) -> Self {
        self.inner.diamond_count = n;
        self
    }

    pub fn build(self) -> NewSku {
        self.inner
    }
}

pub struct LotBuilder {
    inner: NewLot,
}

impl LotBuilder {
    pub fn stones() -> Self {
        Self::new(LotKind::Stone, 20, 15.0)
    }

    pub fn diamonds() -> Self {
        Self::new(LotKind::Diamond, 500, 5.0)
    }

    fn new(kind: LotKind, quantity: i64, weight_ct: f64) -> Self {
        Self {
            inner: NewLot {
                kind,
                description: format!("Test {} parcel", kind),
                supplier: Some("Test Supplier".to_string()),
                quantity,
                weight_ct,
            },
        }
    }

    pub fn quantity(mut self, n: i64) -> Self {
        self.inner.quantity = n;
        self
    }

    pub fn weight(mut self, ct: f64) -> Self {
        self.inner.weight_ct = ct;
        self
    }

    pub fn build(self) -> NewLot {
        self.inner
    }
}

pub fn manufacturer(name: &str, capacity: i64) -> NewManufacturer {
    NewManufacturer {
        name: name.to_string(),
        contact: None,
        rating: 4.0,
        capacity,
    }
}

pub struct OrderBuilder {
    inner: NewOrder,
}

impl OrderBuilder {
    pub fn new(customer: &str) -> Self {
        Self {
            inner: NewOrder {
                customer_name: customer.to_string(),
                due_date: None,
                notes: None,
                lines: Vec::new(),
            },
        }
    }

    pub fn line(mut self, sku: &str, quantity: i64) -> Self {
        self.inner.lines.push(OrderLine {
            sku_id: sku.to_string(),
            quantity,
        });
        self
    }

    pub fn due(mut self, date: &str) -> Self {
        self.inner.due_date = Some(date.to_string());
        self
    }

    pub fn build(self) -> NewOrder {
        self.inner
    }
}
