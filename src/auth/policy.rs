//! Authorization policy: pure decision functions with no side effects.
//!
//! A `false` answer maps to `Forbidden` at the handler layer - the identity
//! resolved but lacks rights - which is a different outcome from
//! `Unauthenticated` and must stay distinguishable.

use uuid::Uuid;

use crate::database::models::{Product, Role};

/// Only suppliers may create products.
pub fn can_create_product(role: Role) -> bool {
    match role {
        Role::Supplier => true,
        Role::Buyer => false,
    }
}

/// Only the owning supplier may update or delete a product.
pub fn can_mutate_product(user_id: Uuid, product: &Product) -> bool {
    product.supplier_id == user_id
}

/// Any resolved identity may comment; there is no role restriction.
pub fn can_comment(_identity: Uuid) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product_owned_by(supplier_id: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            supplier_id,
            name: "Pagne wax".to_string(),
            description: "Six yards".to_string(),
            price: 25.0,
            category: "Mode".to_string(),
            image_base64: None,
            stock_quantity: 3,
            likes_count: 0,
            supplier_country: Some("Cameroun".to_string()),
            supplier_city: Some("Douala".to_string()),
            created_at: Utc::now(),
            seq: 1,
        }
    }

    #[test]
    fn only_suppliers_create_products() {
        assert!(can_create_product(Role::Supplier));
        assert!(!can_create_product(Role::Buyer));
    }

    #[test]
    fn only_the_owner_mutates_a_product() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let product = product_owned_by(owner);

        assert!(can_mutate_product(owner, &product));
        assert!(!can_mutate_product(stranger, &product));
    }

    #[test]
    fn any_identity_may_comment() {
        assert!(can_comment(Uuid::new_v4()));
    }
}
