use crate::{
    model::{Order, OrderPatch},
    service::{Entity, EntityService},
};

impl Entity for Order {
    type Patch = OrderPatch;
}

pub type OrderService = EntityService<Order>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use staybook_core::store::DocumentStore;
    use staybook_memory::InMemoryStore;

    use crate::{
        error::ServiceError,
        filter::FilterBy,
        model::{MiniUser, NewMsg, OrderDraft},
    };

    fn service() -> OrderService {
        OrderService::new(Arc::new(DocumentStore::new(InMemoryStore::new())))
    }

    fn user(id: &str) -> MiniUser {
        MiniUser { id: id.into(), fullname: format!("user {id}"), img_url: None }
    }

    fn order(host_id: &str, buyer_id: &str) -> Order {
        let draft = OrderDraft {
            host_id: host_id.into(),
            stay: None,
            start_date: Some(1_700_000_000_000),
            end_date: Some(1_700_500_000_000),
            guests: Default::default(),
            total_price: 420.0,
        };

        Order::place(draft, user(buyer_id), 1_690_000_000_000)
    }

    fn msg(txt: &str) -> NewMsg {
        NewMsg { txt: txt.into(), by: user("u1") }
    }

    #[tokio::test]
    async fn query_by_host_ignores_empty_buyer() {
        let orders = service();
        orders.add(order("h1", "b1")).await.unwrap();
        orders.add(order("h2", "b1")).await.unwrap();
        orders.add(order("h1", "b2")).await.unwrap();

        let filter_by = FilterBy {
            host_id: Some("h1".into()),
            buyer_id: Some(String::new()),
            ..Default::default()
        };
        let found = orders.query(&filter_by).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|o| o.host_id == "h1"));
    }

    #[tokio::test]
    async fn query_by_buyer_matches_embedded_id() {
        let orders = service();
        orders.add(order("h1", "b1")).await.unwrap();
        orders.add(order("h1", "b2")).await.unwrap();

        let filter_by = FilterBy { buyer_id: Some("b2".into()), ..Default::default() };
        let found = orders.query(&filter_by).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].buyer.id, "b2");
    }

    #[tokio::test]
    async fn remove_msg_keeps_order_of_the_rest() {
        let orders = service();
        let placed = orders.add(order("h1", "b1")).await.unwrap();
        let id = placed.id.to_hex();

        let first = orders.add_msg(&id, msg("one")).await.unwrap();
        let second = orders.add_msg(&id, msg("two")).await.unwrap();
        let third = orders.add_msg(&id, msg("three")).await.unwrap();
        assert_ne!(first.id, second.id);

        let removed = orders.remove_msg(&id, &second.id).await.unwrap();
        assert_eq!(removed, second.id);

        let stored = orders.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.msgs, vec![first, third]);
    }

    #[tokio::test]
    async fn update_leaves_immutable_fields() {
        let orders = service();
        let placed = orders.add(order("h1", "b1")).await.unwrap();

        let patch = OrderPatch {
            id: Some(placed.id.to_hex()),
            buyer: None,
            start_date: None,
            end_date: None,
            guests: None,
            total_price: Some(99.0),
        };
        orders.update(patch).await.unwrap();

        let stored = orders.get_by_id(&placed.id.to_hex()).await.unwrap().unwrap();
        assert_eq!(stored.total_price, 99.0);
        assert_eq!(stored.created_at, placed.created_at);
        assert_eq!(stored.host_id, "h1");
    }

    #[tokio::test]
    async fn update_without_id_fails() {
        let patch = OrderPatch {
            id: None,
            buyer: None,
            start_date: None,
            end_date: None,
            guests: None,
            total_price: Some(1.0),
        };

        assert!(matches!(service().update(patch).await, Err(ServiceError::UpdateFailed(_))));
    }

    #[tokio::test]
    async fn remove_returns_id_and_deletes() {
        let orders = service();
        let placed = orders.add(order("h1", "b1")).await.unwrap();
        let id = placed.id.to_hex();

        assert_eq!(orders.remove(&id).await.unwrap(), id);
        assert!(orders.get_by_id(&id).await.unwrap().is_none());
        assert!(matches!(orders.remove("bogus").await, Err(ServiceError::RemoveFailed(_))));
    }
}
