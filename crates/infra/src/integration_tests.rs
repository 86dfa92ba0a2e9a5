//! Integration tests for the inventory access pipeline.
//!
//! Tests: InventoryAccess → DocumentStore → stored documents
//!
//! Verifies:
//! - Add/merge, increment/decrement and delete semantics against a real store
//! - Metadata edits never touch quantity or category
//! - Store failures surface as `StoreUnavailable`
//! - Compare-and-swap retries recover from interleaved writers

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use stockroom_core::{Precondition, Revision};
    use stockroom_inventory::{Category, CategoryFilter, ItemDetails, ItemName, MetadataPatch, StockOutcome};

    use crate::config::{ConcurrencyMode, MissingItemPolicy};
    use crate::inventory::{AccessOptions, InventoryAccess, InventoryError};
    use crate::store::{
        Document, DocumentStore, FieldFilter, Fields, InMemoryDocumentStore, StoreError, WriteMode,
    };

    fn widget() -> ItemName {
        ItemName::from("Widget")
    }

    fn setup() -> InventoryAccess<Arc<InMemoryDocumentStore>> {
        InventoryAccess::new(Arc::new(InMemoryDocumentStore::new()))
    }

    fn with_options(options: AccessOptions) -> InventoryAccess<Arc<InMemoryDocumentStore>> {
        InventoryAccess::with_options(Arc::new(InMemoryDocumentStore::new()), options)
    }

    /// Store whose every call fails as if the network were down.
    struct UnavailableStore;

    #[async_trait::async_trait]
    impl DocumentStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn list(&self, _filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn set(
            &self,
            _key: &str,
            _fields: Fields,
            _mode: WriteMode,
            _precondition: Precondition,
        ) -> Result<Revision, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &str, _precondition: Precondition) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Store that lets a competing writer bump `key` to `competing_quantity`
    /// right before the next `interferences` writes, and records the
    /// preconditions it was asked to honour.
    struct InterleavingStore {
        inner: InMemoryDocumentStore,
        key: &'static str,
        competing_quantity: u32,
        interferences: AtomicUsize,
        preconditions: Mutex<Vec<Precondition>>,
    }

    impl InterleavingStore {
        fn new(key: &'static str, competing_quantity: u32, interferences: usize) -> Self {
            Self {
                inner: InMemoryDocumentStore::new(),
                key,
                competing_quantity,
                interferences: AtomicUsize::new(interferences),
                preconditions: Mutex::new(Vec::new()),
            }
        }

        async fn before_write(&self, precondition: &Precondition) {
            self.preconditions.lock().unwrap().push(precondition.clone());
            let remaining = self.interferences.load(Ordering::SeqCst);
            if remaining == 0 {
                return;
            }
            self.interferences.store(remaining - 1, Ordering::SeqCst);

            let mut fields = Fields::new();
            fields.insert("quantity".into(), json!(self.competing_quantity));
            self.inner
                .set(self.key, fields, WriteMode::Merge, Precondition::Any)
                .await
                .unwrap();
        }

        fn preconditions(&self) -> Vec<Precondition> {
            self.preconditions.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DocumentStore for InterleavingStore {
        async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get(key).await
        }

        async fn list(&self, filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError> {
            self.inner.list(filter).await
        }

        async fn set(
            &self,
            key: &str,
            fields: Fields,
            mode: WriteMode,
            precondition: Precondition,
        ) -> Result<Revision, StoreError> {
            self.before_write(&precondition).await;
            self.inner.set(key, fields, mode, precondition).await
        }

        async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), StoreError> {
            self.before_write(&precondition).await;
            self.inner.delete(key, precondition).await
        }
    }

    #[tokio::test]
    async fn adding_a_new_item_creates_a_bare_record() {
        let access = setup();
        let outcome = access.add(&widget(), 5, Category::Tools).await.unwrap();
        assert_eq!(outcome, StockOutcome::Create(5));

        let items = access.list(CategoryFilter::All).await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name, widget());
        assert_eq!(item.quantity, 5);
        assert_eq!(item.category, Category::Tools);
        assert!(!item.has_metadata());
    }

    #[tokio::test]
    async fn re_adding_merges_quantity_and_overwrites_category() {
        let access = setup();
        access.add(&widget(), 5, Category::Tools).await.unwrap();
        access.add(&widget(), 3, Category::Tools).await.unwrap();

        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 8);
        assert_eq!(item.category, Category::Tools);

        access
            .update_metadata(&widget(), &MetadataPatch::new().supplier("Acme"))
            .await
            .unwrap();
        access.add(&widget(), 1, Category::Electronics).await.unwrap();

        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(item.category, Category::Electronics);
        assert_eq!(item.supplier.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn decrementing_the_last_unit_removes_the_item() {
        let access = setup();
        access.add(&widget(), 1, Category::Tools).await.unwrap();

        let outcome = access.decrement_quantity(&widget()).await.unwrap();
        assert_eq!(outcome, StockOutcome::Remove);
        assert!(access.list(CategoryFilter::All).await.unwrap().is_empty());
        assert!(access.store().is_empty());

        // Again on the now-missing item: nothing happens.
        let outcome = access.decrement_quantity(&widget()).await.unwrap();
        assert_eq!(outcome, StockOutcome::Unchanged);
    }

    #[tokio::test]
    async fn decrementing_from_five_keeps_the_item() {
        let access = setup();
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        access.decrement_quantity(&widget()).await.unwrap();
        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 4);
    }

    #[tokio::test]
    async fn incrementing_a_missing_item_is_a_no_op() {
        let access = setup();
        access.add(&ItemName::from("Bolt"), 2, Category::Tools).await.unwrap();
        let before = access.list(CategoryFilter::All).await.unwrap();

        let outcome = access.increment_quantity(&widget()).await.unwrap();
        assert_eq!(outcome, StockOutcome::Unchanged);
        assert_eq!(access.list(CategoryFilter::All).await.unwrap(), before);

        access.increment_quantity(&ItemName::from("Bolt")).await.unwrap();
        let bolt = access.get(&ItemName::from("Bolt")).await.unwrap().unwrap();
        assert_eq!(bolt.quantity, 3);
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let access = setup();
        access.add(&ItemName::from("Radio"), 1, Category::Electronics).await.unwrap();
        access.add(&ItemName::from("Hammer"), 1, Category::Tools).await.unwrap();

        let electronics = access
            .list(CategoryFilter::Only(Category::Electronics))
            .await
            .unwrap();
        assert_eq!(electronics.len(), 1);
        assert_eq!(electronics[0].name.as_str(), "Radio");

        let books = access.list(CategoryFilter::Only(Category::Books)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn metadata_updates_leave_stock_alone() {
        let access = setup();
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        access
            .update_metadata(&widget(), &MetadataPatch::new().price(9.99))
            .await
            .unwrap();

        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(item.category, Category::Tools);
        assert_eq!(item.price, Some(9.99));
        assert_eq!(item.description, None);
        assert_eq!(item.supplier, None);

        access
            .update_metadata(&widget(), &MetadataPatch::new().description("blue"))
            .await
            .unwrap();
        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.price, Some(9.99));
        assert_eq!(item.description.as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn removing_twice_is_safe() {
        let access = setup();
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        access.remove(&widget()).await.unwrap();
        access.remove(&widget()).await.unwrap();
        assert!(access.get(&widget()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn details_default_to_empty_strings() {
        let access = setup();
        assert_eq!(access.get_details(&widget()).await.unwrap(), None);

        access.add(&widget(), 5, Category::Tools).await.unwrap();
        assert_eq!(
            access.get_details(&widget()).await.unwrap(),
            Some(ItemDetails::default())
        );

        access
            .update_metadata(&widget(), &MetadataPatch::new().price(9.99).supplier("Acme"))
            .await
            .unwrap();
        let details = access.get_details(&widget()).await.unwrap().unwrap();
        assert_eq!(details.price, "9.99");
        assert_eq!(details.supplier, "Acme");
        assert_eq!(details.description, "");
    }

    #[tokio::test]
    async fn metadata_on_missing_item_fails_by_default() {
        let access = setup();
        let err = access
            .update_metadata(&widget(), &MetadataPatch::new().price(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(ref n) if *n == widget()));

        let err = access
            .update_metadata(&widget(), &MetadataPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
        assert!(access.store().is_empty());
    }

    #[tokio::test]
    async fn metadata_on_missing_item_can_create_a_bare_record() {
        let access = with_options(AccessOptions {
            missing_item: MissingItemPolicy::CreateBare,
            ..AccessOptions::default()
        });

        access
            .update_metadata(&widget(), &MetadataPatch::new().description("pending"))
            .await
            .unwrap();

        // The bare record has no stock yet, so it is not listed...
        assert!(access.list(CategoryFilter::All).await.unwrap().is_empty());
        let details = access.get_details(&widget()).await.unwrap().unwrap();
        assert_eq!(details.description, "pending");

        // ...until stock is added, which completes it.
        access.add(&widget(), 2, Category::Other).await.unwrap();
        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.description.as_deref(), Some("pending"));
    }

    #[tokio::test]
    async fn stepping_a_metadata_only_record_is_a_no_op() {
        let access = with_options(AccessOptions {
            missing_item: MissingItemPolicy::CreateBare,
            ..AccessOptions::default()
        });
        access
            .update_metadata(&widget(), &MetadataPatch::new().description("pending"))
            .await
            .unwrap();

        let outcome = access.increment_quantity(&widget()).await.unwrap();
        assert_eq!(outcome, StockOutcome::Unchanged);
        let outcome = access.decrement_quantity(&widget()).await.unwrap();
        assert_eq!(outcome, StockOutcome::Unchanged);

        let doc = access.store().get("Widget").await.unwrap().unwrap();
        assert_eq!(serde_json::Value::Object(doc.fields), json!({ "description": "pending" }));
    }

    #[tokio::test]
    async fn adding_zero_keeps_a_metadata_only_record() {
        let access = with_options(AccessOptions {
            missing_item: MissingItemPolicy::CreateBare,
            ..AccessOptions::default()
        });
        access
            .update_metadata(&widget(), &MetadataPatch::new().supplier("Acme"))
            .await
            .unwrap();

        let outcome = access.add(&widget(), 0, Category::Tools).await.unwrap();
        assert_eq!(outcome, StockOutcome::Unchanged);
        let details = access.get_details(&widget()).await.unwrap().unwrap();
        assert_eq!(details.supplier, "Acme");
    }

    #[tokio::test]
    async fn text_prices_do_not_hide_an_item() {
        let access = setup();
        access.add(&widget(), 3, Category::Tools).await.unwrap();
        let mut fields = Fields::new();
        fields.insert("price".into(), json!(""));
        fields.insert("supplier".into(), json!("Acme"));
        access
            .store()
            .set("Widget", fields, WriteMode::Merge, Precondition::Any)
            .await
            .unwrap();

        let items = access.list(CategoryFilter::All).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].price, None);
        assert_eq!(items[0].supplier.as_deref(), Some("Acme"));

        let details = access.get_details(&widget()).await.unwrap().unwrap();
        assert_eq!(details.price, "");
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_unavailable() {
        let access = InventoryAccess::new(UnavailableStore);

        let err = access.list(CategoryFilter::All).await.unwrap_err();
        assert!(err.is_store_unavailable());
        let err = access.add(&widget(), 1, Category::Tools).await.unwrap_err();
        assert!(err.is_store_unavailable());
        let err = access.remove(&widget()).await.unwrap_err();
        assert!(err.is_store_unavailable());
        let err = access.get_details(&widget()).await.unwrap_err();
        assert!(err.is_store_unavailable());
        let err = access
            .update_metadata(&widget(), &MetadataPatch::new().price(1.0))
            .await
            .unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn compare_and_swap_retries_after_an_interleaved_write() {
        let store = Arc::new(InterleavingStore::new("Widget", 50, 0));
        let access = InventoryAccess::new(store.clone());
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        // Someone else sets the quantity to 50 between our read and our write.
        store.interferences.store(1, Ordering::SeqCst);
        access.increment_quantity(&widget()).await.unwrap();

        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 51);

        let preconditions = store.preconditions();
        assert_eq!(preconditions[0], Precondition::MustNotExist);
        assert!(preconditions[1..]
            .iter()
            .all(|p| matches!(p, Precondition::Revision(_))));
        assert_eq!(preconditions.len(), 3);
    }

    #[tokio::test]
    async fn compare_and_swap_adds_onto_a_concurrently_created_item() {
        // Someone else creates the item with 4 between our read and our create.
        let store = Arc::new(InterleavingStore::new("Widget", 4, 1));
        let access = InventoryAccess::new(store.clone());

        let outcome = access.add(&widget(), 5, Category::Tools).await.unwrap();
        assert_eq!(outcome, StockOutcome::Set(9));

        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(item.category, Category::Tools);

        let preconditions = store.preconditions();
        assert_eq!(preconditions.len(), 2);
        assert_eq!(preconditions[0], Precondition::MustNotExist);
        assert!(matches!(preconditions[1], Precondition::Revision(_)));
    }

    #[tokio::test]
    async fn last_write_wins_keeps_the_lost_update() {
        let store = Arc::new(InterleavingStore::new("Widget", 50, 0));
        let access = InventoryAccess::with_options(
            store.clone(),
            AccessOptions {
                concurrency: ConcurrencyMode::LastWriteWins,
                ..AccessOptions::default()
            },
        );
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        store.interferences.store(1, Ordering::SeqCst);
        access.increment_quantity(&widget()).await.unwrap();

        // The competing write is overwritten: 5 + 1, not 50 + 1.
        let item = access.get(&widget()).await.unwrap().unwrap();
        assert_eq!(item.quantity, 6);
        assert!(store.preconditions().iter().all(|p| *p == Precondition::Any));
    }

    #[tokio::test]
    async fn persistent_conflicts_give_up_after_the_retry_budget() {
        let store = Arc::new(InterleavingStore::new("Widget", 50, 0));
        let access = InventoryAccess::with_options(
            store.clone(),
            AccessOptions {
                max_conflict_retries: 2,
                ..AccessOptions::default()
            },
        );
        access.add(&widget(), 5, Category::Tools).await.unwrap();

        store.interferences.store(usize::MAX, Ordering::SeqCst);
        let err = access.decrement_quantity(&widget()).await.unwrap_err();
        assert!(matches!(err, InventoryError::Conflict { attempts: 3, .. }));
    }
}
