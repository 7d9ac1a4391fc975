//! Macro-generated test suite for `Collection` contract validation.
//!
//! The `collection_contract_tests!` macro generates a test module that
//! validates any `Collection` implementation against the listing contract:
//! CRUD, uniqueness, filtering, sorting, paging, projection and geo search.
//!
//! `$factory` must evaluate to an empty collection named [`PEOPLE`] with
//! [`UNIQUE_FIELD`] unique. It is re-evaluated for each test.

#[macro_export]
macro_rules! collection_contract_tests {
    ($factory:expr) => {
        mod collection_contract_tests {
            use super::*;
            use devcamper::core::error::StorageError;
            use devcamper::core::field::FieldValue;
            use devcamper::core::filter::{Condition, Filter, GeoWithin, Predicate};
            use devcamper::core::query::{Projection, SortKey};
            use devcamper::core::store::{Collection, FindOptions, document_id};
            use serde_json::json;
            use uuid::Uuid;

            async fn seeded() -> impl Collection {
                let collection = $factory;
                for doc in neighbours() {
                    collection.insert(doc).await.unwrap();
                }
                collection
            }

            fn by_name() -> Vec<SortKey> {
                vec![SortKey::asc("name")]
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_find_by_id() {
                let collection = $factory;
                assert_eq!(collection.name(), PEOPLE);

                let alice = person("Alice", 30, "Boston", [-71.0589, 42.3601]);
                let id = document_id(&alice).unwrap();
                collection.insert(alice).await.unwrap();

                let found = collection.find_by_id(&id).await.unwrap().unwrap();
                assert_eq!(found["name"], "Alice");
                assert_eq!(found["address"]["city"], "Boston");
                assert_eq!(document_id(&found).unwrap(), id);
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let collection = $factory;
                assert!(collection.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_unique_field_rejects_duplicates() {
                let collection = $factory;
                collection
                    .insert(person("Alice", 30, "Boston", [0.0, 0.0]))
                    .await
                    .unwrap();
                let err = collection
                    .insert(person("Alice", 31, "Paris", [2.35, 48.85]))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::Duplicate { .. }), "got {:?}", err);
                assert_eq!(collection.count(&Filter::new()).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_replace_existing_and_missing() {
                let collection = seeded().await;
                let page = collection
                    .find(&FindOptions::new(Filter::eq("name", FieldValue::parse("Bob"))))
                    .await
                    .unwrap();
                let mut bob = page.into_iter().next().unwrap();
                let id = document_id(&bob).unwrap();

                bob.insert("age".into(), json!(26));
                let replaced = collection.replace(&id, bob).await.unwrap().unwrap();
                assert_eq!(replaced["age"], 26);
                assert_eq!(collection.find_by_id(&id).await.unwrap().unwrap()["age"], 26);

                let ghost = doc(json!({"name": "Ghost"}));
                assert!(collection.replace(&Uuid::new_v4(), ghost).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_and_delete_all() {
                let collection = seeded().await;
                let first = collection.find(&FindOptions::default()).await.unwrap();
                let id = document_id(&first[0]).unwrap();

                assert!(collection.delete(&id).await.unwrap());
                assert!(!collection.delete(&id).await.unwrap());
                assert_eq!(collection.delete_all().await.unwrap(), 2);
                assert_eq!(collection.count(&Filter::new()).await.unwrap(), 0);
            }

            // ==================================================================
            // Filtering
            // ==================================================================

            #[tokio::test]
            async fn test_comparison_filters() {
                let collection = seeded().await;
                let older = Filter::new().and(Condition::new("age", Predicate::Gt(FieldValue::integer(25))));
                assert_eq!(collection.count(&older).await.unwrap(), 2);

                let range = Filter::new()
                    .and(Condition::new("age", Predicate::Gte(FieldValue::integer(25))))
                    .and(Condition::new("age", Predicate::Lte(FieldValue::float(30.0))));
                let page = collection
                    .find(&FindOptions::new(range).sort(by_name()))
                    .await
                    .unwrap();
                assert_eq!(names(&page), ["Alice", "Bob"]);
            }

            #[tokio::test]
            async fn test_in_and_nested_filters() {
                let collection = seeded().await;
                let cities = Filter::any_of(
                    "address.city",
                    vec![FieldValue::parse("Boston"), FieldValue::parse("New York")],
                );
                let page = collection
                    .find(&FindOptions::new(cities).sort(by_name()))
                    .await
                    .unwrap();
                assert_eq!(names(&page), ["Alice", "Carol"]);

                let tagged = Filter::eq("tags", FieldValue::parse("member"));
                assert_eq!(collection.count(&tagged).await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_unknown_field_matches_nothing() {
                let collection = seeded().await;
                let filter = Filter::eq("nickname", FieldValue::parse("Al"));
                assert_eq!(collection.count(&filter).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_geo_within() {
                let collection = seeded().await;
                let near_boston = Filter::new().within(GeoWithin::miles("location", -71.0589, 42.3601, 10.0));
                let page = collection
                    .find(&FindOptions::new(near_boston).sort(by_name()))
                    .await
                    .unwrap();
                assert_eq!(names(&page), ["Alice", "Bob"]);

                let wide = Filter::new().within(GeoWithin::miles("location", -71.0589, 42.3601, 250.0));
                assert_eq!(collection.count(&wide).await.unwrap(), 3);
            }

            // ==================================================================
            // Sort, paging and projection
            // ==================================================================

            #[tokio::test]
            async fn test_sort_skip_limit() {
                let collection = seeded().await;
                let options = FindOptions::default()
                    .sort(vec![SortKey::desc("age")])
                    .skip(1)
                    .limit(1);
                let page = collection.find(&options).await.unwrap();
                assert_eq!(names(&page), ["Alice"]);

                let past_end = FindOptions::default().skip(10).limit(10);
                assert!(collection.find(&past_end).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_include_projection_keeps_id() {
                let collection = seeded().await;
                let options = FindOptions::default()
                    .projection(Some(Projection::include(["name", "address.city"])))
                    .sort(by_name())
                    .limit(1);
                let page = collection.find(&options).await.unwrap();
                let mut keys: Vec<_> = page[0].keys().cloned().collect();
                keys.sort();
                assert_eq!(keys, ["address", "id", "name"]);
                assert_eq!(page[0]["address"], json!({"city": "Boston"}));
            }

            #[tokio::test]
            async fn test_exclude_projection() {
                let collection = seeded().await;
                let options = FindOptions::default()
                    .projection(Some(Projection::Exclude(vec!["location".into(), "tags".into()])));
                let page = collection.find(&options).await.unwrap();
                assert_eq!(page.len(), 3);
                assert!(page.iter().all(|d| !d.contains_key("location") && !d.contains_key("tags")));
                assert!(page.iter().all(|d| d.contains_key("id") && d.contains_key("email")));
            }
        }
    };
}
