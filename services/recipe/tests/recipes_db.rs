//! Database scenarios for reconciliation, filtering and ownership
//!
//! Run with `cargo test -- --ignored` and `DATABASE_URL` pointing at a
//! PostgreSQL server; each test gets a fresh migrated database.

use std::str::FromStr;

use recipe::{
    filters::RecipeFilter,
    models::{Field, Ingredient, NamedEntity, NewRecipe, RecipeChanges, Tag},
    repositories::{NamedRepository, RecipeRepository, named},
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

async fn create_user(pool: &PgPool, email: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, 'Test', 'x') RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn new_recipe(title: &str, tags: &[&str], ingredients: &[&str]) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        time_minutes: 10,
        price: Decimal::from_str("4.50").unwrap(),
        link: String::new(),
        description: String::new(),
        image: None,
        tags: tags.iter().map(|name| name.to_string()).collect(),
        ingredients: ingredients.iter().map(|name| name.to_string()).collect(),
    }
}

fn names<E: NamedEntity>(items: &[E]) -> Vec<&str> {
    items.iter().map(E::name).collect()
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_create_reuses_existing_tags(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let tags = NamedRepository::<Tag>::new(pool.clone());

    recipes
        .create(user, &new_recipe("Salad", &["Vegan"], &[]))
        .await
        .unwrap();
    let soup = recipes
        .create(user, &new_recipe("Soup", &["Vegan", "Dinner"], &[]))
        .await
        .unwrap();

    let all = tags.list(user, false).await.unwrap();
    assert_eq!(names(&all), vec!["Vegan", "Dinner"]);
    assert_eq!(soup.tags.len(), 2);
    assert!(soup.tags.iter().any(|t| t.name == "Vegan"));
    assert_eq!(soup.price.to_string(), "4.50");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_same_name_for_another_user_is_a_separate_tag(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());

    let a = recipes
        .create(alice, &new_recipe("Soup", &["Vegan"], &[]))
        .await
        .unwrap();
    let b = recipes
        .create(bob, &new_recipe("Soup", &["Vegan"], &[]))
        .await
        .unwrap();

    assert_ne!(a.tags[0].id, b.tags[0].id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_omitted_tags_are_kept_and_empty_list_clears(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let tags = NamedRepository::<Tag>::new(pool.clone());

    let soup = recipes
        .create(user, &new_recipe("Soup", &["Dinner"], &["Salt"]))
        .await
        .unwrap();

    let renamed = recipes
        .update(
            user,
            soup.id,
            &RecipeChanges {
                title: Field::Present("Hot soup".to_string()),
                ..RecipeChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "Hot soup");
    assert_eq!(names(&renamed.tags), vec!["Dinner"]);
    assert_eq!(names(&renamed.ingredients), vec!["Salt"]);

    let cleared = recipes
        .update(
            user,
            soup.id,
            &RecipeChanges {
                tags: Field::Present(vec![]),
                ..RecipeChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.tags.is_empty());
    assert_eq!(cleared.ingredients.len(), 1);

    // Detached tags still exist for the user
    assert_eq!(tags.list(user, false).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_update_replaces_tags(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());

    let soup = recipes
        .create(user, &new_recipe("Soup", &["Breakfast"], &[]))
        .await
        .unwrap();

    let updated = recipes
        .update(
            user,
            soup.id,
            &RecipeChanges {
                tags: Field::Present(vec!["Lunch".to_string()]),
                ..RecipeChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(names(&updated.tags), vec!["Lunch"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_filter_or_within_and_across_lists(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());

    let curry = recipes
        .create(user, &new_recipe("Curry", &["Vegan", "Spicy"], &["Rice"]))
        .await
        .unwrap();
    let tahini = recipes
        .create(user, &new_recipe("Tahini", &["Vegan"], &["Sesame"]))
        .await
        .unwrap();
    recipes
        .create(user, &new_recipe("Steak", &["Dinner"], &["Rice"]))
        .await
        .unwrap();

    let vegan = curry.tags.iter().find(|t| t.name == "Vegan").unwrap().id;
    let spicy = curry.tags.iter().find(|t| t.name == "Spicy").unwrap().id;
    let rice = curry.ingredients[0].id;

    // A recipe carrying both filtered tags appears once
    let by_tags = recipes
        .list(
            user,
            &RecipeFilter {
                tags: Some(vec![vegan, spicy]),
                ingredients: None,
            },
        )
        .await
        .unwrap();
    let ids: Vec<i64> = by_tags.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![tahini.id, curry.id]);

    let both = recipes
        .list(
            user,
            &RecipeFilter {
                tags: Some(vec![vegan]),
                ingredients: Some(vec![rice]),
            },
        )
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, curry.id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_list_is_newest_first_without_filters(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());

    let first = recipes.create(user, &new_recipe("A", &[], &[])).await.unwrap();
    let second = recipes.create(user, &new_recipe("B", &[], &[])).await.unwrap();

    let listed = recipes.list(user, &RecipeFilter::default()).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_other_users_cannot_see_or_filter_by_salt(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let ingredients = NamedRepository::<Ingredient>::new(pool.clone());

    let soup = recipes
        .create(alice, &new_recipe("Soup", &[], &["Salt"]))
        .await
        .unwrap();
    let salt = soup.ingredients[0].id;

    assert!(recipes.find(bob, soup.id).await.unwrap().is_none());
    assert!(ingredients.list(bob, false).await.unwrap().is_empty());

    let filtered = recipes
        .list(
            bob,
            &RecipeFilter {
                tags: None,
                ingredients: Some(vec![salt]),
            },
        )
        .await
        .unwrap();
    assert!(filtered.is_empty());

    assert!(ingredients.update(bob, salt, Some("Sugar")).await.unwrap().is_none());
    assert!(!ingredients.delete(bob, salt).await.unwrap());
    assert!(!recipes.delete(bob, soup.id).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_assigned_only_lists_each_ingredient_once(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let ingredients = NamedRepository::<Ingredient>::new(pool.clone());

    recipes
        .create(user, &new_recipe("Eggs", &[], &["Pepper"]))
        .await
        .unwrap();
    recipes
        .create(user, &new_recipe("Steak", &[], &["Pepper"]))
        .await
        .unwrap();
    let unused = recipes
        .create(user, &new_recipe("Toast", &[], &["Butter"]))
        .await
        .unwrap();
    recipes.delete(user, unused.id).await.unwrap();

    let assigned = ingredients.list(user, true).await.unwrap();
    assert_eq!(names(&assigned), vec!["Pepper"]);

    let all = ingredients.list(user, false).await.unwrap();
    assert_eq!(names(&all), vec!["Pepper", "Butter"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_assigned_only_lists_each_tag_once(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let tags = NamedRepository::<Tag>::new(pool.clone());

    recipes
        .create(user, &new_recipe("Eggs", &["Pepper"], &[]))
        .await
        .unwrap();
    recipes
        .create(user, &new_recipe("Steak", &["Pepper"], &[]))
        .await
        .unwrap();
    let unused = recipes
        .create(user, &new_recipe("Toast", &["Breakfast"], &[]))
        .await
        .unwrap();
    recipes.delete(user, unused.id).await.unwrap();

    let assigned = tags.list(user, true).await.unwrap();
    assert_eq!(names(&assigned), vec!["Pepper"]);

    let all = tags.list(user, false).await.unwrap();
    assert_eq!(names(&all), vec!["Pepper", "Breakfast"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_get_or_create_reuses_then_recreates_after_delete(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let first = named::get_or_create::<Tag>(&mut conn, user, "Vegan").await.unwrap();
    let again = named::get_or_create::<Tag>(&mut conn, user, "Vegan").await.unwrap();
    assert_eq!(first, again);

    assert!(NamedRepository::<Tag>::new(pool.clone()).delete(user, first.id).await.unwrap());

    let recreated = named::get_or_create::<Tag>(&mut conn, user, "Vegan").await.unwrap();
    assert_eq!(recreated.name, "Vegan");
    assert_ne!(recreated.id, first.id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_rename_and_delete_tag(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let tags = NamedRepository::<Tag>::new(pool.clone());

    let soup = recipes
        .create(user, &new_recipe("Soup", &["Dinner", "Vegan"], &[]))
        .await
        .unwrap();
    let dinner = soup.tags.iter().find(|t| t.name == "Dinner").unwrap().id;

    let renamed = tags.update(user, dinner, Some("Supper")).await.unwrap().unwrap();
    assert_eq!(renamed.name, "Supper");

    let clash = tags.update(user, dinner, Some("Vegan")).await;
    assert!(matches!(
        clash,
        Err(common::error::DatabaseError::Conflict(message)) if message == "tag with this name already exists"
    ));

    assert!(tags.delete(user, dinner).await.unwrap());
    let soup = recipes.find(user, soup.id).await.unwrap().unwrap();
    assert_eq!(names(&soup.tags), vec!["Vegan"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn test_repeated_name_on_update_attaches_one_tag(pool: PgPool) {
    let user = create_user(&pool, "user@example.com").await;
    let recipes = RecipeRepository::new(pool.clone());
    let tags = NamedRepository::<Tag>::new(pool.clone());

    let soup = recipes
        .create(user, &new_recipe("Soup", &["Vegan"], &[]))
        .await
        .unwrap();

    let updated = recipes
        .update(
            user,
            soup.id,
            &RecipeChanges {
                tags: Field::Present(vec!["Vegan".to_string(), "Vegan".to_string()]),
                ..RecipeChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(names(&updated.tags), vec!["Vegan"]);
    assert_eq!(updated.tags[0].id, soup.tags[0].id);
    assert_eq!(tags.list(user, false).await.unwrap().len(), 1);
}
