/// Integration tests for the Ladle API
///
/// End-to-end coverage through the router:
/// - registration, login, and profile management
/// - per-user isolation of tags, ingredients, and recipes
/// - assigned_only de-duplicated filtering
/// - recipe creation with nested tag/ingredient names and id filters
///
/// Requires a running PostgreSQL (DATABASE_URL) and a JWT_SECRET of at
/// least 32 characters.
mod common;

use axum::http::StatusCode;
use common::{authed, create_test_user, request, unique_email, TestContext};
use ladle_shared::models::ingredient::{CreateIngredient, Ingredient};
use ladle_shared::models::recipe::{CreateRecipe, Recipe};
use ladle_shared::models::tag::{CreateTag, Tag};
use ladle_shared::models::user::{CreateUser, User, UserError};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

/// Creates a recipe directly through the model layer.
async fn create_test_recipe(ctx: &TestContext, title: &str) -> anyhow::Result<Recipe> {
    let recipe = Recipe::create(
        &ctx.db,
        CreateRecipe {
            user_id: ctx.user.id,
            title: title.to_string(),
            description: String::new(),
            time_minutes: 5,
            price: Decimal::new(450, 2), // 4.50
            link: String::new(),
        },
    )
    .await?;

    Ok(recipe)
}

// ---------------------------------------------------------------------------
// User store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_user_normalizes_email_domain() {
    let ctx = TestContext::new().await.unwrap();

    let local_part = format!("Test2-{}", Uuid::new_v4());
    let user = User::create(
        &ctx.db,
        CreateUser {
            email: format!("{}@Example.com", local_part),
            password_hash: "hash".to_string(),
            name: None,
        },
    )
    .await
    .unwrap();

    // Domain lowercased, local part untouched.
    assert_eq!(user.email, format!("{}@example.com", local_part));

    User::delete(&ctx.db, user.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_with_empty_email_fails() {
    let ctx = TestContext::new().await.unwrap();

    let result = User::create(
        &ctx.db,
        CreateUser {
            email: String::new(),
            password_hash: "hash".to_string(),
            name: None,
        },
    )
    .await;

    assert!(matches!(result, Err(UserError::EmailRequired)));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_superuser_sets_flags() {
    let ctx = TestContext::new().await.unwrap();

    let user = User::create_superuser(&ctx.db, &unique_email("admin"), "hash")
        .await
        .unwrap();

    assert!(user.is_staff);
    assert!(user.is_superuser);
    assert!(user.is_active);

    User::delete(&ctx.db, user.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_login_and_me() {
    let ctx = TestContext::new().await.unwrap();

    let local_part = format!("Cook-{}", Uuid::new_v4());
    let email = format!("{}@Example.COM", local_part);

    let (status, body) = request(
        &ctx,
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "SecureP@ss123",
            "name": "Julia"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    // Registration response carries the normalized email.
    assert_eq!(body["email"], format!("{}@example.com", local_part));
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    // Login with the original (un-normalized) spelling still works.
    let (status, body) = request(
        &ctx,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({
            "email": email,
            "password": "SecureP@ss123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let access_token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = request(&ctx, "GET", "/v1/users/me", Some(&access_token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], format!("{}@example.com", local_part));
    assert_eq!(body["name"], "Julia");

    User::delete(&ctx.db, user_id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let ctx = TestContext::new().await.unwrap();

    let email = unique_email("login");
    let (status, _) = request(
        &ctx,
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "SecureP@ss123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &ctx,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({
            "email": email,
            "password": "WrongP@ss123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    User::delete(&ctx.db, user.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_me_changes_name() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = authed(
        &ctx,
        "PATCH",
        "/v1/users/me",
        Some(json!({ "name": "Renamed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    ctx.cleanup().await.unwrap();
}

// ---------------------------------------------------------------------------
// Authentication requirement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_auth_required_for_protected_routes() {
    let ctx = TestContext::new().await.unwrap();

    for uri in ["/v1/tags/", "/v1/ingredients/", "/v1/recipes/", "/v1/users/me"] {
        let (status, _) = request(&ctx, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {}", uri);
    }

    ctx.cleanup().await.unwrap();
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_and_list_tags_ordered_by_name_desc() {
    let ctx = TestContext::new().await.unwrap();

    for name in ["Vegan", "Dessert"] {
        let (status, _) = authed(&ctx, "POST", "/v1/tags/", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = authed(&ctx, "GET", "/v1/tags/", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Vegan", "Dessert"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tags_limited_to_user() {
    let ctx = TestContext::new().await.unwrap();
    let other = create_test_user(&ctx.db, &unique_email("other")).await.unwrap();

    Tag::create(
        &ctx.db,
        CreateTag {
            user_id: other.id,
            name: "Fruity".to_string(),
        },
    )
    .await
    .unwrap();

    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Comfort Food".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/tags/", None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Comfort Food");
    assert_eq!(listed[0]["id"], tag.id.to_string());

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_get_foreign_tag_returns_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let other = create_test_user(&ctx.db, &unique_email("other")).await.unwrap();

    let foreign_tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: other.id,
            name: "Secret".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, _) = authed(&ctx, "GET", &format!("/v1/tags/{}", foreign_tag.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees it.
    let other_token = ctx.token_for(other.id).unwrap();
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/v1/tags/{}", foreign_tag.id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Secret");

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_tag() {
    let ctx = TestContext::new().await.unwrap();

    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "After Dinner".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, body) = authed(
        &ctx,
        "PATCH",
        &format!("/v1/tags/{}", tag.id),
        Some(json!({ "name": "Dessert" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dessert");

    let reloaded = Tag::find_by_id_and_user(&ctx.db, tag.id, ctx.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.name, "Dessert");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_tag() {
    let ctx = TestContext::new().await.unwrap();

    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Breakfast".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, _) = authed(&ctx, "DELETE", &format!("/v1/tags/{}", tag.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let tags = Tag::list_by_user(&ctx.db, ctx.user.id, false).await.unwrap();
    assert!(tags.is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_filter_tags_assigned_to_recipes() {
    let ctx = TestContext::new().await.unwrap();

    let assigned = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Dinner".to_string(),
        },
    )
    .await
    .unwrap();
    let unassigned = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Lunch".to_string(),
        },
    )
    .await
    .unwrap();

    let recipe = create_test_recipe(&ctx, "Green Eggs").await.unwrap();
    Recipe::set_tags(&ctx.db, recipe.id, &[assigned.id]).await.unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/tags/?assigned_only=1", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&assigned.id.to_string().as_str()));
    assert!(!ids.contains(&unassigned.id.to_string().as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_filtered_tags_unique() {
    let ctx = TestContext::new().await.unwrap();

    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Weeknight".to_string(),
        },
    )
    .await
    .unwrap();

    let recipe1 = create_test_recipe(&ctx, "Pancakes").await.unwrap();
    let recipe2 = create_test_recipe(&ctx, "Porridge").await.unwrap();
    Recipe::set_tags(&ctx.db, recipe1.id, &[tag.id]).await.unwrap();
    Recipe::set_tags(&ctx.db, recipe2.id, &[tag.id]).await.unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/tags/?assigned_only=1", None).await;

    assert_eq!(status, StatusCode::OK);
    // Linked to two recipes, listed once.
    assert_eq!(body.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

// ---------------------------------------------------------------------------
// Ingredients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ingredients_limited_to_user() {
    let ctx = TestContext::new().await.unwrap();
    let other = create_test_user(&ctx.db, &unique_email("other")).await.unwrap();

    Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: other.id,
            name: "Salt".to_string(),
        },
    )
    .await
    .unwrap();

    let ingredient = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Turmeric".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/ingredients/", None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Turmeric");
    assert_eq!(listed[0]["id"], ingredient.id.to_string());

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_ingredient_leaves_empty_list() {
    let ctx = TestContext::new().await.unwrap();

    let ingredient = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Lettuce".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, _) = authed(
        &ctx,
        "DELETE",
        &format!("/v1/ingredients/{}", ingredient.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let remaining = Ingredient::list_by_user(&ctx.db, ctx.user.id, false)
        .await
        .unwrap();
    assert!(remaining.is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_filter_ingredients_assigned_to_recipes() {
    let ctx = TestContext::new().await.unwrap();

    let apples = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Apples".to_string(),
        },
    )
    .await
    .unwrap();
    let turkey = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Turkey".to_string(),
        },
    )
    .await
    .unwrap();

    let recipe = create_test_recipe(&ctx, "Apple Crumble").await.unwrap();
    Recipe::set_ingredients(&ctx.db, recipe.id, &[apples.id])
        .await
        .unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/ingredients/?assigned_only=1", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&apples.id.to_string().as_str()));
    assert!(!ids.contains(&turkey.id.to_string().as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_filtered_ingredients_unique() {
    let ctx = TestContext::new().await.unwrap();

    let eggs = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Eggs".to_string(),
        },
    )
    .await
    .unwrap();
    Ingredient::create(
        &ctx.db,
        CreateIngredient {
            user_id: ctx.user.id,
            name: "Lentils".to_string(),
        },
    )
    .await
    .unwrap();

    let recipe1 = create_test_recipe(&ctx, "Apple Crumble").await.unwrap();
    let recipe2 = create_test_recipe(&ctx, "Herb Eggs").await.unwrap();
    Recipe::set_ingredients(&ctx.db, recipe1.id, &[eggs.id])
        .await
        .unwrap();
    Recipe::set_ingredients(&ctx.db, recipe2.id, &[eggs.id])
        .await
        .unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/ingredients/?assigned_only=1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_recipe_with_nested_names() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = authed(
        &ctx,
        "POST",
        "/v1/recipes/",
        Some(json!({
            "title": "Thai Prawn Curry",
            "description": "Fragrant and quick.",
            "time_minutes": 30,
            "price": "12.50",
            "tags": ["Thai", "Dinner"],
            "ingredients": ["Prawns", "Coconut Milk"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Thai Prawn Curry");
    assert_eq!(body["price"], "12.50");
    assert_eq!(body["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);

    // Nested names were get-or-created under the requesting user.
    let tags = Tag::list_by_user(&ctx.db, ctx.user.id, false).await.unwrap();
    assert_eq!(tags.len(), 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_recipe_reuses_existing_tag() {
    let ctx = TestContext::new().await.unwrap();

    let existing = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Dinner".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, body) = authed(
        &ctx,
        "POST",
        "/v1/recipes/",
        Some(json!({
            "title": "Roast",
            "time_minutes": 90,
            "price": "20.00",
            "tags": ["Dinner"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tags"][0]["id"], existing.id.to_string());

    // No duplicate tag was created.
    let tags = Tag::list_by_user(&ctx.db, ctx.user.id, false).await.unwrap();
    assert_eq!(tags.len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_recipes_limited_to_user() {
    let ctx = TestContext::new().await.unwrap();
    let other = create_test_user(&ctx.db, &unique_email("other")).await.unwrap();

    Recipe::create(
        &ctx.db,
        CreateRecipe {
            user_id: other.id,
            title: "Their Soup".to_string(),
            description: String::new(),
            time_minutes: 10,
            price: Decimal::new(300, 2),
            link: String::new(),
        },
    )
    .await
    .unwrap();

    create_test_recipe(&ctx, "My Soup").await.unwrap();

    let (status, body) = authed(&ctx, "GET", "/v1/recipes/", None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "My Soup");

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_filter_recipes_by_tag_id() {
    let ctx = TestContext::new().await.unwrap();

    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Quick".to_string(),
        },
    )
    .await
    .unwrap();

    let tagged = create_test_recipe(&ctx, "Stir Fry").await.unwrap();
    let untagged = create_test_recipe(&ctx, "Slow Stew").await.unwrap();
    Recipe::set_tags(&ctx.db, tagged.id, &[tag.id]).await.unwrap();

    let (status, body) = authed(&ctx, "GET", &format!("/v1/recipes/?tags={}", tag.id), None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&tagged.id.to_string().as_str()));
    assert!(!ids.contains(&untagged.id.to_string().as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_patch_recipe_replaces_tag_set() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = create_test_recipe(&ctx, "Chili").await.unwrap();
    let breakfast = Tag::create(
        &ctx.db,
        CreateTag {
            user_id: ctx.user.id,
            name: "Breakfast".to_string(),
        },
    )
    .await
    .unwrap();
    Recipe::set_tags(&ctx.db, recipe.id, &[breakfast.id]).await.unwrap();

    let (status, body) = authed(
        &ctx,
        "PATCH",
        &format!("/v1/recipes/{}", recipe.id),
        Some(json!({ "tags": ["Lunch"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let tags = body["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "Lunch");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_recipe() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = create_test_recipe(&ctx, "Goner").await.unwrap();

    let (status, _) = authed(&ctx, "DELETE", &format!("/v1/recipes/{}", recipe.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = authed(&ctx, "GET", &format!("/v1/recipes/{}", recipe.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_get_foreign_recipe_returns_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let other = create_test_user(&ctx.db, &unique_email("other")).await.unwrap();

    let foreign = Recipe::create(
        &ctx.db,
        CreateRecipe {
            user_id: other.id,
            title: "Private".to_string(),
            description: String::new(),
            time_minutes: 5,
            price: Decimal::new(100, 2),
            link: String::new(),
        },
    )
    .await
    .unwrap();

    let (status, _) = authed(&ctx, "GET", &format!("/v1/recipes/{}", foreign.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}
