use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, shopping_carts};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sums amounts per (ingredient name, unit) across every cart recipe and
/// renders one line per group, name-sorted and capitalized:
/// `"Flour - 5 g."`
fn build_cart_text(rows: &[(String, String, i32)]) -> String {
    let mut totals: BTreeMap<(&str, &str), i64> = BTreeMap::new();
    for (name, unit, amount) in rows {
        *totals.entry((name.as_str(), unit.as_str())).or_insert(0) += i64::from(*amount);
    }

    totals
        .iter()
        .map(|((name, unit), total)| format!("{} - {} {}.", capitalize(name), total, unit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<(String, String, i32)> = match shopping_carts::table
        .inner_join(
            recipe_ingredients::table
                .on(recipe_ingredients::recipe_id.eq(shopping_carts::recipe_id)),
        )
        .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
        .filter(shopping_carts::user_id.eq(user.id))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch shopping cart: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch shopping cart".to_string(),
                }),
            )
                .into_response();
        }
    };

    let text = build_cart_text(&rows);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_cart.txt\"",
            ),
        ],
        text,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> (String, String, i32) {
        (name.to_string(), unit.to_string(), amount)
    }

    #[test]
    fn test_amounts_sum_across_recipes() {
        // R1: 2 flour + 1 sugar, R2: 3 flour
        let rows = vec![
            row("flour", "g", 2),
            row("sugar", "g", 1),
            row("flour", "g", 3),
        ];
        let text = build_cart_text(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Flour - 5 g.", "Sugar - 1 g."]);
    }

    #[test]
    fn test_same_name_different_units_stay_separate() {
        let rows = vec![row("milk", "ml", 200), row("milk", "g", 50)];
        let text = build_cart_text(&rows);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Milk - 200 ml."));
        assert!(text.contains("Milk - 50 g."));
    }

    #[test]
    fn test_lines_sorted_by_name() {
        let rows = vec![row("zucchini", "pc", 1), row("apple", "pc", 2)];
        let text = build_cart_text(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Apple - 2 pc.", "Zucchini - 1 pc."]);
    }

    #[test]
    fn test_cyrillic_names_capitalize() {
        let rows = vec![row("молоко", "мл", 500)];
        assert_eq!(build_cart_text(&rows), "Молоко - 500 мл.");
    }

    #[test]
    fn test_empty_cart_is_empty_text() {
        assert_eq!(build_cart_text(&[]), "");
    }
}
