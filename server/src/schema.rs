diesel::table! {
    favorites (id) {
        id -> Int4,
        user_id -> Int4,
        recipe_id -> Int4,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int4,
        #[max_length = 128]
        name -> Varchar,
        #[max_length = 64]
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    recipe_ingredients (id) {
        id -> Int4,
        recipe_id -> Int4,
        ingredient_id -> Int4,
        amount -> Int4,
    }
}

diesel::table! {
    recipe_tags (id) {
        id -> Int4,
        recipe_id -> Int4,
        tag_id -> Int4,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int4,
        author_id -> Int4,
        #[max_length = 256]
        name -> Varchar,
        #[max_length = 255]
        image -> Varchar,
        text -> Text,
        cooking_time -> Int4,
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    sessions (id) {
        id -> Int4,
        user_id -> Int4,
        #[max_length = 255]
        token_hash -> Varchar,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    shopping_carts (id) {
        id -> Int4,
        user_id -> Int4,
        recipe_id -> Int4,
    }
}

diesel::table! {
    subscriptions (id) {
        id -> Int4,
        user_id -> Int4,
        author_id -> Int4,
    }
}

diesel::table! {
    tags (id) {
        id -> Int4,
        #[max_length = 32]
        name -> Varchar,
        #[max_length = 32]
        slug -> Varchar,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        #[max_length = 150]
        username -> Varchar,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 150]
        first_name -> Varchar,
        #[max_length = 150]
        last_name -> Varchar,
        #[max_length = 255]
        password_hash -> Varchar,
        #[max_length = 255]
        avatar -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(favorites -> users (user_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(shopping_carts -> recipes (recipe_id));
diesel::joinable!(shopping_carts -> users (user_id));
diesel::joinable!(subscriptions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    favorites,
    ingredients,
    recipe_ingredients,
    recipe_tags,
    recipes,
    sessions,
    shopping_carts,
    subscriptions,
    tags,
    users,
);
