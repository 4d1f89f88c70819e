diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    packages (id) {
        id -> Integer,
        name -> Text,
        owner_id -> Nullable<Integer>,
        created_at -> Text,
    }
}

diesel::table! {
    releases (id) {
        id -> Integer,
        package_id -> Integer,
        version -> Text,
        package_info -> Jsonb,
        created_at -> Text,
    }
}

diesel::table! {
    distributions (id) {
        id -> Integer,
        release_id -> Integer,
        filename -> Text,
        content -> Text,
        size -> BigInt,
        checksum -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(packages -> users (owner_id));
diesel::joinable!(releases -> packages (package_id));
diesel::joinable!(distributions -> releases (release_id));

diesel::allow_tables_to_appear_in_same_query!(users, packages, releases, distributions,);
